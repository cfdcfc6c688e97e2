//! docrag CLI - ask questions about a plain-text document
//!
//! # Commands
//!
//! ```bash
//! # Chunk a document and show results
//! docrag chunk input.txt --size 500 --overlap 50
//!
//! # Embed text and show vector stats
//! docrag embed "Who won the 2023 Ashes?"
//!
//! # Index a file and answer one question
//! docrag ask input.txt "who scored"
//!
//! # Index a file, then answer questions from stdin
//! docrag chat input.txt
//! ```
//!
//! Text must already be extracted (e.g. `pdftotext report.pdf report.txt`).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use docrag_lib::{
    answer::{Answer, OllamaGenerator},
    chunk::chunk_text,
    config::Config,
    embed::{embed, Embedder, OllamaEmbedder},
    pipeline::Pipeline,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "docrag")]
#[command(about = "Ask questions about a document, answered from its own text")]
#[command(version)]
struct Cli {
    /// TOML config file; flags and environment override it
    #[arg(short, long, global = true, env = "DOCRAG_CONFIG")]
    config: Option<PathBuf>,

    #[command(flatten)]
    service: ServiceArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ServiceArgs {
    /// Embedding backend
    #[arg(long, global = true, value_enum, default_value = "ollama", env = "DOCRAG_EMBEDDER")]
    embedder: EmbedderKind,

    /// Ollama base URL
    #[arg(long, global = true, env = "DOCRAG_OLLAMA_URL")]
    ollama_url: Option<String>,

    /// Ollama embedding model
    #[arg(long, global = true, env = "DOCRAG_EMBED_MODEL")]
    embed_model: Option<String>,

    /// Ollama chat model
    #[arg(long, global = true, env = "DOCRAG_CHAT_MODEL")]
    chat_model: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum EmbedderKind {
    /// Remote embeddings from an Ollama server
    Ollama,
    /// Local BAAI/bge-large-en-v1.5 (requires the `local-embed` feature)
    Bge,
}

#[derive(Subcommand)]
enum Commands {
    /// Chunk a document and show the chunks
    Chunk {
        /// Input file to chunk
        input: PathBuf,

        /// Characters per chunk
        #[arg(long)]
        size: Option<usize>,

        /// Characters shared by consecutive chunks
        #[arg(long)]
        overlap: Option<usize>,
    },

    /// Embed text and show vector info
    Embed {
        /// Text to embed
        text: String,
    },

    /// Index a file and answer one question
    Ask {
        /// Input file to index
        input: PathBuf,

        /// Question to answer
        question: String,

        /// Number of chunks to retrieve
        #[arg(short, long)]
        k: Option<usize>,

        /// Print the answer as JSON
        #[arg(long)]
        json: bool,
    },

    /// Index a file, then answer questions read from stdin
    Chat {
        /// Input file to index
        input: PathBuf,

        /// Number of chunks to retrieve
        #[arg(short, long)]
        k: Option<usize>,
    },
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            Config::from_toml(&raw)?
        }
        None => Config::default(),
    };

    if let Some(url) = &cli.service.ollama_url {
        config.ollama.base_url = url.clone();
    }
    if let Some(model) = &cli.service.embed_model {
        config.ollama.embedding_model = model.clone();
    }
    if let Some(model) = &cli.service.chat_model {
        config.ollama.chat_model = model.clone();
    }

    match &cli.command {
        Commands::Chunk { size, overlap, .. } => {
            if let Some(size) = size {
                config.pipeline.chunk_size = *size;
            }
            if let Some(overlap) = overlap {
                config.pipeline.chunk_overlap = *overlap;
            }
        }
        Commands::Ask { k: Some(k), .. } | Commands::Chat { k: Some(k), .. } => {
            config.pipeline.top_k = *k;
        }
        _ => {}
    }

    config.validate()?;
    Ok(config)
}

fn read_document(input: &Path) -> Result<String> {
    fs::read_to_string(input).with_context(|| format!("reading {}", input.display()))
}

fn print_answer(answer: &Answer) {
    println!("\n=== Answer ===\n");
    println!("{}", answer.answer);
    if !answer.sources.is_empty() {
        println!("\n=== Sources ===\n");
        for source in &answer.sources {
            println!("  • {source}");
        }
    }
    println!();
}

fn print_chunks(input: &Path, config: &Config) -> Result<()> {
    let text = read_document(input)?;
    let chunks = chunk_text(&text, config.pipeline.chunk_size, config.pipeline.chunk_overlap)?;

    println!(
        "Chunked '{}' into {} chunks (size {}, overlap {}):\n",
        input.display(),
        chunks.len(),
        config.pipeline.chunk_size,
        config.pipeline.chunk_overlap
    );
    for chunk in &chunks {
        let len = chunk.content.chars().count();
        println!("--- Chunk {} ({len} chars, offset {}) ---", chunk.id, chunk.offset);
        // Show preview (first 200 chars)
        let preview: String = chunk.content.chars().take(200).collect();
        println!("{}{}\n", preview, if len > 200 { "..." } else { "" });
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    debug!(?config, "loaded configuration");

    // chunking needs no embedding service
    if let Commands::Chunk { input, .. } = &cli.command {
        return print_chunks(input, &config);
    }

    match cli.service.embedder {
        EmbedderKind::Ollama => run(OllamaEmbedder::new(&config.ollama)?, config, cli.command).await,
        #[cfg(feature = "local-embed")]
        EmbedderKind::Bge => {
            println!("Loading BGE model (first run downloads ~1.2GB)...");
            run(docrag_lib::embed::BgeEmbedder::new()?, config, cli.command).await
        }
        #[cfg(not(feature = "local-embed"))]
        EmbedderKind::Bge => anyhow::bail!("the bge embedder requires building with --features local-embed"),
    }
}

async fn run<E: Embedder>(embedder: E, config: Config, command: Commands) -> Result<()> {
    match command {
        Commands::Chunk { input, .. } => print_chunks(&input, &config)?,

        Commands::Embed { text } => {
            println!("Embedding with {}: {}", embedder.model_name(), text);
            let embedding = embed(&embedder, &[text.as_str()], 1)
                .await?
                .pop()
                .context("embedder returned no vectors")?;

            println!("\nEmbedding stats:");
            println!("  Dimensions: {}", embedding.len());
            println!("  First 5 values: {:?}", &embedding[..embedding.len().min(5)]);
            println!("  Min: {:.4}", embedding.iter().cloned().fold(f32::INFINITY, f32::min));
            println!("  Max: {:.4}", embedding.iter().cloned().fold(f32::NEG_INFINITY, f32::max));
        }

        Commands::Ask {
            input,
            question,
            json,
            ..
        } => {
            let pipeline = build_pipeline(embedder, &config, &input).await?;

            let answer = pipeline.answer_question(&question).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&answer)?);
            } else {
                print_answer(&answer);
            }
        }

        Commands::Chat { input, .. } => {
            let pipeline = build_pipeline(embedder, &config, &input).await?;

            println!("\nAsk a question about the document (Ctrl-D to quit):");
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            while let Some(line) = lines.next_line().await? {
                if line.trim().is_empty() {
                    println!("Please enter a question.");
                    continue;
                }
                match pipeline.answer_question(&line).await {
                    Ok(answer) => print_answer(&answer),
                    Err(e) if e.is_retryable() => eprintln!("{e} (try again)"),
                    Err(e) => return Err(e.into()),
                }
            }
        }
    }

    Ok(())
}

async fn build_pipeline<E: Embedder>(
    embedder: E,
    config: &Config,
    input: &Path,
) -> Result<Pipeline<E, OllamaGenerator>> {
    let generator = OllamaGenerator::new(&config.ollama)?;
    let pipeline = Pipeline::new(config.pipeline.clone(), embedder, generator)?;

    eprintln!("Reading '{}'...", input.display());
    let text = read_document(input)?;

    eprintln!("Building knowledge index with {}...", pipeline.embedder().model_name());
    let summary = pipeline.load_document(&text).await?;
    eprintln!(
        "Loaded {} chunks into knowledge base ({}-dimensional vectors)",
        summary.chunk_count, summary.dimension
    );

    Ok(pipeline)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_document(name: &str, text: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("docrag-{}-{name}", std::process::id()));
        fs::write(&path, text).unwrap();
        path
    }

    #[tokio::test]
    async fn test_chunk_command_runs_with_an_embedder() {
        let input = write_document("chunk.txt", &"word ".repeat(300));
        let config = Config::default();
        let embedder = OllamaEmbedder::new(&config.ollama).unwrap();
        let command = Commands::Chunk {
            input: input.clone(),
            size: None,
            overlap: None,
        };

        let result = run(embedder, config, command).await;

        fs::remove_file(&input).unwrap();
        assert!(result.is_ok(), "got {result:?}");
    }

    #[test]
    fn test_chunk_missing_file_is_an_error() {
        let input = std::env::temp_dir().join("docrag-does-not-exist.txt");

        let err = print_chunks(&input, &Config::default()).unwrap_err();

        assert!(err.to_string().contains("reading"), "got {err:#}");
    }
}
