//! docrag - question answering over a single document
//!
//! # Architecture
//!
//! ```text
//! Document -> Chunker -> Embedder -> FlatIndex      (load_document)
//!                                        |
//! Question -> Embedder -> Retriever <----+          (answer_question)
//!                             |
//!                        Synthesizer -> Generator
//!                             |
//!                      Answer + sources
//! ```
//!
//! # Example
//!
//! ```ignore
//! use docrag_lib::{config::Config, embed::OllamaEmbedder, answer::OllamaGenerator, pipeline::Pipeline};
//!
//! let config = Config::default();
//! let embedder = OllamaEmbedder::new(&config.ollama)?;
//! let generator = OllamaGenerator::new(&config.ollama)?;
//! let pipeline = Pipeline::new(config.pipeline, embedder, generator)?;
//!
//! // Index a document
//! let summary = pipeline.load_document(&text).await?;
//!
//! // Ask
//! let answer = pipeline.answer_question("Who won the match?").await?;
//! for source in &answer.sources {
//!     println!("{source}");
//! }
//! ```

pub mod answer;
pub mod chunk;
pub mod config;
pub mod embed;
pub mod error;
pub mod index;
pub mod pipeline;
pub mod retrieve;

pub use error::{Error, Result};
