//! End-to-end document question answering
//!
//! The [`Pipeline`] owns the session: at most one indexed document, swapped
//! wholesale when a new document is loaded.
//!
//! ```text
//! load_document:   text -> chunk -> embed (bounded) -> FlatIndex -> swap session
//! answer_question: question -> embed -> search -> synthesize -> Answer
//! ```
//!
//! Queries hold the session lock only long enough to clone an `Arc`, so a
//! slow load never blocks questions against the previous document, and a
//! question never sees a half-built index.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::answer::{Answer, Generator, Synthesizer};
use crate::chunk::FixedSizeChunker;
use crate::config::PipelineConfig;
use crate::embed::{embed, Embedder};
use crate::index::{FlatIndex, VectorIndex};
use crate::retrieve::Retriever;
use crate::{Error, Result};

/// Outcome of a successful document load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LoadSummary {
    pub chunk_count: usize,
    pub dimension: usize,
}

/// Externally visible pipeline state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PipelineState {
    /// No document loaded
    Empty,
    /// A document is indexed and queryable
    Ready { chunk_count: usize, dimension: usize },
}

/// The active document's index
#[derive(Debug)]
pub struct Session {
    index: FlatIndex,
}

impl Session {
    #[must_use]
    pub fn index(&self) -> &FlatIndex {
        &self.index
    }
}

pub struct Pipeline<E: Embedder, G: Generator> {
    config: PipelineConfig,
    chunker: FixedSizeChunker,
    retriever: Retriever<E>,
    synthesizer: Synthesizer<G>,
    session: RwLock<Option<Arc<Session>>>,
    // ticket of the most recently started load
    latest_load: AtomicU64,
}

impl<E: Embedder, G: Generator> Pipeline<E, G> {
    /// Create an empty pipeline, validating the configuration.
    pub fn new(config: PipelineConfig, embedder: E, generator: G) -> Result<Self> {
        config.validate()?;
        let chunker = FixedSizeChunker::new(config.chunk_size, config.chunk_overlap)?;

        Ok(Self {
            config,
            chunker,
            retriever: Retriever::new(embedder),
            synthesizer: Synthesizer::new(generator),
            session: RwLock::new(None),
            latest_load: AtomicU64::new(0),
        })
    }

    /// Index `text` and make it the active document.
    ///
    /// On any failure the previous document stays active. If another load
    /// starts before this one finishes, this one is discarded with
    /// [`Error::Superseded`], even when the newer load itself later fails.
    /// In that case neither document is installed and the session keeps
    /// whatever was active before both loads began.
    pub async fn load_document(&self, text: &str) -> Result<LoadSummary> {
        if text.trim().is_empty() {
            return Err(Error::EmptyInput("document"));
        }
        let ticket = self.latest_load.fetch_add(1, Ordering::SeqCst) + 1;

        let chunks = self.chunker.chunk(text);
        info!(ticket, chunks = chunks.len(), "indexing document");

        let texts: Vec<&str> = chunks.iter().map(|c| c.content.as_str()).collect();
        let vectors = embed(
            self.retriever.embedder(),
            &texts,
            self.config.embed_concurrency,
        )
        .await?;
        let index = FlatIndex::build(chunks, vectors)?;

        let summary = LoadSummary {
            chunk_count: index.len(),
            dimension: index.dimension(),
        };

        let mut session = self.session.write().await;
        if self.latest_load.load(Ordering::SeqCst) != ticket {
            warn!(ticket, "discarding superseded document load");
            return Err(Error::Superseded);
        }
        *session = Some(Arc::new(Session { index }));

        info!(
            ticket,
            chunks = summary.chunk_count,
            dimension = summary.dimension,
            "document ready"
        );
        Ok(summary)
    }

    /// Answer `question` from the active document.
    ///
    /// Without a document this returns [`Answer::no_document`] and makes no
    /// remote calls.
    pub async fn answer_question(&self, question: &str) -> Result<Answer> {
        let question = question.trim();
        if question.is_empty() {
            return Err(Error::EmptyInput("question"));
        }

        let session = self.session.read().await.clone();
        let ranked = match self
            .retriever
            .retrieve(session.as_deref().map(Session::index), question, self.config.top_k)
            .await
        {
            Ok(ranked) => ranked,
            Err(Error::IndexNotReady) => {
                info!("question asked before any document was loaded");
                return Ok(Answer::no_document());
            }
            Err(e) => return Err(e),
        };

        self.synthesizer.synthesize(question, &ranked).await
    }

    /// Current state of the session.
    pub async fn state(&self) -> PipelineState {
        match self.session.read().await.as_deref() {
            None => PipelineState::Empty,
            Some(session) => PipelineState::Ready {
                chunk_count: session.index.len(),
                dimension: session.index.dimension(),
            },
        }
    }

    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    #[must_use]
    pub fn embedder(&self) -> &E {
        self.retriever.embedder()
    }

    #[must_use]
    pub fn generator(&self) -> &G {
        self.synthesizer.generator()
    }
}
