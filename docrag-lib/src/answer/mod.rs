//! Grounded answer generation
//!
//! The [`Synthesizer`] turns retrieved chunks into a context block, asks a
//! [`Generator`] to answer from that context only, and labels the chunks it
//! used as sources.
//!
//! # Prompt layout
//!
//! ```text
//! system: answer only from the context, otherwise say "I don't know"
//! user:   Context:
//!         [Source 1 – Chunk 7]
//!         ...chunk text...
//!
//!         Question:
//!         ...
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::retrieve::RankedChunk;
use crate::Result;

/// Speaker of a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One conversation turn sent to a generation model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Trait for text generation models
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generate a reply to the conversation so far
    async fn generate(&self, messages: &[ChatMessage]) -> Result<String>;

    /// Returns the model name/identifier
    fn model_name(&self) -> &str;
}

/// An answer together with the labels of the chunks it was grounded on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub answer: String,
    pub sources: Vec<String>,
}

impl Answer {
    /// Message returned when a question arrives before any document.
    pub const NO_DOCUMENT: &'static str = "No document uploaded yet.";

    #[must_use]
    pub fn no_document() -> Self {
        Self {
            answer: Self::NO_DOCUMENT.to_string(),
            sources: Vec::new(),
        }
    }
}

const INSTRUCTIONS: &str = "You are a helpful assistant. \
Answer ONLY using the context provided by the user. \
If the answer is not in the context, say \"I don't know\".";

/// Builds grounded prompts and delegates generation.
pub struct Synthesizer<G: Generator> {
    generator: G,
}

impl<G: Generator> Synthesizer<G> {
    #[must_use]
    pub fn new(generator: G) -> Self {
        Self { generator }
    }

    /// Answer `question` from `ranked` chunks.
    ///
    /// Generation failures are returned, never replaced by a placeholder.
    pub async fn synthesize(&self, question: &str, ranked: &[RankedChunk]) -> Result<Answer> {
        let messages = [
            ChatMessage::system(INSTRUCTIONS),
            ChatMessage::user(format!(
                "Context:\n{}Question:\n{question}\n\nAnswer:",
                context_block(ranked)
            )),
        ];

        debug!(model = self.generator.model_name(), sources = ranked.len(), "generating answer");
        let answer = self.generator.generate(&messages).await?;

        Ok(Answer {
            answer: answer.trim().to_string(),
            sources: ranked.iter().map(source_label).collect(),
        })
    }

    #[must_use]
    pub fn generator(&self) -> &G {
        &self.generator
    }
}

fn source_label(ranked: &RankedChunk) -> String {
    format!("Source {} – Chunk {}", ranked.rank, ranked.chunk.id)
}

fn context_block(ranked: &[RankedChunk]) -> String {
    ranked
        .iter()
        .map(|r| format!("[{}]\n{}\n\n", source_label(r), r.chunk.content))
        .collect()
}

mod ollama;

pub use ollama::*;
