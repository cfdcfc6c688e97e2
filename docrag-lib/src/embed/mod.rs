//! Text embedding through remote or local models
//!
//! An [`Embedder`] turns text into fixed-dimension vectors. The default
//! adapter calls an Ollama server (`nomic-embed-text`); with the
//! `fastembed` feature a local BAAI/bge model is also available.
//!
//! Callers go through [`embed`], which checks that the adapter returned one
//! vector per input and that all vectors share a dimension.
//!
//! # Usage
//!
//! ```ignore
//! use docrag_lib::embed::{embed, OllamaEmbedder};
//!
//! let embedder = OllamaEmbedder::new(&config.ollama)?;
//!
//! // Up to 4 requests in flight, results in input order
//! let vectors = embed(&embedder, &["first chunk", "second chunk"], 4).await?;
//! ```

use async_trait::async_trait;
use futures::stream::{self, StreamExt, TryStreamExt};

use crate::{Error, Result};

/// A vector embedding - fixed size array of floats
pub type Embedding = Vec<f32>;

/// Trait for text embedding models
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a single text
    async fn embed_text(&self, text: &str) -> Result<Embedding>;

    /// Embed many texts, returning vectors in input order
    ///
    /// The default issues one [`embed_text`](Self::embed_text) call per text
    /// with at most `concurrency` calls in flight. Adapters that support
    /// batching natively can override this.
    async fn embed_batch(&self, texts: &[&str], concurrency: usize) -> Result<Vec<Embedding>> {
        // boxed futures are lazy, so nothing runs until `buffered` polls it
        let calls: Vec<_> = texts.iter().map(|text| self.embed_text(text)).collect();
        stream::iter(calls)
            .buffered(concurrency.max(1))
            .try_collect()
            .await
    }

    /// Returns the model name/identifier
    fn model_name(&self) -> &str;
}

/// Embed `texts` and verify the shape of what came back.
///
/// Fails with [`Error::EmbeddingInconsistent`] if the adapter returned the
/// wrong number of vectors, an empty vector, vectors of differing dimension,
/// or a NaN or infinite component.
pub async fn embed<E: Embedder + ?Sized>(
    embedder: &E,
    texts: &[&str],
    concurrency: usize,
) -> Result<Vec<Embedding>> {
    let vectors = embedder.embed_batch(texts, concurrency).await?;
    check_consistency(texts.len(), &vectors)?;
    Ok(vectors)
}

/// Returns the shared dimension of `vectors`, or zero if there are none.
pub(crate) fn check_consistency(expected: usize, vectors: &[Embedding]) -> Result<usize> {
    if vectors.len() != expected {
        return Err(Error::EmbeddingInconsistent(format!(
            "requested {expected} embeddings, received {}",
            vectors.len()
        )));
    }

    let Some(first) = vectors.first() else {
        return Ok(0);
    };
    let dimension = first.len();
    if dimension == 0 {
        return Err(Error::EmbeddingInconsistent("received an empty vector".to_string()));
    }

    if let Some((i, v)) = vectors.iter().enumerate().find(|(_, v)| v.len() != dimension) {
        return Err(Error::EmbeddingInconsistent(format!(
            "vector {i} has dimension {}, expected {dimension}",
            v.len()
        )));
    }

    if let Some(i) = vectors.iter().position(|v| v.iter().any(|x| !x.is_finite())) {
        return Err(Error::EmbeddingInconsistent(format!(
            "vector {i} contains a non-finite value"
        )));
    }

    Ok(dimension)
}

#[cfg(feature = "fastembed")]
mod bge;
mod ollama;

#[cfg(feature = "fastembed")]
pub use bge::*;
pub use ollama::*;
