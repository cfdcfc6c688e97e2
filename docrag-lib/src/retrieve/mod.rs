//! Query-time retrieval
//!
//! Combines an embedder and an index: the question is embedded with the
//! same model as the chunks, then the nearest chunks are looked up.
//!
//! # Usage
//!
//! ```ignore
//! use docrag_lib::retrieve::Retriever;
//!
//! let retriever = Retriever::new(embedder);
//! let ranked = retriever.retrieve(Some(&index), "Who won the 2023 Ashes?", 3).await?;
//! assert_eq!(ranked[0].rank, 1);
//! ```

use serde::Serialize;
use tracing::debug;

use crate::chunk::Chunk;
use crate::embed::{embed, Embedder};
use crate::index::VectorIndex;
use crate::{Error, Result};

/// A retrieved chunk with its rank (1 = closest) and distance to the query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedChunk {
    pub rank: usize,
    pub distance: f32,
    pub chunk: Chunk,
}

/// Embeds questions and looks them up in an index.
pub struct Retriever<E: Embedder> {
    embedder: E,
}

impl<E: Embedder> Retriever<E> {
    #[must_use]
    pub fn new(embedder: E) -> Self {
        Self { embedder }
    }

    /// Retrieve the `k` chunks nearest to `question`.
    ///
    /// Fails with [`Error::IndexNotReady`] when `index` is `None`, without
    /// calling the embedder. Embedding and index errors are returned as is.
    pub async fn retrieve<I: VectorIndex + ?Sized>(
        &self,
        index: Option<&I>,
        question: &str,
        k: usize,
    ) -> Result<Vec<RankedChunk>> {
        let Some(index) = index else {
            return Err(Error::IndexNotReady);
        };

        let query = embed(&self.embedder, &[question], 1)
            .await?
            .pop()
            .ok_or_else(|| Error::EmbeddingInconsistent("no query embedding returned".to_string()))?;

        let neighbors = index.search(&query, k)?;
        debug!(k, hits = neighbors.len(), "retrieved neighbors");

        neighbors
            .into_iter()
            .enumerate()
            .map(|(i, n)| {
                let chunk = index.chunk(n.position).cloned().ok_or(Error::PositionOutOfRange {
                    position: n.position,
                    len: index.len(),
                })?;
                Ok(RankedChunk {
                    rank: i + 1,
                    distance: n.distance,
                    chunk,
                })
            })
            .collect()
    }

    /// Returns a reference to the embedder.
    #[must_use]
    pub fn embedder(&self) -> &E {
        &self.embedder
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::chunk::chunk_text;
    use crate::embed::Embedding;
    use crate::index::{FlatIndex, Neighbor};

    /// Maps text to counts of 'a', 'b' and 'c'.
    struct LetterEmbedder {
        calls: AtomicUsize,
    }

    impl LetterEmbedder {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Embedder for LetterEmbedder {
        async fn embed_text(&self, text: &str) -> Result<Embedding> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(['a', 'b', 'c']
                .iter()
                .map(|l| text.chars().filter(|c| c == l).count() as f32)
                .collect())
        }

        fn model_name(&self) -> &str {
            "letters"
        }
    }

    struct DownEmbedder;

    #[async_trait]
    impl Embedder for DownEmbedder {
        async fn embed_text(&self, _text: &str) -> Result<Embedding> {
            Err(Error::EmbeddingUnavailable("connection refused".to_string()))
        }

        fn model_name(&self) -> &str {
            "down"
        }
    }

    /// Claims one item but reports a hit at position 5.
    struct StrayIndex;

    impl VectorIndex for StrayIndex {
        fn search(&self, _query: &[f32], _k: usize) -> Result<Vec<Neighbor>> {
            Ok(vec![Neighbor {
                position: 5,
                distance: 0.0,
            }])
        }

        fn chunk(&self, _position: usize) -> Option<&Chunk> {
            None
        }

        fn len(&self) -> usize {
            1
        }

        fn dimension(&self) -> usize {
            3
        }
    }

    async fn build_index(embedder: &LetterEmbedder) -> FlatIndex {
        let chunks = chunk_text("aaaabbbbcccc", 4, 0).unwrap();
        let texts: Vec<&str> = chunks.iter().map(|c| c.content.as_str()).collect();
        let vectors = embed(embedder, &texts, 2).await.unwrap();
        FlatIndex::build(chunks, vectors).unwrap()
    }

    #[tokio::test]
    async fn test_retrieve_ranks_nearest_first() {
        let retriever = Retriever::new(LetterEmbedder::new());
        let index = build_index(retriever.embedder()).await;

        let ranked = retriever.retrieve(Some(&index), "bbbb", 2).await.unwrap();

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[0].chunk.content, "bbbb");
        assert_eq!(ranked[0].distance, 0.0);
        assert_eq!(ranked[1].rank, 2);
    }

    #[tokio::test]
    async fn test_retrieve_is_deterministic() {
        let retriever = Retriever::new(LetterEmbedder::new());
        let index = build_index(retriever.embedder()).await;

        let first = retriever.retrieve(Some(&index), "abc", 3).await.unwrap();
        for _ in 0..3 {
            assert_eq!(retriever.retrieve(Some(&index), "abc", 3).await.unwrap(), first);
        }
        // equidistant, so index order decides
        let ids: Vec<_> = first.iter().map(|r| r.chunk.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_missing_index_makes_no_calls() {
        let retriever = Retriever::new(LetterEmbedder::new());

        let err = retriever
            .retrieve::<FlatIndex>(None, "anything", 3)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::IndexNotReady));
        assert_eq!(retriever.embedder().calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_stray_position_is_reported() {
        let retriever = Retriever::new(LetterEmbedder::new());

        let err = retriever.retrieve(Some(&StrayIndex), "abc", 1).await.unwrap_err();

        assert!(
            matches!(err, Error::PositionOutOfRange { position: 5, len: 1 }),
            "got {err:?}"
        );
    }

    #[tokio::test]
    async fn test_embedding_failure_propagates() {
        let index = build_index(&LetterEmbedder::new()).await;
        let retriever = Retriever::new(DownEmbedder);

        let err = retriever.retrieve(Some(&index), "aaaa", 1).await.unwrap_err();

        assert!(matches!(err, Error::EmbeddingUnavailable(_)));
    }
}
