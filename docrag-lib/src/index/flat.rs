use std::collections::BinaryHeap;

use crate::chunk::Chunk;
use crate::embed::Embedding;
use crate::index::{Neighbor, VectorIndex};
use crate::{Error, Result};

/// Exact nearest-neighbor index over a flat list of vectors.
///
/// Brute-force squared Euclidean search. A document yields at most a few
/// thousand chunks, so a full scan per query is fast enough.
#[derive(Debug, Clone)]
pub struct FlatIndex {
    chunks: Vec<Chunk>,
    embeddings: Vec<Embedding>,
    dimension: usize,
}

impl FlatIndex {
    /// Build an index, pairing `chunks[i]` with `embeddings[i]`.
    pub fn build(chunks: Vec<Chunk>, embeddings: Vec<Embedding>) -> Result<Self> {
        if chunks.len() != embeddings.len() {
            return Err(Error::DimensionMismatch {
                expected: chunks.len(),
                found: embeddings.len(),
            });
        }

        let Some(first) = embeddings.first() else {
            return Err(Error::EmptyIndex);
        };
        let dimension = first.len();

        if let Some(bad) = embeddings.iter().find(|e| e.len() != dimension) {
            return Err(Error::DimensionMismatch {
                expected: dimension,
                found: bad.len(),
            });
        }

        if let Some(i) = embeddings.iter().position(|e| e.iter().any(|x| !x.is_finite())) {
            return Err(Error::EmbeddingInconsistent(format!(
                "vector {i} contains a non-finite value"
            )));
        }

        Ok(Self {
            chunks,
            embeddings,
            dimension,
        })
    }

    /// Iterate over the stored chunks in position order.
    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.chunks.iter()
    }
}

impl VectorIndex for FlatIndex {
    fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        if query.len() != self.dimension {
            return Err(Error::DimensionMismatch {
                expected: self.dimension,
                found: query.len(),
            });
        }

        let k = k.min(self.embeddings.len());
        if k == 0 {
            return Ok(Vec::new());
        }

        // max-heap holding the k closest seen so far
        let mut heap = BinaryHeap::with_capacity(k + 1);
        for (position, embedding) in self.embeddings.iter().enumerate() {
            heap.push(Neighbor {
                position,
                distance: squared_euclidean(query, embedding),
            });
            if heap.len() > k {
                heap.pop();
            }
        }

        Ok(heap.into_sorted_vec())
    }

    fn chunk(&self, position: usize) -> Option<&Chunk> {
        self.chunks.get(position)
    }

    fn len(&self) -> usize {
        self.chunks.len()
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Compute the squared Euclidean distance between two vectors.
fn squared_euclidean(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len(), "vectors must have same length");

    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}
