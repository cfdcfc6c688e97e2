//! Vector index over one document's chunks
//!
//! The index is built in one step from chunks and their embeddings and is
//! immutable afterwards. A new document gets a new index.
//!
//! # Storage Model
//!
//! Each stored item consists of:
//! - Chunk: the original text, id and offset
//! - Embedding: the vector representation
//!
//! Items are addressed by position, which equals `chunk.id - 1`.
//!
//! # Usage
//!
//! ```ignore
//! use docrag_lib::index::{FlatIndex, VectorIndex};
//!
//! let index = FlatIndex::build(chunks, embeddings)?;
//!
//! // Nearest chunks by Euclidean distance
//! let neighbors = index.search(&query_embedding, 3)?;
//! let best = index.chunk(neighbors[0].position);
//! ```

use std::cmp::Ordering;

use crate::chunk::Chunk;
use crate::Result;

/// A search hit: stored position and squared Euclidean distance to the query
#[derive(Debug, Clone, Copy)]
pub struct Neighbor {
    /// Position of the matched item in the index
    pub position: usize,
    /// Squared Euclidean distance (lower is closer)
    pub distance: f32,
}

// Orders by distance, then by position, so heaps and sorts are deterministic.
impl Ord for Neighbor {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then(self.position.cmp(&other.position))
    }
}

impl PartialOrd for Neighbor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Neighbor {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Neighbor {}

/// Trait for nearest-neighbor indexes
pub trait VectorIndex: Send + Sync {
    /// Search for the stored vectors closest to the query
    ///
    /// # Arguments
    /// * `query` - The query vector
    /// * `k` - Number of results to return, clamped to the index size
    ///
    /// # Returns
    /// Up to `k` neighbors sorted by ascending distance, ties broken by
    /// lower position
    fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>>;

    /// Get the chunk stored at `position`
    fn chunk(&self, position: usize) -> Option<&Chunk>;

    /// Get total number of stored chunks
    fn len(&self) -> usize;

    /// Check if index is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Dimension shared by every stored vector
    fn dimension(&self) -> usize;
}

mod flat;

pub use flat::*;
