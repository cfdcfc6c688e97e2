//! Document chunking
//!
//! Documents are split into fixed-size, overlapping windows so that a
//! sentence cut at one boundary still appears whole in the neighbouring
//! chunk.
//!
//! # Usage
//!
//! ```ignore
//! use docrag_lib::chunk::FixedSizeChunker;
//!
//! let chunker = FixedSizeChunker::new(500, 50)?;
//! let chunks = chunker.chunk(&document);
//! assert_eq!(chunks[0].id, 1);
//! ```

use serde::{Deserialize, Serialize};

/// A chunk of text cut from the source document
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct Chunk {
    /// Sequential identifier, starting at 1 in generation order
    pub id: usize,
    /// The text content of this chunk
    pub content: String,
    /// Character offset of the chunk within the source document
    pub offset: usize,
}

mod fixed;

pub use fixed::*;
