//! Error types for docrag

use thiserror::Error;

/// Result type alias for docrag operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in docrag operations
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid chunking or pipeline parameters
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// Empty document or empty question
    #[error("empty input: {0}")]
    EmptyInput(&'static str),

    /// The embedding service errored or timed out
    #[error("embedding service unavailable: {0}")]
    EmbeddingUnavailable(String),

    /// The embedding service returned vectors that disagree in shape
    #[error("embedding service returned inconsistent vectors: {0}")]
    EmbeddingInconsistent(String),

    /// The generation service errored or timed out
    #[error("generation service unavailable: {0}")]
    GenerationUnavailable(String),

    /// Chunks and vectors, or vectors among themselves, disagree in size
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    /// An index returned a hit for a position it does not hold
    #[error("index returned position {position} but holds {len} items")]
    PositionOutOfRange { position: usize, len: usize },

    /// Attempted to build an index from no chunks
    #[error("cannot build an index with no chunks")]
    EmptyIndex,

    /// No document has been indexed yet
    #[error("no document has been indexed")]
    IndexNotReady,

    /// A newer document load started before this one finished
    #[error("document load superseded by a newer upload")]
    Superseded,
}

impl Error {
    /// Returns `true` if the caller may reasonably try the same request again.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::EmbeddingUnavailable(_) | Self::GenerationUnavailable(_) | Self::Superseded
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_failures_are_retryable() {
        assert!(Error::EmbeddingUnavailable("timeout".into()).is_retryable());
        assert!(Error::GenerationUnavailable("503".into()).is_retryable());
    }

    #[test]
    fn test_contract_violations_are_not_retryable() {
        assert!(!Error::Configuration("overlap".into()).is_retryable());
        assert!(!Error::EmbeddingInconsistent("768 vs 512".into()).is_retryable());
        assert!(!Error::DimensionMismatch { expected: 3, found: 2 }.is_retryable());
        assert!(!Error::EmptyInput("document").is_retryable());
        assert!(!Error::PositionOutOfRange { position: 5, len: 1 }.is_retryable());
    }
}
