//! Embedding errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    /// The embedding provider was unreachable or returned malformed data.
    #[error("Vectorization failed: {0}")]
    Vectorization(String),

    /// Similarity requested over vectors of different lengths.
    #[error("Vector dimension mismatch: {left} vs {right}")]
    DimensionMismatch { left: usize, right: usize },
}
