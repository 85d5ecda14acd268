//! Embedding provider protocol.

use async_trait::async_trait;

use crate::error::EmbeddingError;

/// Converts text into a dense vector.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;
}
