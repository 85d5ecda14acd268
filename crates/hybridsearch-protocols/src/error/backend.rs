//! Search backend errors.

use thiserror::Error;

use super::EmbeddingError;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    #[error("Backend timed out after {0} ms")]
    Timeout(u64),

    #[error("Invalid backend response: {0}")]
    InvalidResponse(String),

    #[error("Backend API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error(transparent)]
    Embedding(#[from] EmbeddingError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_error() {
        let err = BackendError::Unavailable("connection reset".to_string());
        assert!(err.to_string().contains("unavailable"));
    }

    #[test]
    fn test_api_error() {
        let err = BackendError::Api {
            status: 503,
            message: "shard failure".to_string(),
        };
        let display = err.to_string();
        assert!(display.contains("503"));
        assert!(display.contains("shard failure"));
    }

    #[test]
    fn test_embedding_error_is_transparent() {
        let err = BackendError::from(EmbeddingError::Vectorization("down".to_string()));
        assert_eq!(err.to_string(), "Vectorization failed: down");
    }
}
