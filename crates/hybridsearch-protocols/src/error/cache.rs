//! Cache errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid key pattern: {0}")]
    InvalidPattern(String),

    #[error("Cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_error() {
        let err = CacheError::Unavailable("redis down".to_string());
        assert!(err.to_string().contains("redis down"));
    }

    #[test]
    fn test_serialization_error_from() {
        let json_err = serde_json::from_str::<u32>("not json").unwrap_err();
        let err = CacheError::from(json_err);
        assert!(err.to_string().contains("serialization"));
    }
}
