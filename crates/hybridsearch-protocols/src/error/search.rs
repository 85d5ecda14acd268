//! Query-level errors surfaced to callers of the orchestrator.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SearchError {
    /// Every requested backend failed.
    #[error("Search unavailable: {0}")]
    SearchUnavailable(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Search cancelled")]
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_unavailable_error() {
        let err = SearchError::SearchUnavailable("keyword: timeout; vector: down".to_string());
        let display = err.to_string();
        assert!(display.contains("unavailable"));
        assert!(display.contains("keyword: timeout"));
    }

    #[test]
    fn test_error_debug() {
        let err = SearchError::Cancelled;
        assert!(format!("{:?}", err).contains("Cancelled"));
    }
}
