//! Search backend protocol.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::BackendError;
use crate::query::Filters;
use crate::result::BackendHits;

/// Which ranking system a backend implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Keyword,
    Vector,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::Keyword => write!(f, "keyword"),
            BackendKind::Vector => write!(f, "vector"),
        }
    }
}

/// A ranked retrieval backend reachable over the network.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// The ranking system this backend implements.
    fn kind(&self) -> BackendKind;

    /// Run one query and return hits ranked best-first.
    ///
    /// `page` is 1-based. Implementations must not apply their own score
    /// threshold beyond what their configuration asks for.
    async fn search(
        &self,
        query: &str,
        filters: &Filters,
        page: u32,
        limit: u32,
    ) -> Result<BackendHits, BackendError>;
}
