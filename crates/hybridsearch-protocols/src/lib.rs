//! # Hybrid Search Protocols
//!
//! Shared data model and interface definitions for the hybrid search engine.
//! Contains only types and traits - no backend implementations.
//!
//! ## Core Traits
//!
//! - [`SearchBackend`] - A ranked retrieval backend (keyword or vector)
//! - [`CacheStore`] - Key/value store with TTL and glob invalidation
//! - [`EmbeddingProvider`] - Text to vector conversion
//!
//! Alert rules and alerts live here too so configuration and the monitor
//! can share them.

pub mod alert;
pub mod backend;
pub mod cache;
pub mod embedding;
pub mod error;
pub mod query;
pub mod result;

pub use alert::{Alert, AlertRule, AlertSeverity, ComparisonOperator, RuleType};
pub use backend::{BackendKind, SearchBackend};
pub use cache::{CacheStore, CacheStoreExt};
pub use embedding::EmbeddingProvider;
pub use error::{BackendError, CacheError, EmbeddingError, SearchError};
pub use query::{Filters, SearchQuery, MAX_LIMIT};
pub use result::{BackendHits, Highlights, ScoredItem, SearchResult};
