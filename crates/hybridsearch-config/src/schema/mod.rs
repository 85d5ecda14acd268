//! Configuration schema definitions.

use serde::{Deserialize, Serialize};

mod schema_backends;
mod schema_monitor;

pub use schema_backends::*;
pub use schema_monitor::*;

/// Shared default helper used by submodules.
pub(crate) fn default_true() -> bool {
    true
}

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub embedding: EmbeddingConfig,

    #[serde(default)]
    pub keyword: KeywordConfig,

    #[serde(default)]
    pub vector: VectorConfig,

    #[serde(default)]
    pub hybrid: HybridConfig,

    #[serde(default)]
    pub monitoring: MonitoringConfig,

    #[serde(default)]
    pub alerts: AlertsConfig,
}

/// Cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Whether search results are cached at all.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Time-to-live for cached search results.
    #[serde(default = "default_result_ttl")]
    pub result_ttl_secs: u64,

    /// Time-to-live for cached embedding vectors.
    #[serde(default = "default_vector_ttl")]
    pub vector_ttl_secs: u64,

    /// Key namespace for search results.
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,

    /// How often expired entries are reclaimed while serving.
    #[serde(default = "default_purge_interval")]
    pub purge_interval_secs: u64,
}

fn default_result_ttl() -> u64 {
    3600
}

fn default_vector_ttl() -> u64 {
    86400
}

fn default_key_prefix() -> String {
    "search:".to_string()
}

fn default_purge_interval() -> u64 {
    300
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            result_ttl_secs: default_result_ttl(),
            vector_ttl_secs: default_vector_ttl(),
            key_prefix: default_key_prefix(),
            purge_interval_secs: default_purge_interval(),
        }
    }
}

/// Score fusion and dispatch configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HybridConfig {
    /// Weight applied to keyword scores.
    #[serde(default = "default_text_weight")]
    pub text_weight: f64,

    /// Weight applied to vector scores.
    #[serde(default = "default_vector_weight")]
    pub vector_weight: f64,

    /// Query both backends concurrently instead of one after the other.
    #[serde(default = "default_true")]
    pub enable_parallel_search: bool,

    /// Per-backend deadline.
    #[serde(default = "default_backend_timeout")]
    pub backend_timeout_secs: u64,

    /// Upper bound on `page * limit`. Deeper pages are rejected instead of
    /// asking backends for more hits than they serve (Elasticsearch's
    /// default `max_result_window` is 10000).
    #[serde(default = "default_max_candidate_window")]
    pub max_candidate_window: u32,
}

fn default_text_weight() -> f64 {
    0.6
}

fn default_vector_weight() -> f64 {
    0.4
}

fn default_backend_timeout() -> u64 {
    10
}

fn default_max_candidate_window() -> u32 {
    10_000
}

impl Default for HybridConfig {
    fn default() -> Self {
        Self {
            text_weight: default_text_weight(),
            vector_weight: default_vector_weight(),
            enable_parallel_search: default_true(),
            backend_timeout_secs: default_backend_timeout(),
            max_candidate_window: default_max_candidate_window(),
        }
    }
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
