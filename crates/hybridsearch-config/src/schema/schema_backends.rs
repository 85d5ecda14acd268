//! Backend configuration types (embedding service, keyword index, vector index).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::default_true;

/// Embedding service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// HTTP endpoint accepting `{text, maxLength}`.
    #[serde(default = "default_embedding_endpoint")]
    pub endpoint: String,

    /// Maximum number of characters sent to the model.
    #[serde(default = "default_max_length")]
    pub max_length: usize,

    #[serde(default = "default_embedding_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,

    /// Chunk size for batch vectorization.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Inclusive code point ranges kept during preprocessing in addition to
    /// ASCII word characters and whitespace.
    #[serde(default = "default_allowed_ranges")]
    pub allowed_ranges: Vec<[u32; 2]>,
}

fn default_embedding_endpoint() -> String {
    "http://localhost:8000/encode".to_string()
}

fn default_max_length() -> usize {
    512
}

fn default_embedding_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay() -> u64 {
    1000
}

fn default_batch_size() -> usize {
    32
}

fn default_allowed_ranges() -> Vec<[u32; 2]> {
    // CJK unified ideographs
    vec![[0x4E00, 0x9FA5]]
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            endpoint: default_embedding_endpoint(),
            max_length: default_max_length(),
            timeout_secs: default_embedding_timeout(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay(),
            batch_size: default_batch_size(),
            allowed_ranges: default_allowed_ranges(),
        }
    }
}

/// Keyword (Elasticsearch) backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordConfig {
    #[serde(default = "default_keyword_url")]
    pub base_url: String,

    #[serde(default = "default_index")]
    pub index: String,

    /// Searched fields with their boost factors.
    #[serde(default = "default_field_boosts")]
    pub field_boosts: BTreeMap<String, f64>,

    #[serde(default = "default_fuzziness")]
    pub fuzziness: String,

    #[serde(default = "default_max_expansions")]
    pub max_expansions: u32,

    /// Hits scoring below this are dropped.
    #[serde(default = "default_min_score")]
    pub min_score: f64,

    #[serde(default = "default_fragment_size")]
    pub highlight_fragment_size: u32,

    #[serde(default = "default_number_of_fragments")]
    pub highlight_fragments: u32,

    #[serde(default = "default_pre_tag")]
    pub highlight_pre_tag: String,

    #[serde(default = "default_post_tag")]
    pub highlight_post_tag: String,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    #[serde(default = "default_backend_request_timeout")]
    pub timeout_secs: u64,
}

fn default_keyword_url() -> String {
    "http://localhost:9200".to_string()
}

fn default_index() -> String {
    "knowledge".to_string()
}

fn default_field_boosts() -> BTreeMap<String, f64> {
    BTreeMap::from([
        ("title".to_string(), 2.0),
        ("content".to_string(), 1.0),
        ("tags".to_string(), 1.5),
    ])
}

fn default_fuzziness() -> String {
    "AUTO".to_string()
}

fn default_max_expansions() -> u32 {
    50
}

fn default_min_score() -> f64 {
    0.1
}

fn default_fragment_size() -> u32 {
    150
}

fn default_number_of_fragments() -> u32 {
    3
}

fn default_pre_tag() -> String {
    "<em>".to_string()
}

fn default_post_tag() -> String {
    "</em>".to_string()
}

fn default_backend_request_timeout() -> u64 {
    10
}

impl Default for KeywordConfig {
    fn default() -> Self {
        Self {
            base_url: default_keyword_url(),
            index: default_index(),
            field_boosts: default_field_boosts(),
            fuzziness: default_fuzziness(),
            max_expansions: default_max_expansions(),
            min_score: default_min_score(),
            highlight_fragment_size: default_fragment_size(),
            highlight_fragments: default_number_of_fragments(),
            highlight_pre_tag: default_pre_tag(),
            highlight_post_tag: default_post_tag(),
            username: None,
            password: None,
            timeout_secs: default_backend_request_timeout(),
        }
    }
}

/// Vector (Milvus) backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorConfig {
    /// When disabled, queries run keyword-only.
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_vector_url")]
    pub base_url: String,

    #[serde(default = "default_collection")]
    pub collection: String,

    /// Name of the dense vector field.
    #[serde(default = "default_anns_field")]
    pub anns_field: String,

    /// `COSINE`, `IP` or `L2`.
    #[serde(default = "default_metric_type")]
    pub metric_type: String,

    #[serde(default = "default_nprobe")]
    pub nprobe: u32,

    #[serde(default = "default_ef")]
    pub ef: u32,

    /// Neighbours requested per result slot.
    #[serde(default = "default_candidate_multiplier")]
    pub candidate_multiplier: u32,

    #[serde(default = "default_output_fields")]
    pub output_fields: Vec<String>,

    #[serde(default)]
    pub token: Option<String>,

    #[serde(default = "default_backend_request_timeout")]
    pub timeout_secs: u64,
}

fn default_vector_url() -> String {
    "http://localhost:19530".to_string()
}

fn default_collection() -> String {
    "knowledge".to_string()
}

fn default_anns_field() -> String {
    "embedding".to_string()
}

fn default_metric_type() -> String {
    "COSINE".to_string()
}

fn default_nprobe() -> u32 {
    16
}

fn default_ef() -> u32 {
    64
}

fn default_candidate_multiplier() -> u32 {
    2
}

fn default_output_fields() -> Vec<String> {
    vec!["id".to_string()]
}

impl Default for VectorConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            base_url: default_vector_url(),
            collection: default_collection(),
            anns_field: default_anns_field(),
            metric_type: default_metric_type(),
            nprobe: default_nprobe(),
            ef: default_ef(),
            candidate_multiplier: default_candidate_multiplier(),
            output_fields: default_output_fields(),
            token: None,
            timeout_secs: default_backend_request_timeout(),
        }
    }
}
