//! # Hybrid Search Elasticsearch Backend
//!
//! Keyword backend issuing boosted, fuzzy multi-field matches against an
//! Elasticsearch index.

mod backend;
mod request;
mod response;

pub use backend::ElasticsearchBackend;
pub use request::build_search_body;
