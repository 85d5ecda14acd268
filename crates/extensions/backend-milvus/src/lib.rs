//! # Hybrid Search Milvus Backend
//!
//! Vector backend: embeds the query text and runs an approximate nearest
//! neighbour search against a Milvus collection.

mod backend;
mod request;

pub use backend::MilvusBackend;
pub use request::filter_expression;
