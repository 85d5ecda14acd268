//! Error types for the hybrid search engine.

mod backend;
mod cache;
mod embedding;
mod search;

pub use backend::*;
pub use cache::*;
pub use embedding::*;
pub use search::*;
