//! # Hybrid Search Embedding Client
//!
//! Turns query text into dense vectors by calling an HTTP encoder service.
//! Inputs are normalized before encoding and vectors are cached by raw text.

mod client;
mod preprocess;
mod similarity;

pub use client::EmbeddingClient;
pub use preprocess::Preprocessor;
pub use similarity::similarity;
