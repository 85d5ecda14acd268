//! # Hybrid Search Core
//!
//! In-memory cache store, weighted result fusion and the search orchestrator
//! that ties backends, cache and metrics together.

pub mod cache;
pub mod fusion;
pub mod orchestrator;

pub use cache::MemoryCacheStore;
pub use fusion::FusionConfig;
pub use orchestrator::{OrchestratorConfig, SearchOrchestrator};
