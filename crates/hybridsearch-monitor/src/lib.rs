//! # Hybrid Search Monitor
//!
//! Query statistics and threshold alerting for the hybrid search engine.
//!
//! ## Features
//!
//! - Bounded query stat buffer with time-based retention
//! - Cache hit/miss accounting and aggregate performance metrics
//! - Periodic rule evaluation with log, Slack and email notification channels

pub mod channels;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod rules;
pub mod stats;

pub use channels::{AlertChannel, EmailChannel, LogChannel, SlackChannel};
pub use engine::{AlertEngine, AlertFilter};
pub use error::MonitorError;
pub use metrics::MetricsRecorder;
pub use rules::default_rules;
pub use stats::{CacheStats, PerformanceMetrics, PopularQuery, QueryStat, QueryStatsFilter};
