//! Monitoring and alerting configuration types.

use hybridsearch_protocols::AlertRule;
use serde::{Deserialize, Serialize};

use super::default_true;

/// Query statistics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_true")]
    pub enable_query_stats: bool,

    #[serde(default = "default_true")]
    pub enable_cache_stats: bool,

    /// Queries slower than this are counted and logged as slow.
    #[serde(default = "default_slow_query_threshold")]
    pub slow_query_threshold_ms: u64,

    /// Capacity of the query stat ring buffer.
    #[serde(default = "default_max_query_stats")]
    pub max_query_stats: usize,

    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_secs: u64,

    /// Stats older than this are dropped by the periodic sweep.
    #[serde(default = "default_retention")]
    pub retention_secs: u64,

    #[serde(default = "default_popular_limit")]
    pub popular_queries_limit: usize,
}

fn default_slow_query_threshold() -> u64 {
    1000
}

fn default_max_query_stats() -> usize {
    1000
}

fn default_cleanup_interval() -> u64 {
    3600
}

fn default_retention() -> u64 {
    86400
}

fn default_popular_limit() -> usize {
    10
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            enable_query_stats: default_true(),
            enable_cache_stats: default_true(),
            slow_query_threshold_ms: default_slow_query_threshold(),
            max_query_stats: default_max_query_stats(),
            cleanup_interval_secs: default_cleanup_interval(),
            retention_secs: default_retention(),
            popular_queries_limit: default_popular_limit(),
        }
    }
}

/// Alert engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_check_interval")]
    pub check_interval_secs: u64,

    /// Capacity of the alert history.
    #[serde(default = "default_max_history")]
    pub max_history: usize,

    /// Install the built-in slow-query, cache-hit and error-rate rules.
    #[serde(default = "default_true")]
    pub default_rules: bool,

    /// Additional rules; a rule with a built-in id replaces it.
    #[serde(default)]
    pub rules: Vec<AlertRule>,

    #[serde(default)]
    pub slack: Option<SlackConfig>,

    #[serde(default)]
    pub email: Option<EmailConfig>,
}

fn default_check_interval() -> u64 {
    60
}

fn default_max_history() -> usize {
    1000
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            check_interval_secs: default_check_interval(),
            max_history: default_max_history(),
            default_rules: default_true(),
            rules: Vec::new(),
            slack: None,
            email: None,
        }
    }
}

/// Slack incoming webhook settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlackConfig {
    pub webhook_url: String,

    #[serde(default)]
    pub channel: Option<String>,

    #[serde(default = "default_slack_username")]
    pub username: String,
}

fn default_slack_username() -> String {
    "hybridsearch".to_string()
}

/// Email notification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    pub smtp_host: String,

    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,

    pub from: String,

    #[serde(default)]
    pub to: Vec<String>,
}

fn default_smtp_port() -> u16 {
    587
}
