//! Query statistics data types.

use chrono::{DateTime, Utc};
use hybridsearch_protocols::Filters;
use serde::{Deserialize, Serialize};

/// One observed search call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryStat {
    pub query: String,
    pub duration_ms: u64,
    pub timestamp: DateTime<Utc>,
    pub cache_hit: bool,
    pub result_count: u64,
    #[serde(default, skip_serializing_if = "Filters::is_empty")]
    pub filters: Filters,
}

impl QueryStat {
    /// Create a stat stamped with the current time.
    pub fn new(query: impl Into<String>, duration_ms: u64, cache_hit: bool, result_count: u64) -> Self {
        Self {
            query: query.into(),
            duration_ms,
            timestamp: Utc::now(),
            cache_hit,
            result_count,
            filters: Filters::new(),
        }
    }

    pub fn with_filters(mut self, filters: Filters) -> Self {
        self.filters = filters;
        self
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}

/// Cache hit/miss counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Last cache size reported with a hit.
    pub size: usize,
    pub last_cleanup: DateTime<Utc>,
}

impl CacheStats {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            hits: 0,
            misses: 0,
            size: 0,
            last_cleanup: now,
        }
    }

    pub fn hit_rate(&self) -> f64 {
        let lookups = self.hits + self.misses;
        if lookups == 0 {
            0.0
        } else {
            self.hits as f64 / lookups as f64
        }
    }
}

/// Aggregate metrics read by alert rules.
///
/// Rules address fields by their serialized (camelCase) names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceMetrics {
    /// Mean latency of buffered queries in milliseconds.
    pub average_query_time: f64,
    pub cache_hit_rate: f64,
    pub slow_query_count: u64,
    pub total_queries: u64,
    /// Failed queries over all attempted queries.
    pub error_rate: f64,
    pub degraded_query_count: u64,
}

impl PerformanceMetrics {
    /// Look up a metric by name. `None` if unknown or not numeric.
    pub fn get(&self, name: &str) -> Option<f64> {
        serde_json::to_value(self).ok()?.get(name)?.as_f64()
    }
}

/// A query text with its call count and mean latency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopularQuery {
    pub query: String,
    pub count: u64,
    pub average_duration_ms: f64,
}

/// Selection over buffered query stats. Bounds are inclusive.
#[derive(Debug, Clone, Default)]
pub struct QueryStatsFilter {
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub min_duration_ms: Option<u64>,
}

impl QueryStatsFilter {
    pub fn matches(&self, stat: &QueryStat) -> bool {
        self.start_time.is_none_or(|start| stat.timestamp >= start)
            && self.end_time.is_none_or(|end| stat.timestamp <= end)
            && self.min_duration_ms.is_none_or(|min| stat.duration_ms >= min)
    }
}
