//! Query and cache statistics recorder.

use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, Duration, Utc};
use hybridsearch_config::MonitoringConfig;
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::stats::{CacheStats, PerformanceMetrics, PopularQuery, QueryStat, QueryStatsFilter};

/// Thread-safe accumulator for query stats and cache counters.
///
/// Query stats live in a fixed-capacity ring buffer; the oldest stat is
/// evicted once the buffer is full. A time-based sweep, checked on every
/// cache observation, drops stats past the retention window and resets the
/// hit/miss counters.
pub struct MetricsRecorder {
    config: MonitoringConfig,
    state: Mutex<RecorderState>,
}

struct RecorderState {
    stats: VecDeque<QueryStat>,
    cache: CacheStats,
    failed_queries: u64,
    degraded_queries: u64,
}

impl MetricsRecorder {
    pub fn new(config: MonitoringConfig) -> Self {
        let capacity = config.max_query_stats.min(4096);
        Self {
            config,
            state: Mutex::new(RecorderState {
                stats: VecDeque::with_capacity(capacity),
                cache: CacheStats::new(Utc::now()),
                failed_queries: 0,
                degraded_queries: 0,
            }),
        }
    }

    pub fn config(&self) -> &MonitoringConfig {
        &self.config
    }

    /// Append a query stat, evicting the oldest past capacity.
    ///
    /// A stat stamped earlier than the newest buffered one is clamped to it so
    /// buffer order stays chronological.
    pub fn record_query_stats(&self, mut stat: QueryStat) {
        if !self.config.enabled || !self.config.enable_query_stats {
            return;
        }

        if stat.duration_ms > self.config.slow_query_threshold_ms {
            warn!(
                query = %stat.query,
                duration_ms = stat.duration_ms,
                filters = ?stat.filters,
                "Slow query detected"
            );
        }

        let mut state = self.state.lock();
        if let Some(last) = state.stats.back() {
            if stat.timestamp < last.timestamp {
                stat.timestamp = last.timestamp;
            }
        }
        state.stats.push_back(stat);
        while state.stats.len() > self.config.max_query_stats {
            state.stats.pop_front();
        }
    }

    /// Count a cache hit and remember the current cache size.
    pub fn record_cache_hit(&self, size: usize) {
        if !self.cache_stats_enabled() {
            return;
        }
        {
            let mut state = self.state.lock();
            state.cache.hits += 1;
            state.cache.size = size;
        }
        self.maybe_sweep(Utc::now());
    }

    pub fn record_cache_miss(&self) {
        if !self.cache_stats_enabled() {
            return;
        }
        self.state.lock().cache.misses += 1;
        self.maybe_sweep(Utc::now());
    }

    /// Count a query that produced no result at all.
    pub fn record_error(&self) {
        if self.config.enabled {
            self.state.lock().failed_queries += 1;
        }
    }

    /// Count a query answered by one backend only.
    pub fn record_degraded(&self) {
        if self.config.enabled {
            self.state.lock().degraded_queries += 1;
        }
    }

    /// Run the retention sweep if the cleanup interval has elapsed.
    /// Returns whether a sweep ran.
    pub fn maybe_sweep(&self, now: DateTime<Utc>) -> bool {
        let interval = Duration::seconds(self.config.cleanup_interval_secs as i64);
        let retention = Duration::seconds(self.config.retention_secs as i64);

        let mut state = self.state.lock();
        if now - state.cache.last_cleanup < interval {
            return false;
        }

        let cutoff = now - retention;
        let before = state.stats.len();
        // Buffer is chronological, so expired stats sit at the front.
        while state.stats.front().is_some_and(|s| s.timestamp < cutoff) {
            state.stats.pop_front();
        }

        state.cache.hits = 0;
        state.cache.misses = 0;
        state.cache.last_cleanup = now;
        state.failed_queries = 0;
        state.degraded_queries = 0;

        debug!(
            dropped = before - state.stats.len(),
            remaining = state.stats.len(),
            "Query stats swept"
        );
        true
    }

    pub fn get_performance_metrics(&self) -> PerformanceMetrics {
        let state = self.state.lock();
        let total = state.stats.len() as u64;

        let average_query_time = if total == 0 {
            0.0
        } else {
            state.stats.iter().map(|s| s.duration_ms as f64).sum::<f64>() / total as f64
        };

        let slow_query_count = state
            .stats
            .iter()
            .filter(|s| s.duration_ms > self.config.slow_query_threshold_ms)
            .count() as u64;

        let attempted = total + state.failed_queries;
        let error_rate = if attempted == 0 {
            0.0
        } else {
            state.failed_queries as f64 / attempted as f64
        };

        PerformanceMetrics {
            average_query_time,
            cache_hit_rate: state.cache.hit_rate(),
            slow_query_count,
            total_queries: total,
            error_rate,
            degraded_query_count: state.degraded_queries,
        }
    }

    /// Most frequent query texts, by count descending then text ascending.
    pub fn get_popular_queries(&self, limit: usize) -> Vec<PopularQuery> {
        let state = self.state.lock();
        let mut groups: HashMap<&str, (u64, u64)> = HashMap::new();
        for stat in &state.stats {
            let entry = groups.entry(stat.query.as_str()).or_default();
            entry.0 += 1;
            entry.1 += stat.duration_ms;
        }

        let mut popular: Vec<PopularQuery> = groups
            .into_iter()
            .map(|(query, (count, total_ms))| PopularQuery {
                query: query.to_string(),
                count,
                average_duration_ms: total_ms as f64 / count as f64,
            })
            .collect();

        popular.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.query.cmp(&b.query)));
        popular.truncate(limit);
        popular
    }

    pub fn get_query_stats(&self, filter: &QueryStatsFilter) -> Vec<QueryStat> {
        self.state
            .lock()
            .stats
            .iter()
            .filter(|s| filter.matches(s))
            .cloned()
            .collect()
    }

    pub fn get_cache_stats(&self) -> CacheStats {
        self.state.lock().cache.clone()
    }

    fn cache_stats_enabled(&self) -> bool {
        self.config.enabled && self.config.enable_cache_stats
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new(MonitoringConfig::default())
    }
}

#[cfg(test)]
#[path = "metrics_tests.rs"]
mod tests;
