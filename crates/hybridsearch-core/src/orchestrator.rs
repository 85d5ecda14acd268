//! Search orchestration: cache lookup, backend dispatch, fusion, cache write
//! and stats recording for one query.

use std::sync::Arc;
use std::time::Duration;

use hybridsearch_config::Config;
use hybridsearch_monitor::{MetricsRecorder, QueryStat};
use hybridsearch_protocols::{
    BackendError, BackendHits, CacheError, CacheStore, CacheStoreExt, SearchBackend, SearchError,
    SearchQuery, SearchResult,
};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::fusion::{self, FusionConfig};

/// Orchestrator settings.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Whether results are read from and written to the cache at all.
    pub cache_enabled: bool,
    pub result_ttl: Duration,
    pub key_prefix: String,
    pub fusion: FusionConfig,
    /// Query both backends concurrently.
    pub parallel: bool,
    /// Deadline for each backend call.
    pub backend_timeout: Duration,
    /// Largest `page * limit` accepted.
    pub max_candidate_window: u32,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            cache_enabled: true,
            result_ttl: Duration::from_secs(3600),
            key_prefix: "search:".to_string(),
            fusion: FusionConfig::default(),
            parallel: true,
            backend_timeout: Duration::from_secs(10),
            max_candidate_window: 10_000,
        }
    }
}

impl From<&Config> for OrchestratorConfig {
    fn from(config: &Config) -> Self {
        Self {
            cache_enabled: config.cache.enabled,
            result_ttl: Duration::from_secs(config.cache.result_ttl_secs),
            key_prefix: config.cache.key_prefix.clone(),
            fusion: FusionConfig::from(&config.hybrid),
            parallel: config.hybrid.enable_parallel_search,
            backend_timeout: Duration::from_secs(config.hybrid.backend_timeout_secs),
            max_candidate_window: config.hybrid.max_candidate_window,
        }
    }
}

/// Runs hybrid queries against a keyword backend and an optional vector
/// backend, with result caching and stat recording.
pub struct SearchOrchestrator {
    keyword: Arc<dyn SearchBackend>,
    vector: Option<Arc<dyn SearchBackend>>,
    cache: Arc<dyn CacheStore>,
    metrics: Arc<MetricsRecorder>,
    config: OrchestratorConfig,
}

impl SearchOrchestrator {
    /// Create a keyword-only orchestrator.
    pub fn new(
        keyword: Arc<dyn SearchBackend>,
        cache: Arc<dyn CacheStore>,
        metrics: Arc<MetricsRecorder>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            keyword,
            vector: None,
            cache,
            metrics,
            config,
        }
    }

    pub fn with_vector_backend(mut self, vector: Arc<dyn SearchBackend>) -> Self {
        self.vector = Some(vector);
        self
    }

    pub fn has_vector_backend(&self) -> bool {
        self.vector.is_some()
    }

    pub fn metrics(&self) -> &Arc<MetricsRecorder> {
        &self.metrics
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Run one query.
    ///
    /// Returns a possibly degraded result when one backend fails, and
    /// [`SearchError::SearchUnavailable`] only when every requested backend
    /// failed.
    pub async fn search(&self, query: &SearchQuery) -> Result<SearchResult, SearchError> {
        query.validate()?;
        query.check_window(self.config.max_candidate_window)?;
        let started = Instant::now();

        let cache_key = self.cache_key(query);
        if let Some(ref key) = cache_key {
            if let Some(cached) = self.read_cache(key).await {
                debug!(query = %query.query(), "Cache hit");
                self.record_stats(query, started, true, cached.total);
                return Ok(cached);
            }
        }

        let result = self.execute(query, started).await?;

        if let Some(ref key) = cache_key {
            if result.degraded {
                debug!(query = %query.query(), "Degraded result not cached");
            } else if let Err(e) = self
                .cache
                .set_json(key, &result, Some(self.config.result_ttl))
                .await
            {
                warn!(error = %e, "Failed to write search result to cache");
            }
        }

        self.record_stats(query, started, false, result.total);
        Ok(result)
    }

    /// Run one query, aborting in-flight backend calls when `token` is
    /// cancelled.
    pub async fn search_with_cancel(
        &self,
        query: &SearchQuery,
        token: &CancellationToken,
    ) -> Result<SearchResult, SearchError> {
        tokio::select! {
            biased;
            _ = token.cancelled() => {
                info!(query = %query.query(), "Search cancelled");
                Err(SearchError::Cancelled)
            }
            result = self.search(query) => result,
        }
    }

    /// Delete cached results whose key matches `<prefix><pattern>`.
    pub async fn invalidate(&self, pattern: &str) -> Result<usize, CacheError> {
        let removed = self
            .cache
            .delete_by_pattern(&format!("{}{}", self.config.key_prefix, pattern))
            .await?;
        info!(pattern, removed, "Invalidated cached search results");
        Ok(removed)
    }

    fn cache_key(&self, query: &SearchQuery) -> Option<String> {
        if !self.config.cache_enabled || !query.use_cache() {
            return None;
        }
        match query.cache_key(&self.config.key_prefix) {
            Ok(key) => Some(key),
            Err(e) => {
                warn!(error = %e, "Failed to derive cache key, bypassing cache");
                None
            }
        }
    }

    /// Cache lookup. Read failures count as misses.
    async fn read_cache(&self, key: &str) -> Option<SearchResult> {
        match self.cache.get_json::<SearchResult>(key).await {
            Ok(Some(result)) => {
                let size = self.cache.len().await.unwrap_or_default();
                self.metrics.record_cache_hit(size);
                Some(result)
            }
            Ok(None) => {
                self.metrics.record_cache_miss();
                None
            }
            Err(e) => {
                warn!(error = %e, "Cache read failed, treating as miss");
                self.metrics.record_cache_miss();
                None
            }
        }
    }

    async fn execute(&self, query: &SearchQuery, started: Instant) -> Result<SearchResult, SearchError> {
        let vector = if query.use_vector_search() {
            self.vector.as_deref()
        } else {
            None
        };

        let keyword_call = self.call_backend(self.keyword.as_ref(), query);
        let (keyword, vector) = match vector {
            Some(vector) if self.config.parallel => {
                let (k, v) = tokio::join!(keyword_call, self.call_backend(vector, query));
                (k, Some(v))
            }
            Some(vector) => {
                let k = keyword_call.await;
                let v = self.call_backend(vector, query).await;
                (k, Some(v))
            }
            None => (keyword_call.await, None),
        };

        let (ranked, total, degraded) = match (keyword, vector) {
            (Ok(k), None) => (fusion::rank_single(&k.items), k.total, false),
            (Ok(k), Some(Ok(v))) => {
                let fused = fusion::fuse(&k.items, &v.items, &self.config.fusion);
                (fused, k.total.max(v.total), false)
            }
            (Ok(k), Some(Err(e))) => {
                warn!(query = %query.query(), error = %e, "Vector backend failed, serving keyword results");
                (fusion::rank_single(&k.items), k.total, true)
            }
            (Err(e), Some(Ok(v))) => {
                warn!(query = %query.query(), error = %e, "Keyword backend failed, serving vector results");
                (fusion::rank_single(&v.items), v.total, true)
            }
            (Err(e), None) => {
                error!(query = %query.query(), error = %e, "Keyword backend failed");
                self.metrics.record_error();
                return Err(SearchError::SearchUnavailable(format!("keyword: {}", e)));
            }
            (Err(ke), Some(Err(ve))) => {
                error!(query = %query.query(), keyword = %ke, vector = %ve, "All backends failed");
                self.metrics.record_error();
                return Err(SearchError::SearchUnavailable(format!(
                    "keyword: {}; vector: {}",
                    ke, ve
                )));
            }
        };

        if degraded {
            self.metrics.record_degraded();
        }

        let total = total.max(ranked.len() as u64);
        Ok(SearchResult {
            items: fusion::paginate(ranked, query.page(), query.limit()),
            total,
            page: query.page(),
            limit: query.limit(),
            took_millis: started.elapsed().as_millis() as u64,
            degraded,
        })
    }

    /// One backend call for the query's candidate window, bounded by the
    /// backend timeout.
    async fn call_backend(
        &self,
        backend: &dyn SearchBackend,
        query: &SearchQuery,
    ) -> Result<BackendHits, BackendError> {
        let window = query.candidate_window();
        let timeout = self.config.backend_timeout;
        match tokio::time::timeout(timeout, backend.search(query.query(), query.filters(), 1, window)).await {
            Ok(result) => {
                if let Ok(ref hits) = result {
                    debug!(
                        backend = %backend.kind(),
                        hits = hits.items.len(),
                        took_ms = hits.took_millis,
                        "Backend call finished"
                    );
                }
                result
            }
            Err(_) => Err(BackendError::Timeout(timeout.as_millis() as u64)),
        }
    }

    fn record_stats(&self, query: &SearchQuery, started: Instant, cache_hit: bool, result_count: u64) {
        let duration_ms = started.elapsed().as_millis() as u64;
        self.metrics.record_query_stats(
            QueryStat::new(query.query(), duration_ms, cache_hit, result_count)
                .with_filters(query.filters().clone()),
        );
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
