//! Component wiring from a loaded configuration.

use std::sync::Arc;
use std::time::Duration;

use hybridsearch_backend_elasticsearch::ElasticsearchBackend;
use hybridsearch_backend_milvus::MilvusBackend;
use hybridsearch_config::Config;
use hybridsearch_core::{MemoryCacheStore, OrchestratorConfig, SearchOrchestrator};
use hybridsearch_embedding_http::EmbeddingClient;
use hybridsearch_monitor::{AlertEngine, MetricsRecorder};
use hybridsearch_protocols::CacheStore;
use tracing::info;

/// Everything a running instance needs.
pub(crate) struct Services {
    pub orchestrator: SearchOrchestrator,
    pub alerts: AlertEngine,
    pub cache: Arc<MemoryCacheStore>,
    purge_interval: Duration,
    alerts_enabled: bool,
}

impl Services {
    /// Build the cache, backends, orchestrator and alert engine.
    pub(crate) fn build(config: &Config) -> anyhow::Result<Self> {
        let store = Arc::new(MemoryCacheStore::new());
        let cache: Arc<dyn CacheStore> = store.clone();
        let metrics = Arc::new(MetricsRecorder::new(config.monitoring.clone()));

        let keyword = Arc::new(ElasticsearchBackend::new(config.keyword.clone())?);
        info!(
            "Keyword backend: {}/{}",
            config.keyword.base_url, config.keyword.index
        );

        let mut orchestrator = SearchOrchestrator::new(
            keyword,
            cache.clone(),
            metrics.clone(),
            OrchestratorConfig::from(config),
        );

        if config.vector.enabled {
            let embedder = EmbeddingClient::new(config.embedding.clone())?
                .with_cache(cache, Duration::from_secs(config.cache.vector_ttl_secs));
            let vector = MilvusBackend::new(config.vector.clone(), Arc::new(embedder))?;
            info!(
                "Vector backend: {}/{}",
                config.vector.base_url, config.vector.collection
            );
            orchestrator = orchestrator.with_vector_backend(Arc::new(vector));
        } else {
            info!("Vector backend disabled, keyword search only");
        }

        let alerts = AlertEngine::from_config(metrics, &config.alerts);

        Ok(Self {
            orchestrator,
            alerts,
            cache: store,
            purge_interval: Duration::from_secs(config.cache.purge_interval_secs),
            alerts_enabled: config.alerts.enabled,
        })
    }

    /// Start the cache sweeper and, when enabled, the alert loop.
    pub(crate) fn start_background(&self) {
        self.cache.start_sweeper(self.purge_interval);
        if self.alerts_enabled {
            self.alerts.start();
        }
    }

    /// Stop every background task and wait for them to exit.
    pub(crate) async fn shutdown(&self) {
        self.alerts.stop().await;
        self.cache.stop_sweeper().await;
    }
}
