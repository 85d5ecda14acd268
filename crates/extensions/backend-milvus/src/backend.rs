//! Milvus vector backend.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use hybridsearch_config::VectorConfig;
use hybridsearch_protocols::{
    BackendError, BackendHits, BackendKind, EmbeddingProvider, Filters, ScoredItem, SearchBackend,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::request::SearchRequest;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Vec<serde_json::Map<String, Value>>,
}

/// Vector backend over `POST {base_url}/v2/vectordb/entities/search`.
///
/// Scores are the raw similarities reported by the server; for `L2`
/// collections distances are mapped to `1 / (1 + d)` so higher is better.
pub struct MilvusBackend {
    client: reqwest::Client,
    config: VectorConfig,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl MilvusBackend {
    pub fn new(config: VectorConfig, embedder: Arc<dyn EmbeddingProvider>) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| BackendError::Unavailable(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            config,
            embedder,
        })
    }

    pub fn config(&self) -> &VectorConfig {
        &self.config
    }

    fn search_url(&self) -> String {
        format!(
            "{}/v2/vectordb/entities/search",
            self.config.base_url.trim_end_matches('/')
        )
    }

    fn to_score(&self, distance: f64) -> f64 {
        if self.config.metric_type.eq_ignore_ascii_case("L2") {
            1.0 / (1.0 + distance.max(0.0))
        } else {
            distance
        }
    }

    fn to_item(&self, mut row: serde_json::Map<String, Value>) -> Option<ScoredItem> {
        let id = match row.get("id")? {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            _ => return None,
        };
        let score = row
            .remove("distance")
            .and_then(|d| d.as_f64())
            .map(|d| self.to_score(d));

        let mut item = match score {
            Some(score) => ScoredItem::new(id, score),
            None => ScoredItem::unscored(id),
        };
        if row.len() > 1 {
            item = item.with_source(Value::Object(row));
        }
        Some(item)
    }
}

#[async_trait]
impl SearchBackend for MilvusBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Vector
    }

    async fn search(
        &self,
        query: &str,
        filters: &Filters,
        page: u32,
        limit: u32,
    ) -> Result<BackendHits, BackendError> {
        let started = Instant::now();
        let vector = self.embedder.embed(query).await?;
        let request = SearchRequest::new(&self.config, &vector, filters, page, limit);

        let mut builder = self.client.post(self.search_url()).json(&request);
        if let Some(ref token) = self.config.token {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                BackendError::Timeout(self.config.timeout_secs * 1000)
            } else {
                BackendError::Unavailable(format!("Milvus request failed: {}", e))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(BackendError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| BackendError::InvalidResponse(e.to_string()))?;

        if parsed.code != 0 {
            return Err(BackendError::Api {
                status: u16::try_from(parsed.code).unwrap_or(u16::MAX),
                message: parsed.message.unwrap_or_default(),
            });
        }

        let items: Vec<ScoredItem> = parsed
            .data
            .into_iter()
            .filter_map(|row| self.to_item(row))
            .collect();
        let took_millis = started.elapsed().as_millis() as u64;

        debug!(hits = items.len(), took_ms = took_millis, "Milvus search finished");

        Ok(BackendHits {
            total: items.len() as u64,
            items,
            took_millis,
        })
    }
}

#[cfg(test)]
#[path = "backend_tests.rs"]
mod tests;
