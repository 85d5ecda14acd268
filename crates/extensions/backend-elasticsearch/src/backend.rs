//! Elasticsearch keyword backend.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use hybridsearch_config::KeywordConfig;
use hybridsearch_protocols::{BackendError, BackendHits, BackendKind, Filters, SearchBackend};
use tracing::debug;

use crate::request::build_search_body;
use crate::response::{into_items, SearchResponse};

/// Keyword backend over `POST {base_url}/{index}/_search`.
pub struct ElasticsearchBackend {
    client: reqwest::Client,
    config: KeywordConfig,
}

impl ElasticsearchBackend {
    pub fn new(config: KeywordConfig) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| BackendError::Unavailable(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &KeywordConfig {
        &self.config
    }

    fn search_url(&self) -> String {
        format!(
            "{}/{}/_search",
            self.config.base_url.trim_end_matches('/'),
            self.config.index
        )
    }
}

#[async_trait]
impl SearchBackend for ElasticsearchBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Keyword
    }

    async fn search(
        &self,
        query: &str,
        filters: &Filters,
        page: u32,
        limit: u32,
    ) -> Result<BackendHits, BackendError> {
        let started = Instant::now();
        let body = build_search_body(&self.config, query, filters, page, limit);

        let mut request = self.client.post(self.search_url()).json(&body);
        if let Some(ref username) = self.config.username {
            request = request.basic_auth(username, self.config.password.as_ref());
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                BackendError::Timeout(self.config.timeout_secs * 1000)
            } else {
                BackendError::Unavailable(format!("Elasticsearch request failed: {}", e))
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

        let total = parsed.hits.total.as_ref().map(|t| t.value());
        let items = into_items(parsed.hits.hits, self.config.min_score);
        let took_millis = parsed
            .took
            .unwrap_or_else(|| started.elapsed().as_millis() as u64);

        debug!(hits = items.len(), took_ms = took_millis, "Elasticsearch search finished");

        Ok(BackendHits {
            total: total.unwrap_or(items.len() as u64),
            items,
            took_millis,
        })
    }
}

#[cfg(test)]
#[path = "backend_tests.rs"]
mod tests;
