//! HTTP embedding client.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::try_join_all;
use hybridsearch_config::EmbeddingConfig;
use hybridsearch_protocols::{CacheStore, CacheStoreExt, EmbeddingError, EmbeddingProvider};
use serde::Serialize;
use tracing::{debug, error, warn};

use crate::preprocess::Preprocessor;

const CACHE_PREFIX: &str = "vector:";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EncodeRequest<'a> {
    text: &'a str,
    max_length: usize,
}

/// Failure of a single encode attempt.
enum AttemptError {
    /// Network error, timeout or 5xx; worth retrying.
    Transient(String),
    Fatal(String),
}

/// Client for an HTTP text encoder returning a JSON numeric array.
pub struct EmbeddingClient {
    client: reqwest::Client,
    config: EmbeddingConfig,
    preprocessor: Preprocessor,
    cache: Option<(Arc<dyn CacheStore>, Duration)>,
}

impl EmbeddingClient {
    pub fn new(config: EmbeddingConfig) -> Result<Self, EmbeddingError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| EmbeddingError::Vectorization(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            preprocessor: Preprocessor::from_config(&config),
            config,
            cache: None,
        })
    }

    /// Cache vectors in `cache` for `ttl`, keyed by raw input text.
    pub fn with_cache(mut self, cache: Arc<dyn CacheStore>, ttl: Duration) -> Self {
        self.cache = Some((cache, ttl));
        self
    }

    pub fn config(&self) -> &EmbeddingConfig {
        &self.config
    }

    /// Encode one text. With `use_cache` and a cache attached, a cached vector
    /// for the same raw text is returned without calling the encoder.
    pub async fn vectorize(&self, text: &str, use_cache: bool) -> Result<Vec<f32>, EmbeddingError> {
        let cache = self.cache.as_ref().filter(|_| use_cache);
        let key = format!("{}{}", CACHE_PREFIX, text);

        if let Some((store, _)) = cache {
            match store.get_json::<Vec<f32>>(&key).await {
                Ok(Some(vector)) => {
                    debug!(dimension = vector.len(), "Embedding cache hit");
                    return Ok(vector);
                }
                Ok(None) => {}
                Err(e) => warn!(error = %e, "Embedding cache read failed"),
            }
        }

        let processed = self.preprocessor.apply(text);
        if processed.is_empty() {
            return Err(EmbeddingError::Vectorization(
                "Text is empty after preprocessing".to_string(),
            ));
        }

        let vector = self.encode(&processed).await?;

        if let Some((store, ttl)) = cache {
            if let Err(e) = store.set_json(&key, &vector, Some(*ttl)).await {
                warn!(error = %e, "Embedding cache write failed");
            }
        }

        Ok(vector)
    }

    /// Encode many texts, `batch_size` at a time, each batch concurrently.
    /// Output order matches input order.
    pub async fn vectorize_batch<S: AsRef<str>>(
        &self,
        texts: &[S],
        use_cache: bool,
    ) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let mut vectors = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.config.batch_size.max(1)) {
            let encoded = try_join_all(batch.iter().map(|t| self.vectorize(t.as_ref(), use_cache))).await?;
            vectors.extend(encoded);
        }
        Ok(vectors)
    }

    async fn encode(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let max_retries = self.config.max_retries;
        let mut last_error = String::new();

        for attempt in 0..=max_retries {
            match self.encode_once(text).await {
                Ok(vector) => {
                    debug!(dimension = vector.len(), "Text encoded");
                    return Ok(vector);
                }
                Err(AttemptError::Fatal(message)) => {
                    return Err(EmbeddingError::Vectorization(message));
                }
                Err(AttemptError::Transient(message)) => {
                    if attempt < max_retries {
                        warn!("Embedding attempt {} failed: {}, retrying...", attempt + 1, message);
                        tokio::time::sleep(Duration::from_millis(self.config.retry_delay_ms)).await;
                    }
                    last_error = message;
                }
            }
        }

        error!("Embedding failed after {} attempts", max_retries + 1);
        Err(EmbeddingError::Vectorization(last_error))
    }

    async fn encode_once(&self, text: &str) -> Result<Vec<f32>, AttemptError> {
        let request = EncodeRequest {
            text,
            max_length: self.preprocessor.max_length(),
        };

        let response = self
            .client
            .post(&self.config.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| AttemptError::Transient(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = format!("Encoder returned {}: {}", status, body);
            return Err(if status.is_server_error() {
                AttemptError::Transient(message)
            } else {
                AttemptError::Fatal(message)
            });
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AttemptError::Fatal(format!("Parse error: {}", e)))?;
        parse_vector(&body).map_err(AttemptError::Fatal)
    }
}

/// Accept only a non-empty array of finite numbers.
fn parse_vector(body: &serde_json::Value) -> Result<Vec<f32>, String> {
    let values = body
        .as_array()
        .ok_or_else(|| "Encoder response is not an array".to_string())?;
    if values.is_empty() {
        return Err("Encoder returned an empty vector".to_string());
    }

    values
        .iter()
        .enumerate()
        .map(|(i, v)| match v.as_f64() {
            Some(x) if x.is_finite() => Ok(x as f32),
            _ => Err(format!("Encoder response element {} is not a number", i)),
        })
        .collect()
}

#[async_trait]
impl EmbeddingProvider for EmbeddingClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.vectorize(text, true).await
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
