//! Cache store protocol.
//!
//! Mirrors the subset of a Redis-style key/value protocol the engine needs:
//! `SET key value EX ttl`, `GET`, `DEL` and `KEYS pattern` deletion.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::CacheError;

/// Key/value store with per-key TTL and glob-pattern bulk deletion.
///
/// Implementations must be safe to share between concurrent queries. A `get`
/// racing a `set` or `delete` on the same key may observe either value, but
/// never a partially written one.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Store `value` under `key`, replacing any previous entry.
    /// `None` means the entry never expires.
    async fn set(&self, key: &str, value: Bytes, ttl: Option<Duration>) -> Result<(), CacheError>;

    /// Fetch a live entry. Expired entries are reported as absent.
    async fn get(&self, key: &str) -> Result<Option<Bytes>, CacheError>;

    /// Remove a key. Returns whether a live entry was removed.
    async fn delete(&self, key: &str) -> Result<bool, CacheError>;

    /// Remove every key matching a glob pattern. Returns the number removed.
    async fn delete_by_pattern(&self, pattern: &str) -> Result<usize, CacheError>;

    /// Remaining lifetime of a live entry, `None` if absent or without expiry.
    async fn ttl(&self, key: &str) -> Result<Option<Duration>, CacheError>;

    /// Number of live entries.
    async fn len(&self) -> Result<usize, CacheError>;

    async fn exists(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.get(key).await?.is_some())
    }
}

/// Typed JSON helpers over any [`CacheStore`].
#[async_trait]
pub trait CacheStoreExt: CacheStore {
    async fn get_json<T>(&self, key: &str) -> Result<Option<T>, CacheError>
    where
        T: DeserializeOwned + Send,
    {
        match self.get(key).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn set_json<T>(&self, key: &str, value: &T, ttl: Option<Duration>) -> Result<(), CacheError>
    where
        T: Serialize + Sync + ?Sized,
    {
        let bytes = Bytes::from(serde_json::to_vec(value)?);
        self.set(key, bytes, ttl).await
    }
}

impl<S: CacheStore + ?Sized> CacheStoreExt for S {}
