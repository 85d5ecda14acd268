//! In-memory cache store.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use hybridsearch_protocols::{CacheError, CacheStore};
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Bytes,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|at| now < at)
    }
}

/// Concurrent in-memory [`CacheStore`].
///
/// Expired entries are dropped lazily on access, by
/// [`purge_expired`](Self::purge_expired), and periodically once
/// [`start_sweeper`](Self::start_sweeper) has been called. Values are
/// immutable `Bytes`, so a reader always sees a whole entry.
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    entries: DashMap<String, CacheEntry>,
    sweeper: Mutex<Option<(CancellationToken, JoinHandle<()>)>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every expired entry. Returns the number dropped.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut purged = 0;
        self.entries.retain(|_, entry| {
            let live = entry.is_live(now);
            if !live {
                purged += 1;
            }
            live
        });
        if purged > 0 {
            debug!(purged, "Purged expired cache entries");
        }
        purged
    }

    /// Number of stored entries, including expired ones not yet reclaimed.
    pub fn stored_len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_sweeping(&self) -> bool {
        self.sweeper.lock().is_some()
    }

    /// Spawn a task that purges expired entries every `period`. The task
    /// holds a weak reference and exits once the store is dropped.
    pub fn start_sweeper(self: &Arc<Self>, period: Duration) {
        if period.is_zero() {
            warn!("Cache sweep interval is zero, sweeper not started");
            return;
        }
        let mut sweeper = self.sweeper.lock();
        if sweeper.is_some() {
            warn!("Cache sweeper already running");
            return;
        }

        let token = CancellationToken::new();
        let cancel = token.clone();
        let store = Arc::downgrade(self);

        let handle = tokio::spawn(async move {
            info!("Starting cache sweeper (interval: {:?})", period);
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        let Some(store) = store.upgrade() else { break };
                        store.purge_expired();
                    }
                }
            }
            debug!("Cache sweeper stopped");
        });

        *sweeper = Some((token, handle));
    }

    /// Cancel the sweeper and wait for it to exit.
    pub async fn stop_sweeper(&self) {
        let running = self.sweeper.lock().take();
        if let Some((token, handle)) = running {
            token.cancel();
            if let Err(e) = handle.await {
                error!("Cache sweeper terminated abnormally: {}", e);
            }
        }
    }
}

impl Drop for MemoryCacheStore {
    fn drop(&mut self) {
        if let Some((token, _)) = self.sweeper.get_mut().take() {
            token.cancel();
        }
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn set(&self, key: &str, value: Bytes, ttl: Option<Duration>) -> Result<(), CacheError> {
        let expires_at = ttl.map(|ttl| Instant::now() + ttl);
        self.entries
            .insert(key.to_string(), CacheEntry { value, expires_at });
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Bytes>, CacheError> {
        let now = Instant::now();
        let expired = match self.entries.get(key) {
            Some(entry) if entry.is_live(now) => return Ok(Some(entry.value.clone())),
            Some(_) => true,
            None => false,
        };
        if expired {
            self.entries.remove_if(key, |_, entry| !entry.is_live(now));
        }
        Ok(None)
    }

    async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        let now = Instant::now();
        Ok(self
            .entries
            .remove(key)
            .is_some_and(|(_, entry)| entry.is_live(now)))
    }

    async fn delete_by_pattern(&self, pattern: &str) -> Result<usize, CacheError> {
        let pattern =
            glob::Pattern::new(pattern).map_err(|e| CacheError::InvalidPattern(e.to_string()))?;
        let now = Instant::now();
        let mut removed = 0;
        self.entries.retain(|key, entry| {
            if !pattern.matches(key) {
                return true;
            }
            if entry.is_live(now) {
                removed += 1;
            }
            false
        });
        debug!(pattern = %pattern, removed, "Deleted cache entries by pattern");
        Ok(removed)
    }

    async fn ttl(&self, key: &str) -> Result<Option<Duration>, CacheError> {
        let now = Instant::now();
        Ok(self
            .entries
            .get(key)
            .filter(|entry| entry.is_live(now))
            .and_then(|entry| entry.expires_at)
            .map(|at| at.saturating_duration_since(now)))
    }

    async fn len(&self) -> Result<usize, CacheError> {
        let now = Instant::now();
        Ok(self.entries.iter().filter(|e| e.is_live(now)).count())
    }
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
