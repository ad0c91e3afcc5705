//! Caller-owned TTL cache for loaded batches.
//!
//! Nothing in the pipeline reads or writes a [`BatchCache`] implicitly; the
//! caller decides its lifetime and passes it to
//! [`crate::pipeline::load_batch_cached`].

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::CanonicalRecord;

/// Default time-to-live for cached batches.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

#[derive(Debug, Clone)]
struct CachedBatch {
    records: Arc<Vec<CanonicalRecord>>,
    expires_at: Instant,
}

impl CachedBatch {
    /// Live strictly before `expires_at`.
    fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

#[derive(Debug)]
struct BatchMap {
    entries: HashMap<String, CachedBatch>,
    default_ttl: Duration,
}

impl BatchMap {
    fn lookup(&self, key: &str) -> Option<Arc<Vec<CanonicalRecord>>> {
        self.entries
            .get(key)
            .filter(|entry| entry.is_live(Instant::now()))
            .map(|entry| Arc::clone(&entry.records))
    }
}

/// Thread-safe TTL map of cache key to normalized batch.
///
/// Clones share the same storage.
#[derive(Debug, Clone)]
pub struct BatchCache {
    inner: Arc<tokio::sync::RwLock<BatchMap>>,
}

impl BatchCache {
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            inner: Arc::new(tokio::sync::RwLock::new(BatchMap {
                entries: HashMap::new(),
                default_ttl,
            })),
        }
    }

    /// A cache that never stores anything.
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    /// Unexpired batch stored under `key`.
    pub async fn get(&self, key: &str) -> Option<Arc<Vec<CanonicalRecord>>> {
        self.inner.read().await.lookup(key)
    }

    /// Store `records` under `key`; a disabled cache ignores the call.
    pub async fn put(
        &self,
        key: impl Into<String>,
        records: Vec<CanonicalRecord>,
        ttl_override: Option<Duration>,
    ) {
        let mut map = self.inner.write().await;
        if map.default_ttl.is_zero() {
            return;
        }

        let ttl = ttl_override.unwrap_or(map.default_ttl);
        map.entries.insert(
            key.into(),
            CachedBatch {
                records: Arc::new(records),
                expires_at: Instant::now() + ttl,
            },
        );
    }

    pub async fn clear_expired(&self) {
        let now = Instant::now();
        self.inner
            .write()
            .await
            .entries
            .retain(|_, entry| entry.is_live(now));
    }

    pub async fn clear(&self) {
        self.inner.write().await.entries.clear();
    }

    /// Entry count, expired entries included.
    pub async fn len(&self) -> usize {
        self.inner.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn is_disabled(&self) -> bool {
        self.inner.read().await.default_ttl.is_zero()
    }
}

impl Default for BatchCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_TTL)
    }
}
