use chrono::{DateTime, Utc};
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::clock::{Clock, SystemClock, add_duration};
use crate::translation::TranslatedText;

/// Default number of entries kept in memory.
pub const DEFAULT_CAPACITY: usize = 500;

/// Default time-to-live for a cached translation.
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// How often `put` sweeps out expired entries.
const SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub key: String,
    pub value: TranslatedText,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub expired: u64,
    pub evicted: u64,
}

struct Inner {
    entries: LruCache<String, CacheEntry>,
    stats: CacheStats,
    last_sweep: DateTime<Utc>,
}

impl Inner {
    fn sweep(&mut self, now: DateTime<Utc>) -> usize {
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            self.entries.pop(key);
        }

        self.stats.expired += expired.len() as u64;
        self.last_sweep = now;
        expired.len()
    }
}

/// Bounded LRU cache whose entries expire after a TTL.
///
/// Expired entries are never returned. They are dropped when looked up,
/// swept periodically from `put`, and always removed before a live entry
/// is evicted for capacity.
pub struct TranslationCache {
    inner: Mutex<Inner>,
    clock: Arc<dyn Clock>,
    capacity: NonZeroUsize,
}

impl TranslationCache {
    pub fn new(capacity: usize) -> Self {
        Self::with_clock(capacity, Arc::new(SystemClock))
    }

    pub fn with_clock(capacity: usize, clock: Arc<dyn Clock>) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        let now = clock.now();
        Self {
            inner: Mutex::new(Inner {
                entries: LruCache::new(capacity),
                stats: CacheStats::default(),
                last_sweep: now,
            }),
            clock,
            capacity,
        }
    }

    pub fn get(&self, key: &str) -> Option<CacheEntry> {
        let now = self.clock.now();
        let mut inner = self.inner.lock();

        let expired = match inner.entries.peek(key) {
            None => {
                inner.stats.misses += 1;
                return None;
            }
            Some(entry) => entry.is_expired_at(now),
        };

        if expired {
            inner.entries.pop(key);
            inner.stats.expired += 1;
            inner.stats.misses += 1;
            debug!(key, "Cache entry expired");
            return None;
        }

        inner.stats.hits += 1;
        inner.entries.get(key).cloned()
    }

    /// Stores `value` under `key`. A zero TTL stores nothing.
    pub fn put(&self, key: String, value: TranslatedText, ttl: Duration) {
        if ttl.is_zero() {
            return;
        }

        let now = self.clock.now();
        let mut inner = self.inner.lock();

        if add_duration(inner.last_sweep, SWEEP_INTERVAL) <= now {
            let swept = inner.sweep(now);
            if swept > 0 {
                debug!(swept, "Swept expired cache entries");
            }
        }

        let is_full = inner.entries.len() >= self.capacity.get();
        if is_full && !inner.entries.contains(&key) {
            inner.sweep(now);
            if inner.entries.len() >= self.capacity.get()
                && let Some((evicted, _)) = inner.entries.pop_lru()
            {
                inner.stats.evicted += 1;
                debug!(key = %evicted, "Evicted least recently used cache entry");
            }
        }

        let entry = CacheEntry {
            key: key.clone(),
            value,
            created_at: now,
            expires_at: add_duration(now, ttl),
        };
        inner.entries.put(key, entry);
    }

    /// Removes every expired entry and returns how many were dropped.
    pub fn evict(&self) -> usize {
        let now = self.clock.now();
        self.inner.lock().sweep(now)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        self.inner.lock().stats
    }

    pub fn clear(&self) {
        self.inner.lock().entries.clear();
    }
}

impl Default for TranslationCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
