//! In-memory TTL cache.
//!
//! One instance per service, one TTL per instance. Entries live until they
//! expire or the cache is cleared; there is no capacity bound because the key
//! space is the (small, fixed) airport catalog.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// A cached value and the moment it was stored.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    pub value: T,
    pub stored_at: Instant,
}

impl<T> CacheEntry<T> {
    pub fn is_valid(&self, ttl: Duration) -> bool {
        self.stored_at.elapsed() < ttl
    }
}

/// Keyed store with a single expiry window.
///
/// Misses can be coalesced through [`TtlCache::get_or_try_insert_with`], which
/// lets only one caller per key run the fetch while the others wait for it.
#[derive(Debug)]
pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: Mutex<HashMap<K, CacheEntry<V>>>,
    in_flight: Mutex<HashMap<K, Arc<tokio::sync::Mutex<()>>>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the value if present and younger than the TTL.
    pub fn get(&self, key: &K) -> Option<V> {
        self.entries
            .lock()
            .get(key)
            .filter(|entry| entry.is_valid(self.ttl))
            .map(|entry| entry.value.clone())
    }

    /// Store a value stamped with the current time, replacing any previous entry.
    pub fn put(&self, key: K, value: V) {
        self.entries.lock().insert(
            key,
            CacheEntry {
                value,
                stored_at: Instant::now(),
            },
        );
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Return the cached value, or run `fetch` and cache its result.
    ///
    /// Concurrent callers for the same key queue behind a per-key lock and
    /// re-check the cache once they hold it, so a cold key is fetched once.
    /// On error nothing is stored and the previous entry (if any) is kept.
    pub async fn get_or_try_insert_with<F, Fut, E>(&self, key: K, fetch: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(&key) {
            return Ok(value);
        }

        let gate = self
            .in_flight
            .lock()
            .entry(key.clone())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone();
        let _guard = gate.lock().await;

        if let Some(value) = self.get(&key) {
            return Ok(value);
        }

        let value = fetch().await?;
        self.put(key, value.clone());
        Ok(value)
    }
}
