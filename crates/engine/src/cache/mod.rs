//! Time-bounded key/value cache with a background sweeper.
//!
//! Modules:
//! - `sweeper`: Background thread that evicts expired entries on a fixed cadence
//!
//! Population is optimistic rather than exclusive: on a miss the producer runs
//! without any map lock held, and the result is stored with a single atomic
//! entry operation. Concurrent misses on the same key may each run their
//! producer, but only the first unexpired entry stored is kept, and every racer
//! receives that canonical value.

mod sweeper;

use std::{
    fmt::{self, Debug},
    hash::Hash,
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicU64, Ordering},
    },
    time::{Duration, Instant},
};

use dashmap::{DashMap, mapref::entry::Entry};
use tracing::debug;

use crate::config::CacheConfig;
use crate::error::HydrateError;
use sweeper::Sweeper;

#[derive(Debug, Clone)]
struct CachedEntry<V> {
    value: V,
    expires_at: Instant,
}

impl<V> CachedEntry<V> {
    fn is_expired_at(&self, now: Instant) -> bool {
        self.expires_at <= now
    }
}

/// Snapshot of cache counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from an unexpired entry.
    pub hits: u64,
    /// Lookups that had to run the producer.
    pub misses: u64,
    /// Entries stored after a successful production.
    pub insertions: u64,
    /// Entries removed by a sweep.
    pub evictions: u64,
}

impl CacheStats {
    /// Calculate the hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 { 0.0 } else { self.hits as f64 / total as f64 }
    }
}

/// State shared between the cache handle and its sweeper thread.
pub(crate) struct CacheStore<K, V> {
    entries: DashMap<K, CachedEntry<V>>,
    hits: AtomicU64,
    misses: AtomicU64,
    insertions: AtomicU64,
    evictions: AtomicU64,
}

impl<K, V> CacheStore<K, V>
where
    K: Eq + Hash + Clone + Debug,
    V: Clone,
{
    fn new() -> Self {
        Self {
            entries: DashMap::new(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            insertions: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    fn lookup_fresh(&self, key: &K, now: Instant) -> Option<V> {
        let entry = self.entries.get(key)?;
        if entry.is_expired_at(now) {
            None
        } else {
            Some(entry.value.clone())
        }
    }

    /// Stores `value` unless an unexpired entry already exists, returning the canonical value.
    fn store(&self, key: K, value: V, ttl: Duration) -> V {
        let now = Instant::now();
        let fresh = CachedEntry {
            value: value.clone(),
            expires_at: now + ttl,
        };
        match self.entries.entry(key) {
            Entry::Occupied(mut occupied) => {
                if !occupied.get().is_expired_at(now) {
                    debug!(key = ?occupied.key(), "concurrent population lost the race; keeping stored entry");
                    return occupied.get().value.clone();
                }
                occupied.insert(fresh);
            }
            Entry::Vacant(vacant) => {
                vacant.insert(fresh);
            }
        }
        self.insertions.fetch_add(1, Ordering::Relaxed);
        value
    }

    /// Removes every entry whose expiry is at or before now.
    ///
    /// Each removal re-checks expiry under the shard lock, so an entry
    /// repopulated between the scan and the removal survives.
    pub(crate) fn sweep_expired(&self) -> usize {
        let now = Instant::now();
        let expired: Vec<K> = self
            .entries
            .iter()
            .filter(|entry| entry.value().is_expired_at(now))
            .map(|entry| entry.key().clone())
            .collect();

        let mut removed = 0;
        for key in expired {
            if self.entries.remove_if(&key, |_, entry| entry.is_expired_at(now)).is_some() {
                debug!(key = ?key, "evicted expired cache entry");
                removed += 1;
            }
        }
        self.evictions.fetch_add(removed as u64, Ordering::Relaxed);
        removed
    }
}

/// Concurrent key/value cache where each entry expires a fixed time after it was stored.
///
/// A background thread started by [`Cache::new`] sweeps expired entries at
/// the configured interval until [`Cache::shutdown`] is called or the cache is
/// dropped.
///
/// # Example
///
/// ```rust
/// use hydrate_engine::{Cache, CacheConfig};
///
/// let cache: Cache<&str, u32> = Cache::new(&CacheConfig::default())?;
/// let first = cache.get_or_populate("answer", || Ok::<_, std::convert::Infallible>(42))?;
/// let second = cache.get_or_populate("answer", || Ok::<_, std::convert::Infallible>(7))?;
/// assert_eq!((first, second), (42, 42));
/// cache.shutdown();
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct Cache<K, V>
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    store: Arc<CacheStore<K, V>>,
    ttl: Duration,
    sweep_interval: Duration,
    sweeper: Mutex<Option<Sweeper>>,
}

impl<K, V> fmt::Debug for Cache<K, V>
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache")
            .field("ttl", &self.ttl)
            .field("sweep_interval", &self.sweep_interval)
            .field("entries", &self.store.entries.len())
            .finish()
    }
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Create a cache and start its sweeper thread.
    pub fn new(config: &CacheConfig) -> Result<Self, HydrateError> {
        config.validate()?;
        let store = Arc::new(CacheStore::new());
        let sweeper = Sweeper::spawn(Arc::downgrade(&store), config.sweep_interval()).map_err(HydrateError::SweeperSpawn)?;
        Ok(Self {
            store,
            ttl: config.ttl(),
            sweep_interval: config.sweep_interval(),
            sweeper: Mutex::new(Some(sweeper)),
        })
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn sweep_interval(&self) -> Duration {
        self.sweep_interval
    }

    /// Return the unexpired value for `key`, or produce and store one.
    ///
    /// The producer runs only on a miss (absent or expired entry) and is not
    /// serialized against other callers. A failing producer leaves the key
    /// unpopulated, so the next call retries.
    pub fn get_or_populate<E, F>(&self, key: K, produce: F) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        if let Some(value) = self.store.lookup_fresh(&key, Instant::now()) {
            self.store.hits.fetch_add(1, Ordering::Relaxed);
            debug!(key = ?key, cache_hit = true, "cache lookup");
            return Ok(value);
        }

        self.store.misses.fetch_add(1, Ordering::Relaxed);
        debug!(key = ?key, cache_hit = false, "cache lookup");
        let value = produce()?;
        Ok(self.store.store(key, value, self.ttl))
    }

    /// Unexpired value for `key`, if any. Never runs a producer.
    pub fn get(&self, key: &K) -> Option<V> {
        self.store.lookup_fresh(key, Instant::now())
    }

    /// Remove `key` regardless of expiry. Returns whether an entry was present.
    pub fn invalidate(&self, key: &K) -> bool {
        self.store.entries.remove(key).is_some()
    }

    /// Number of stored entries, including expired entries not yet swept.
    pub fn len(&self) -> usize {
        self.store.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.entries.is_empty()
    }

    /// Run one sweep on the calling thread and return the number of evicted entries.
    pub fn sweep_expired(&self) -> usize {
        self.store.sweep_expired()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.store.hits.load(Ordering::Relaxed),
            misses: self.store.misses.load(Ordering::Relaxed),
            insertions: self.store.insertions.load(Ordering::Relaxed),
            evictions: self.store.evictions.load(Ordering::Relaxed),
        }
    }

    /// Whether the background sweeper is still running.
    pub fn is_sweeping(&self) -> bool {
        self.sweeper.lock().unwrap_or_else(PoisonError::into_inner).is_some()
    }

    /// Stop and join the background sweeper. Calling this more than once is a no-op.
    ///
    /// The cache stays usable afterwards; expired entries are then only
    /// replaced on access or removed by [`Cache::sweep_expired`].
    pub fn shutdown(&self) {
        let sweeper = self.sweeper.lock().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(sweeper) = sweeper {
            sweeper.stop();
        }
    }
}

impl<K, V> Drop for Cache<K, V>
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn drop(&mut self) {
        self.shutdown();
    }
}
