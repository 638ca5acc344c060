//! Capacity-bounded TTL cache
//!
//! This module provides:
//! - Per-entry expiry checked on every read
//! - Oldest-inserted eviction once the configured capacity is reached
//! - An optional background sweep that drops expired entries nobody reads
//!
//! Time is read from `tokio::time::Instant`, so tests can drive expiry with
//! a paused clock.

use indexmap::IndexMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::debug;

/// Default maximum number of entries
pub const DEFAULT_MAX_ENTRIES: usize = 100;

/// Default interval between background sweeps (60 seconds)
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Expiry used when `now + ttl` does not fit in an `Instant` (about 30 years)
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// Absolute instant `ttl` from now, saturating instead of overflowing
fn deadline_after(ttl: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(ttl).unwrap_or_else(|| now + FAR_FUTURE)
}

/// A cached value with its absolute expiry instant
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    pub value: T,
    pub expires_at: Instant,
}

impl<T> CacheEntry<T> {
    fn is_expired(&self, now: Instant) -> bool {
        now > self.expires_at
    }
}

/// Generic TTL cache keyed by opaque strings
///
/// Eviction is by insertion order: re-setting an existing key replaces its
/// value and expiry but keeps its eviction position.
#[derive(Debug)]
pub struct TtlCache<T> {
    entries: Mutex<IndexMap<String, CacheEntry<T>>>,
    max_entries: usize,
    sweeper: Mutex<Option<JoinHandle<()>>>,
}

impl<T: Clone> TtlCache<T> {
    /// Creates a cache without a background sweep
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: Mutex::new(IndexMap::new()),
            max_entries: max_entries.max(1),
            sweeper: Mutex::new(None),
        }
    }

    /// Returns the value for `key` unless it is missing or expired
    ///
    /// An expired entry is removed as a side effect.
    pub fn get(&self, key: &str) -> Option<T> {
        let mut entries = self.lock_entries();
        let now = Instant::now();

        match entries.get(key) {
            Some(entry) if entry.is_expired(now) => {
                entries.shift_remove(key);
                debug!(key, "cache entry expired");
                None
            }
            Some(entry) => Some(entry.value.clone()),
            None => None,
        }
    }

    /// Stores `value` under `key` for `ttl`
    pub fn set(&self, key: impl Into<String>, value: T, ttl: Duration) {
        let key = key.into();
        let mut entries = self.lock_entries();

        if !entries.contains_key(&key) && entries.len() >= self.max_entries {
            if let Some((evicted, _)) = entries.shift_remove_index(0) {
                debug!(key = %evicted, "evicted oldest cache entry");
            }
        }

        let entry = CacheEntry {
            value,
            expires_at: deadline_after(ttl),
        };
        entries.insert(key, entry);
    }

    /// Removes a single entry, returning its value if present
    pub fn remove(&self, key: &str) -> Option<T> {
        self.lock_entries().shift_remove(key).map(|e| e.value)
    }

    /// Returns true if a non-expired entry exists for `key`
    pub fn contains_key(&self, key: &str) -> bool {
        let now = Instant::now();
        self.lock_entries()
            .get(key)
            .is_some_and(|e| !e.is_expired(now))
    }

    /// Removes every expired entry, returning how many were dropped
    pub fn purge_expired(&self) -> usize {
        let mut entries = self.lock_entries();
        let now = Instant::now();
        let before = entries.len();
        entries.retain(|_, e| !e.is_expired(now));
        before - entries.len()
    }

    /// Empties the cache immediately
    pub fn clear(&self) {
        self.lock_entries().clear();
    }

    /// Number of stored entries, expired or not
    pub fn len(&self) -> usize {
        self.lock_entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock_entries().is_empty()
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Stops the background sweep and clears the cache
    ///
    /// Safe to call any number of times.
    pub fn dispose(&self) {
        let handle = self
            .sweeper
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            handle.abort();
            debug!("cache sweep stopped");
        }
        self.clear();
    }

    fn lock_entries(&self) -> MutexGuard<'_, IndexMap<String, CacheEntry<T>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: Clone + Send + 'static> TtlCache<T> {
    /// Creates a shared cache with a background sweep every `interval`
    ///
    /// Must be called from within a tokio runtime. The sweep task holds only
    /// a weak reference and ends once the cache is dropped or disposed.
    pub fn with_sweep(max_entries: usize, interval: Duration) -> Arc<Self> {
        let cache = Arc::new(Self::new(max_entries));
        let handle = tokio::spawn(sweep_loop(Arc::downgrade(&cache), interval));
        *cache
            .sweeper
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(handle);
        cache
    }
}

impl<T: Clone> Default for TtlCache<T> {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ENTRIES)
    }
}

impl<T> Drop for TtlCache<T> {
    fn drop(&mut self) {
        let handle = self
            .sweeper
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            handle.abort();
        }
    }
}

async fn sweep_loop<T: Clone + Send + 'static>(cache: Weak<TtlCache<T>>, period: Duration) {
    let mut ticker = tokio::time::interval_at(deadline_after(period), period);
    loop {
        ticker.tick().await;
        let Some(cache) = cache.upgrade() else {
            break;
        };
        let removed = cache.purge_expired();
        if removed > 0 {
            debug!(removed, remaining = cache.len(), "cache sweep");
        }
    }
}
