use parking_lot::Mutex;
use std::time::{Duration, Instant};

#[derive(Debug)]
struct StoredEntry<T> {
    value: T,
    computed_at: Instant,
}

/// Single-value cache with a fixed time-to-live.
///
/// Holds at most one value. Expiry is checked on read; [`TimedCache::clear`]
/// drops the value unconditionally. A zero TTL never serves a value.
#[derive(Debug)]
pub struct TimedCache<T> {
    entry: Mutex<Option<StoredEntry<T>>>,
    ttl: Duration,
}

impl<T: Clone> TimedCache<T> {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            entry: Mutex::new(None),
            ttl,
        }
    }

    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the value if present and younger than the TTL.
    pub fn get(&self) -> Option<T> {
        self.get_at(Instant::now())
    }

    /// Same as [`TimedCache::get`], judged at `now`.
    ///
    /// An expired value is dropped.
    #[tracing::instrument(name = "query_cache", level = "debug", skip(self))]
    pub fn get_at(&self, now: Instant) -> Option<T> {
        let mut guard = self.entry.lock();
        match guard.as_ref() {
            Some(entry) if now.saturating_duration_since(entry.computed_at) < self.ttl => {
                tracing::debug!("Value found and still fresh");
                Some(entry.value.clone())
            }
            Some(_) => {
                tracing::debug!("Value found but expired");
                *guard = None;
                None
            }
            None => {
                tracing::debug!("Cache empty");
                None
            }
        }
    }

    /// Stores `value`, replacing any previous one and restarting the TTL.
    pub fn insert(&self, value: T) {
        self.insert_at(value, Instant::now());
    }

    pub fn insert_at(&self, value: T, computed_at: Instant) {
        *self.entry.lock() = Some(StoredEntry { value, computed_at });
    }

    /// Drops the cached value, if any.
    pub fn clear(&self) {
        *self.entry.lock() = None;
    }

    /// Age of the cached value, expired or not
    pub fn age(&self) -> Option<Duration> {
        self.entry
            .lock()
            .as_ref()
            .map(|entry| entry.computed_at.elapsed())
    }
}
