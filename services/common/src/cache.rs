//! Time-bounded containers shared by the stateful engines
//!
//! Every piece of cross-request state in the analytics pipeline is either a
//! rolling time window or a TTL cache. Both take the observation time as an
//! argument so callers stay deterministic under test.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::collections::VecDeque;
use std::hash::Hash;

/// Rolling time window storing (timestamp, sample) pairs
///
/// Samples older than the window duration are pruned on every push, so the
/// window never grows beyond the configured horizon plus one sample burst.
#[derive(Debug, Clone)]
pub struct TimeWindow<T> {
    window: Duration,
    samples: VecDeque<(DateTime<Utc>, T)>,
}

impl<T> TimeWindow<T> {
    /// Create a window that retains samples for `window` of wall-clock time
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            samples: VecDeque::new(),
        }
    }

    /// Append a sample and evict everything older than the window
    pub fn push(&mut self, at: DateTime<Utc>, sample: T) {
        self.samples.push_back((at, sample));
        self.prune(at);
    }

    /// Drop samples older than `now - window`
    pub fn prune(&mut self, now: DateTime<Utc>) {
        let cutoff = now - self.window;
        while let Some((ts, _)) = self.samples.front() {
            if *ts < cutoff {
                self.samples.pop_front();
            } else {
                break;
            }
        }
    }

    /// Iterate over retained samples, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &(DateTime<Utc>, T)> {
        self.samples.iter()
    }

    /// Most recent sample, if any
    #[must_use]
    pub fn latest(&self) -> Option<&(DateTime<Utc>, T)> {
        self.samples.back()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

/// Concurrent TTL cache keyed by symbol
///
/// Entries are valid while `now - inserted < ttl`; an entry aged exactly to
/// the TTL is already expired. Expired entries are dropped lazily on `get`
/// and eagerly via [`ExpiringCache::purge_expired`].
#[derive(Debug)]
pub struct ExpiringCache<K: Eq + Hash, V> {
    ttl: Duration,
    entries: DashMap<K, (DateTime<Utc>, V)>,
}

impl<K: Eq + Hash, V: Clone> ExpiringCache<K, V> {
    /// Create a cache whose entries live for `ttl`
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: DashMap::new(),
        }
    }

    /// Insert or replace an entry stamped at `now`
    pub fn insert(&self, key: K, value: V, now: DateTime<Utc>) {
        self.entries.insert(key, (now, value));
    }

    /// Fetch a live entry, dropping it if it has expired
    pub fn get(&self, key: &K, now: DateTime<Utc>) -> Option<V> {
        let expired = match self.entries.get(key) {
            Some(entry) => {
                let (inserted, value) = entry.value();
                if now - *inserted < self.ttl {
                    return Some(value.clone());
                }
                true
            }
            None => false,
        };
        if expired {
            self.entries.remove(key);
        }
        None
    }

    /// Evict every expired entry
    pub fn purge_expired(&self, now: DateTime<Utc>) {
        self.entries.retain(|_, entry| now - entry.0 < self.ttl);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
