//! Capacity-bounded, time-expiring LRU store.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::observability::metrics;

struct Slot<V> {
    value: V,
    inserted: Instant,
    /// Recency stamp; larger means more recently used.
    touched: u64,
}

struct Inner<K, V> {
    slots: HashMap<K, Slot<V>>,
    clock: u64,
}

impl<K, V> Inner<K, V> {
    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }
}

/// Key-value store where every entry expires `ttl` after insertion and the
/// least recently used entry is evicted once `capacity` is exceeded.
///
/// Reads through [`ExpiringLru::get`] count as uses. Expired entries read as
/// absent and are dropped on access or by [`ExpiringLru::purge_expired`].
pub struct ExpiringLru<K, V> {
    inner: Mutex<Inner<K, V>>,
    capacity: usize,
    ttl: Duration,
}

impl<K, V> ExpiringLru<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            inner: Mutex::new(Inner {
                slots: HashMap::with_capacity(capacity.min(1024)),
                clock: 0,
            }),
            capacity: capacity.max(1),
            ttl,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner<K, V>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn is_expired(&self, slot: &Slot<V>, now: Instant) -> bool {
        now.duration_since(slot.inserted) >= self.ttl
    }

    /// Look up `key`, marking it as most recently used.
    pub fn get(&self, key: &K) -> Option<V> {
        let now = Instant::now();
        let mut inner = self.lock();
        let stamp = inner.tick();

        let expired = match inner.slots.get_mut(key) {
            None => return None,
            Some(slot) if !self.is_expired(slot, now) => {
                slot.touched = stamp;
                return Some(slot.value.clone());
            }
            Some(_) => true,
        };
        if expired {
            inner.slots.remove(key);
        }
        None
    }

    /// Look up `key` without changing its recency.
    pub fn peek(&self, key: &K) -> Option<V> {
        let now = Instant::now();
        let inner = self.lock();
        inner
            .slots
            .get(key)
            .filter(|slot| !self.is_expired(slot, now))
            .map(|slot| slot.value.clone())
    }

    /// Insert or replace `key`, restarting its expiry clock and recency.
    pub fn set(&self, key: K, value: V) {
        let now = Instant::now();
        let mut inner = self.lock();
        let touched = inner.tick();
        inner.slots.insert(
            key,
            Slot {
                value,
                inserted: now,
                touched,
            },
        );

        if inner.slots.len() > self.capacity {
            inner.slots.retain(|_, slot| now.duration_since(slot.inserted) < self.ttl);
        }
        while inner.slots.len() > self.capacity {
            let oldest = inner
                .slots
                .iter()
                .min_by_key(|(_, slot)| slot.touched)
                .map(|(key, _)| key.clone());
            match oldest {
                Some(key) => {
                    inner.slots.remove(&key);
                    metrics::record_cache_eviction();
                }
                None => break,
            }
        }
    }

    /// Drop every expired entry, returning how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut inner = self.lock();
        let before = inner.slots.len();
        inner.slots.retain(|_, slot| now.duration_since(slot.inserted) < self.ttl);
        before - inner.slots.len()
    }

    /// Number of stored entries, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.lock().slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}
