//! Per-key mutual exclusion
//!
//! Entries live in a shared `DashMap` and are dropped again once no caller
//! holds or waits on them, so the map only ever contains keys that are in
//! use.

use std::hash::Hash;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// A set of async locks, one per key
///
/// Callers locking the same key are serialized; callers with different keys
/// never wait on each other.
#[derive(Debug)]
pub struct KeyedLocks<K: Eq + Hash> {
    locks: DashMap<K, Arc<Mutex<()>>>,
}

impl<K> KeyedLocks<K>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self {
            locks: DashMap::new(),
        }
    }

    /// Wait for exclusive access to `key`
    ///
    /// Access lasts until the returned guard is dropped.
    pub async fn lock(&self, key: &K) -> KeyedGuard<'_, K> {
        // Declared before the await so a cancelled waiter still prunes
        let entry = KeyEntry {
            locks: self,
            key: key.clone(),
        };
        // Clone the Arc out so the map shard is not held across the await
        let mutex = Arc::clone(self.locks.entry(key.clone()).or_default().value());
        let guard = mutex.lock_owned().await;
        KeyedGuard {
            _guard: guard,
            _entry: entry,
        }
    }

    /// Number of keys currently held or awaited
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

impl<K> Default for KeyedLocks<K>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Exclusive access to one key of a [`KeyedLocks`]
#[must_use = "the key is unlocked as soon as the guard is dropped"]
pub struct KeyedGuard<'a, K>
where
    K: Eq + Hash + Clone,
{
    // Field order matters: the mutex is released before the entry is pruned
    _guard: OwnedMutexGuard<()>,
    _entry: KeyEntry<'a, K>,
}

/// Interest in one key, held while locking or locked
///
/// Dropping it removes the map entry once nobody else references the mutex.
struct KeyEntry<'a, K>
where
    K: Eq + Hash + Clone,
{
    locks: &'a KeyedLocks<K>,
    key: K,
}

impl<K> Drop for KeyEntry<'_, K>
where
    K: Eq + Hash + Clone,
{
    fn drop(&mut self) {
        self.locks
            .locks
            .remove_if(&self.key, |_, mutex| Arc::strong_count(mutex) == 1);
    }
}
