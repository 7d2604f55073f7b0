//! Pending MemPool
//!
//! Unbounded insertion-ordered pool holding items that have been
//! submitted but not yet pulled into a consensus round. Unlike the
//! bounded substores, nothing is ever evicted; items leave only by being
//! pulled, removed, or accepted directly.
//!
//! The pool is internally concurrent: every operation is atomic behind
//! its own lock and callers never wrap it in a named lock.

use std::collections::{HashMap, VecDeque};

use parking_lot::RwLock;

struct PoolInner<V> {
    data: HashMap<String, V>,
    order: VecDeque<String>,
}

/// Insertion-ordered pool with batched FIFO draining.
pub struct PendingPool<V> {
    inner: RwLock<PoolInner<V>>,
}

impl<V: Clone> PendingPool<V> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(PoolInner {
                data: HashMap::new(),
                order: VecDeque::new(),
            }),
        }
    }

    /// Insert or replace. A replaced key keeps its queue position.
    pub fn put(&self, key: impl Into<String>, value: V) {
        let key = key.into();
        let mut inner = self.inner.write();
        if inner.data.insert(key.clone(), value).is_none() {
            inner.order.push_back(key);
        }
    }

    /// Atomically remove and return up to `count` oldest entries in
    /// insertion order. Returns `None` only when the pool is empty;
    /// otherwise the batch may be shorter than requested.
    pub fn pull(&self, count: usize) -> Option<Vec<V>> {
        let mut inner = self.inner.write();
        if inner.order.is_empty() {
            return None;
        }
        let take = count.min(inner.order.len());
        let mut batch = Vec::with_capacity(take);
        for _ in 0..take {
            if let Some(key) = inner.order.pop_front() {
                if let Some(value) = inner.data.remove(&key) {
                    batch.push(value);
                }
            }
        }
        Some(batch)
    }

    pub fn lookup(&self, key: &str) -> Option<V> {
        self.inner.read().data.get(key).cloned()
    }

    /// Apply `f` to the stored value, if present; returns the updated
    /// value. The queue position is unchanged.
    pub fn update(&self, key: &str, f: impl FnOnce(V) -> V) -> Option<V> {
        let mut inner = self.inner.write();
        let current = inner.data.get(key)?.clone();
        let updated = f(current);
        inner.data.insert(key.to_string(), updated.clone());
        Some(updated)
    }

    /// Like [`update`](Self::update) but seeds an absent key with
    /// `empty` (enqueued at the back) before applying `f`.
    pub fn update_or_insert(&self, key: &str, f: impl FnOnce(V) -> V, empty: V) -> V {
        let mut inner = self.inner.write();
        let current = inner.data.get(key).cloned();
        let updated = f(current.unwrap_or(empty));
        if inner.data.insert(key.to_string(), updated.clone()).is_none() {
            inner.order.push_back(key.to_string());
        }
        updated
    }

    pub fn remove(&self, key: &str) -> Option<V> {
        let mut inner = self.inner.write();
        let removed = inner.data.remove(key);
        if removed.is_some() {
            inner.order.retain(|k| k != key);
        }
        removed
    }

    pub fn contains(&self, key: &str) -> bool {
        self.inner.read().data.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.inner.read().data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().data.is_empty()
    }
}

impl<V: Clone> Default for PendingPool<V> {
    fn default() -> Self {
        Self::new()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// UNIT TESTS
// ════════════════════════════════════════════════════════════════════════════
