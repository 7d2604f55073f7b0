//! Bounded Keyed Store
//!
//! Insertion-ordered `key → value` container with a fixed capacity and
//! FIFO eviction, the building block of the lifecycle substores.
//!
//! ## Semantics
//!
//! - Keys are opaque strings (item hashes).
//! - Iteration/eviction order is first-insertion order; overwriting an
//!   existing key replaces the value but keeps its position.
//! - When an insert pushes the store past capacity, the oldest entries
//!   are evicted until the store fits.
//!
//! ## Thread Safety
//!
//! Every operation takes `&self` and is individually atomic behind an
//! interior `parking_lot::RwLock`. Composite sequences (check-then-act
//! across stores) are serialized by the named locks in
//! [`crate::locks::NamedLocks`]; this type does not know about them.

use std::collections::{HashMap, VecDeque};

use parking_lot::RwLock;

struct StoreInner<V> {
    data: HashMap<String, V>,
    order: VecDeque<String>,
}

/// Capacity-bounded, insertion-ordered keyed store.
pub struct BoundedStore<V> {
    capacity: usize,
    inner: RwLock<StoreInner<V>>,
}

impl<V: Clone> BoundedStore<V> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            inner: RwLock::new(StoreInner {
                data: HashMap::new(),
                order: VecDeque::new(),
            }),
        }
    }

    /// Insert or replace. A replaced key keeps its insertion position;
    /// a new key goes to the back and may evict the oldest entries.
    pub fn put(&self, key: impl Into<String>, value: V) {
        let key = key.into();
        let mut inner = self.inner.write();
        if inner.data.insert(key.clone(), value).is_none() {
            inner.order.push_back(key);
        }
        Self::evict_over_capacity(&mut inner, self.capacity);
    }

    pub fn lookup(&self, key: &str) -> Option<V> {
        self.inner.read().data.get(key).cloned()
    }

    /// Apply `f` to the stored value, if present, and return the updated
    /// value. `f` is not called when the key is absent.
    pub fn update(&self, key: &str, f: impl FnOnce(V) -> V) -> Option<V> {
        let mut inner = self.inner.write();
        let current = inner.data.get(key)?.clone();
        let updated = f(current);
        inner.data.insert(key.to_string(), updated.clone());
        Some(updated)
    }

    /// Like [`update`](Self::update), but an absent key is seeded with
    /// `empty` before `f` is applied, so the result is always `f` of
    /// something. Runs atomically under one write lock.
    pub fn update_or_insert(&self, key: &str, f: impl FnOnce(V) -> V, empty: V) -> V {
        let mut inner = self.inner.write();
        let current = inner.data.get(key).cloned();
        let updated = f(current.unwrap_or(empty));
        if inner.data.insert(key.to_string(), updated.clone()).is_none() {
            inner.order.push_back(key.to_string());
        }
        Self::evict_over_capacity(&mut inner, self.capacity);
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

    /// The `n` most recently inserted values, newest first.
    pub fn last_n(&self, n: usize) -> Vec<V> {
        let inner = self.inner.read();
        inner
            .order
            .iter()
            .rev()
            .take(n)
            .filter_map(|key| inner.data.get(key).cloned())
            .collect()
    }

    fn evict_over_capacity(inner: &mut StoreInner<V>, capacity: usize) {
        while inner.order.len() > capacity {
            match inner.order.pop_front() {
                Some(oldest) => {
                    inner.data.remove(&oldest);
                }
                None => break,
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// UNIT TESTS
// ════════════════════════════════════════════════════════════════════════════
