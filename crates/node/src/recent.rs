//! Recent Snapshot Holder
//!
//! Shared, atomically swappable view of the node's recent snapshot
//! history, newest first. The broadcast loop prepends to it, the
//! redownload paths overwrite it wholesale with the cluster majority,
//! and the observability endpoints read it.
//!
//! `modify` runs a pure function over the current list under the write
//! lock and installs its result, returning a caller-chosen value — the
//! compare-and-swap shape the broadcast path needs to both update the
//! list and keep the updated copy for the fan-out that follows.

use concord_common::RecentSnapshot;
use parking_lot::RwLock;

/// Atomic holder for the newest-first recent snapshot list.
pub struct RecentSnapshots {
    inner: RwLock<Vec<RecentSnapshot>>,
}

impl RecentSnapshots {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Vec::new()),
        }
    }

    pub fn get(&self) -> Vec<RecentSnapshot> {
        self.inner.read().clone()
    }

    pub fn set(&self, snapshots: Vec<RecentSnapshot>) {
        *self.inner.write() = snapshots;
    }

    /// Replace the list with `f(current).0` and return `f(current).1`,
    /// all under one write lock.
    pub fn modify<R>(&self, f: impl FnOnce(&[RecentSnapshot]) -> (Vec<RecentSnapshot>, R)) -> R {
        let mut inner = self.inner.write();
        let (next, returned) = f(&inner);
        *inner = next;
        returned
    }

    /// Prepend one snapshot and truncate to `limit`, returning the new
    /// list.
    pub fn prepend_truncated(&self, snapshot: RecentSnapshot, limit: usize) -> Vec<RecentSnapshot> {
        self.modify(|current| {
            let mut next = Vec::with_capacity(current.len() + 1);
            next.push(snapshot);
            next.extend(current.iter().cloned());
            next.truncate(limit);
            (next.clone(), next)
        })
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

impl Default for RecentSnapshots {
    fn default() -> Self {
        Self::new()
    }
}
