//! Consensus Lifecycle Store
//!
//! Tracks consensus items (checkpoints / transactions) through a
//! four-state machine backed by four keyed substores plus a merkle pool,
//! with every mutation of a bounded substore serialized by its named
//! lock.
//!
//! ## State Machine (per item hash)
//!
//! ```text
//!       put(Pending)            pull_for_consensus
//! (∅) ─────────────▶ Pending ─────────────────────▶ InConsensus
//!                      │                                │
//!                      │ accept                 accept  │
//!                      ▼                                ▼
//!                   Accepted ◀───── accept ───── Accepted
//!                      ▲
//!       put(Unknown)   │ accept      clear_in_consensus
//!      (∅) ─────▶ Unknown ◀───────────────────────── InConsensus
//!                      │
//!                      │            return_to_pending
//!                   (stays)     InConsensus ─────────▶ Pending
//! ```
//!
//! `Accepted` is terminal: still queryable, never transitioned further.
//!
//! ## Invariants
//!
//! | Invariant | Meaning |
//! |-----------|---------|
//! | Disjointness | After any completed transition a hash lives in at most one of Pending / InConsensus / Accepted, and never in both Unknown and InConsensus |
//! | Bounded history | InConsensus / Accepted / Unknown each hold at most `capacity` entries, oldest evicted first |
//! | Accept finality | Accepting removes the hash from InConsensus and Unknown within the same transition |
//!
//! ## Locking
//!
//! The pending pool is internally concurrent and never wrapped in a
//! named lock. Every write to `in_consensus`, `accepted`, `unknown` or
//! the merkle pool goes through the matching gate in
//! [`NamedLocks`](crate::locks::NamedLocks). Reads (`lookup`,
//! `contains`, counts) are lock-free against the named gates; each
//! substore hands back an internally consistent snapshot. No operation
//! holds two named locks at once.

use std::collections::HashMap;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::locks::{
    LockError, NamedLocks, ACCEPTED_UPDATE, IN_CONSENSUS_UPDATE, MERKLE_POOL_UPDATE,
    UNKNOWN_UPDATE,
};
use crate::mempool::PendingPool;
use crate::store::BoundedStore;

/// An item the lifecycle store can track: opaque except for a stable
/// hash identifier. Equality and ordering of items are by hash.
pub trait ConsensusObject: Clone + Send + Sync + 'static {
    fn hash(&self) -> String;
}

/// Where an item currently lives in the lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConsensusStatus {
    /// Submitted, waiting to be pulled into a consensus round.
    Pending,
    /// Part of an active consensus round.
    InConsensus,
    /// Finalized; terminal.
    Accepted,
    /// Seen but not resolvable right now (e.g. a stalled round).
    Unknown,
}

/// Errors raised by lifecycle operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LifecycleError {
    /// The given status is not valid for this operation — e.g.
    /// `InConsensus` items are created only by `pull_for_consensus`,
    /// never by `put`.
    #[error("status {0:?} is not valid for this operation")]
    UnknownStatus(ConsensusStatus),

    #[error(transparent)]
    Lock(#[from] LockError),
}

/// Four-substore lifecycle store with merkle-root lookup.
pub struct LifecycleStore<A: ConsensusObject> {
    pending: PendingPool<A>,
    in_consensus: BoundedStore<A>,
    accepted: BoundedStore<A>,
    unknown: BoundedStore<A>,
    merkle_pool: RwLock<HashMap<String, Vec<String>>>,
    locks: NamedLocks,
}

impl<A: ConsensusObject> LifecycleStore<A> {
    /// Build a store whose bounded substores each hold `capacity` items.
    pub fn new(capacity: usize) -> Self {
        Self {
            pending: PendingPool::new(),
            in_consensus: BoundedStore::new(capacity),
            accepted: BoundedStore::new(capacity),
            unknown: BoundedStore::new(capacity),
            merkle_pool: RwLock::new(HashMap::new()),
            locks: NamedLocks::consensus_locks(),
        }
    }

    // ════════════════════════════════════════════════════════════════════════
    // INSERTION
    // ════════════════════════════════════════════════════════════════════════

    /// Insert into the pending pool. The pool is internally concurrent,
    /// so no named lock is taken.
    pub fn put(&self, item: A) {
        self.pending.put(item.hash(), item);
    }

    /// Insert with an explicit target status.
    ///
    /// `InConsensus` is rejected: items enter consensus only through
    /// [`pull_for_consensus`](Self::pull_for_consensus).
    pub async fn put_with_status(
        &self,
        item: A,
        status: ConsensusStatus,
    ) -> Result<(), LifecycleError> {
        match status {
            ConsensusStatus::Pending => {
                self.put(item);
                Ok(())
            }
            ConsensusStatus::Accepted => {
                self.locks
                    .with_lock(ACCEPTED_UPDATE, || {
                        self.accepted.put(item.hash(), item.clone());
                    })
                    .await?;
                Ok(())
            }
            ConsensusStatus::Unknown => {
                self.locks
                    .with_lock(UNKNOWN_UPDATE, || {
                        self.unknown.put(item.hash(), item.clone());
                    })
                    .await?;
                Ok(())
            }
            ConsensusStatus::InConsensus => Err(LifecycleError::UnknownStatus(status)),
        }
    }

    // ════════════════════════════════════════════════════════════════════════
    // UPDATES
    // ════════════════════════════════════════════════════════════════════════

    /// Update (or seed with `empty`) in the substore for `status`.
    pub async fn update_with_status(
        &self,
        key: &str,
        f: impl FnOnce(A) -> A,
        empty: A,
        status: ConsensusStatus,
    ) -> Result<A, LifecycleError> {
        match status {
            ConsensusStatus::Pending => Ok(self.pending.update_or_insert(key, f, empty)),
            ConsensusStatus::InConsensus => Ok(self
                .locks
                .with_lock(IN_CONSENSUS_UPDATE, || {
                    self.in_consensus.update_or_insert(key, f, empty)
                })
                .await?),
            ConsensusStatus::Accepted => Ok(self
                .locks
                .with_lock(ACCEPTED_UPDATE, || {
                    self.accepted.update_or_insert(key, f, empty)
                })
                .await?),
            ConsensusStatus::Unknown => Ok(self
                .locks
                .with_lock(UNKNOWN_UPDATE, || {
                    self.unknown.update_or_insert(key, f, empty)
                })
                .await?),
        }
    }

    /// Status-oblivious update: probes Pending → InConsensus → Accepted
    /// → Unknown and updates the first substore that holds the key.
    /// Returns `None` when the key is absent everywhere.
    pub async fn update(
        &self,
        key: &str,
        f: impl Fn(A) -> A,
    ) -> Result<Option<A>, LifecycleError> {
        if let Some(updated) = self.pending.update(key, &f) {
            return Ok(Some(updated));
        }
        {
            let _guard = self.locks.acquire(IN_CONSENSUS_UPDATE).await?;
            if let Some(updated) = self.in_consensus.update(key, &f) {
                return Ok(Some(updated));
            }
        }
        {
            let _guard = self.locks.acquire(ACCEPTED_UPDATE).await?;
            if let Some(updated) = self.accepted.update(key, &f) {
                return Ok(Some(updated));
            }
        }
        {
            let _guard = self.locks.acquire(UNKNOWN_UPDATE).await?;
            if let Some(updated) = self.unknown.update(key, &f) {
                return Ok(Some(updated));
            }
        }
        Ok(None)
    }

    // ════════════════════════════════════════════════════════════════════════
    // TRANSITIONS
    // ════════════════════════════════════════════════════════════════════════

    /// Finalize an item: it lands in Accepted and disappears from every
    /// other substore within the same transition. Idempotent — removals
    /// are unconditional and re-accepting is harmless.
    pub async fn accept(&self, item: A) -> Result<(), LifecycleError> {
        let hash = item.hash();
        self.put_with_status(item, ConsensusStatus::Accepted).await?;
        self.pending.remove(&hash);
        self.locks
            .with_lock(IN_CONSENSUS_UPDATE, || {
                self.in_consensus.remove(&hash);
            })
            .await?;
        self.locks
            .with_lock(UNKNOWN_UPDATE, || {
                self.unknown.remove(&hash);
            })
            .await?;
        Ok(())
    }

    /// Move up to `count` pending items into the in-consensus substore,
    /// returning the items actually transferred (possibly empty).
    pub async fn pull_for_consensus(&self, count: usize) -> Result<Vec<A>, LifecycleError> {
        let pulled = self.pending.pull(count).unwrap_or_default();
        if !pulled.is_empty() {
            let _guard = self.locks.acquire(IN_CONSENSUS_UPDATE).await?;
            for item in &pulled {
                self.in_consensus.put(item.hash(), item.clone());
            }
        }
        Ok(pulled)
    }

    /// Demote stalled round members: every listed hash present in
    /// InConsensus moves to Unknown.
    pub async fn clear_in_consensus(&self, hashes: &[String]) -> Result<(), LifecycleError> {
        let removed = self
            .locks
            .with_lock(IN_CONSENSUS_UPDATE, || {
                hashes
                    .iter()
                    .filter_map(|hash| self.in_consensus.remove(hash))
                    .collect::<Vec<A>>()
            })
            .await?;
        if !removed.is_empty() {
            self.locks
                .with_lock(UNKNOWN_UPDATE, || {
                    for item in removed {
                        self.unknown.put(item.hash(), item);
                    }
                })
                .await?;
        }
        Ok(())
    }

    /// Requeue round members: every listed hash present in InConsensus
    /// goes back to the pending pool.
    pub async fn return_to_pending(&self, hashes: &[String]) -> Result<(), LifecycleError> {
        let removed = self
            .locks
            .with_lock(IN_CONSENSUS_UPDATE, || {
                hashes
                    .iter()
                    .filter_map(|hash| self.in_consensus.remove(hash))
                    .collect::<Vec<A>>()
            })
            .await?;
        for item in removed {
            self.put(item);
        }
        Ok(())
    }

    // ════════════════════════════════════════════════════════════════════════
    // LOOKUPS & COUNTS
    // ════════════════════════════════════════════════════════════════════════

    /// Probe Accepted → InConsensus → Pending → Unknown, first hit wins.
    pub fn lookup(&self, key: &str) -> Option<A> {
        self.accepted
            .lookup(key)
            .or_else(|| self.in_consensus.lookup(key))
            .or_else(|| self.pending.lookup(key))
            .or_else(|| self.unknown.lookup(key))
    }

    /// Targeted lookup in one substore.
    pub fn lookup_with_status(&self, key: &str, status: ConsensusStatus) -> Option<A> {
        match status {
            ConsensusStatus::Pending => self.pending.lookup(key),
            ConsensusStatus::InConsensus => self.in_consensus.lookup(key),
            ConsensusStatus::Accepted => self.accepted.lookup(key),
            ConsensusStatus::Unknown => self.unknown.lookup(key),
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.pending.contains(key)
            || self.in_consensus.contains(key)
            || self.accepted.contains(key)
            || self.unknown.contains(key)
    }

    /// Total item count across the four substores.
    pub fn count(&self) -> usize {
        self.pending.len() + self.in_consensus.len() + self.accepted.len() + self.unknown.len()
    }

    pub fn count_with_status(&self, status: ConsensusStatus) -> usize {
        match status {
            ConsensusStatus::Pending => self.pending.len(),
            ConsensusStatus::InConsensus => self.in_consensus.len(),
            ConsensusStatus::Accepted => self.accepted.len(),
            ConsensusStatus::Unknown => self.unknown.len(),
        }
    }

    /// Per-status counts for metrics export. Every substore reports its
    /// real size.
    pub fn metrics_map(&self) -> HashMap<String, usize> {
        HashMap::from([
            ("pending".to_string(), self.pending.len()),
            ("in_consensus".to_string(), self.in_consensus.len()),
            ("accepted".to_string(), self.accepted.len()),
            ("unknown".to_string(), self.unknown.len()),
        ])
    }

    /// The 20 most recently accepted items, newest first.
    pub fn last_20_accepted(&self) -> Vec<A> {
        self.accepted.last_n(20)
    }

    // ════════════════════════════════════════════════════════════════════════
    // MERKLE POOL
    // ════════════════════════════════════════════════════════════════════════

    /// Record which item hashes a merkle root covers. Append-only; roots
    /// are never evicted.
    pub async fn register_merkle_root(
        &self,
        merkle_root: &str,
        hashes: Vec<String>,
    ) -> Result<(), LifecycleError> {
        self.locks
            .with_lock(MERKLE_POOL_UPDATE, || {
                self.merkle_pool
                    .write()
                    .insert(merkle_root.to_string(), hashes);
            })
            .await?;
        Ok(())
    }

    pub fn find_hashes_by_merkle_root(&self, merkle_root: &str) -> Option<Vec<String>> {
        self.merkle_pool.read().get(merkle_root).cloned()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// UNIT TESTS
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Checkpoint {
        hash: String,
        round: u32,
    }

    impl Checkpoint {
        fn new(hash: &str) -> Self {
            Self {
                hash: hash.to_string(),
                round: 0,
            }
        }
    }

    impl ConsensusObject for Checkpoint {
        fn hash(&self) -> String {
            self.hash.clone()
        }
    }

    fn store() -> LifecycleStore<Checkpoint> {
        LifecycleStore::new(240)
    }

    fn statuses_holding(store: &LifecycleStore<Checkpoint>, key: &str) -> Vec<ConsensusStatus> {
        [
            ConsensusStatus::Pending,
            ConsensusStatus::InConsensus,
            ConsensusStatus::Accepted,
            ConsensusStatus::Unknown,
        ]
        .into_iter()
        .filter(|status| store.lookup_with_status(key, *status).is_some())
        .collect()
    }

    // ════════════════════════════════════════════════════════════════════════
    // A. INSERTION RULES
    // ════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn test_put_lands_in_pending() {
        let store = store();
        store.put(Checkpoint::new("a"));

        assert_eq!(store.count_with_status(ConsensusStatus::Pending), 1);
        assert_eq!(statuses_holding(&store, "a"), vec![ConsensusStatus::Pending]);
    }

    #[tokio::test]
    async fn test_put_with_status_accepted_and_unknown() {
        let store = store();
        store
            .put_with_status(Checkpoint::new("a"), ConsensusStatus::Accepted)
            .await
            .expect("accepted put");
        store
            .put_with_status(Checkpoint::new("u"), ConsensusStatus::Unknown)
            .await
            .expect("unknown put");

        assert_eq!(statuses_holding(&store, "a"), vec![ConsensusStatus::Accepted]);
        assert_eq!(statuses_holding(&store, "u"), vec![ConsensusStatus::Unknown]);
    }

    #[tokio::test]
    async fn test_put_with_status_in_consensus_is_rejected() {
        let store = store();
        let result = store
            .put_with_status(Checkpoint::new("a"), ConsensusStatus::InConsensus)
            .await;

        assert_eq!(
            result,
            Err(LifecycleError::UnknownStatus(ConsensusStatus::InConsensus))
        );
        assert!(!store.contains("a"));
    }

    // ════════════════════════════════════════════════════════════════════════
    // B. CONSENSUS ROUND TRANSFER
    // ════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn test_pull_for_consensus_moves_items() {
        let store = store();
        store.put(Checkpoint::new("a"));
        store.put(Checkpoint::new("b"));
        store.put(Checkpoint::new("c"));

        let pulled = store.pull_for_consensus(2).await.expect("pull");
        let pulled_hashes: Vec<String> = pulled.iter().map(|c| c.hash.clone()).collect();
        assert_eq!(pulled_hashes, vec!["a".to_string(), "b".to_string()]);

        assert_eq!(statuses_holding(&store, "a"), vec![ConsensusStatus::InConsensus]);
        assert_eq!(statuses_holding(&store, "b"), vec![ConsensusStatus::InConsensus]);
        assert_eq!(statuses_holding(&store, "c"), vec![ConsensusStatus::Pending]);
    }

    #[tokio::test]
    async fn test_pull_on_empty_pool_is_empty() {
        let store = store();
        let pulled = store.pull_for_consensus(5).await.expect("pull");
        assert!(pulled.is_empty());
    }

    #[tokio::test]
    async fn test_clear_in_consensus_demotes_to_unknown() {
        let store = store();
        store.put(Checkpoint::new("a"));
        store.put(Checkpoint::new("b"));
        store.pull_for_consensus(2).await.expect("pull");

        store
            .clear_in_consensus(&["a".to_string(), "ghost".to_string()])
            .await
            .expect("clear");

        assert_eq!(statuses_holding(&store, "a"), vec![ConsensusStatus::Unknown]);
        assert_eq!(statuses_holding(&store, "b"), vec![ConsensusStatus::InConsensus]);
        assert!(!store.contains("ghost"));
    }

    #[tokio::test]
    async fn test_return_to_pending_requeues() {
        let store = store();
        store.put(Checkpoint::new("a"));
        store.pull_for_consensus(1).await.expect("pull");

        store
            .return_to_pending(&["a".to_string()])
            .await
            .expect("return");

        assert_eq!(statuses_holding(&store, "a"), vec![ConsensusStatus::Pending]);
        // The item can enter a new round.
        let pulled = store.pull_for_consensus(1).await.expect("pull");
        assert_eq!(pulled.len(), 1);
    }

    // ════════════════════════════════════════════════════════════════════════
    // C. ACCEPT
    // ════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn test_accept_from_in_consensus() {
        let store = store();
        let item = Checkpoint::new("a");
        store.put(item.clone());
        store.pull_for_consensus(1).await.expect("pull");

        store.accept(item.clone()).await.expect("accept");

        assert_eq!(store.lookup("a"), Some(item));
        assert_eq!(statuses_holding(&store, "a"), vec![ConsensusStatus::Accepted]);
    }

    #[tokio::test]
    async fn test_accept_clears_unknown_too() {
        let store = store();
        let item = Checkpoint::new("a");
        store
            .put_with_status(item.clone(), ConsensusStatus::Unknown)
            .await
            .expect("unknown put");

        store.accept(item).await.expect("accept");

        assert_eq!(statuses_holding(&store, "a"), vec![ConsensusStatus::Accepted]);
    }

    #[tokio::test]
    async fn test_accept_is_idempotent() {
        let store = store();
        let item = Checkpoint::new("a");
        store.put(item.clone());

        store.accept(item.clone()).await.expect("first accept");
        store.accept(item.clone()).await.expect("second accept");

        assert_eq!(store.count_with_status(ConsensusStatus::Accepted), 1);
        assert_eq!(statuses_holding(&store, "a"), vec![ConsensusStatus::Accepted]);
    }

    // ════════════════════════════════════════════════════════════════════════
    // D. DISJOINTNESS UNDER OPERATION SEQUENCES
    // ════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn test_no_hash_in_two_live_substores_after_any_transition() {
        let store = store();
        let hashes = ["a", "b", "c", "d"];
        for hash in hashes {
            store.put(Checkpoint::new(hash));
        }

        let check = |store: &LifecycleStore<Checkpoint>| {
            for hash in hashes {
                let live = statuses_holding(store, hash)
                    .into_iter()
                    .filter(|s| *s != ConsensusStatus::Unknown)
                    .count();
                assert!(live <= 1, "{} present in {} live substores", hash, live);
                // Unknown and InConsensus are mutually exclusive too.
                let holding = statuses_holding(store, hash);
                assert!(
                    !(holding.contains(&ConsensusStatus::Unknown)
                        && holding.contains(&ConsensusStatus::InConsensus)),
                    "{} in both Unknown and InConsensus",
                    hash
                );
            }
        };

        store.pull_for_consensus(2).await.expect("pull");
        check(&store);
        store
            .clear_in_consensus(&["a".to_string()])
            .await
            .expect("clear");
        check(&store);
        store
            .return_to_pending(&["b".to_string()])
            .await
            .expect("return");
        check(&store);
        store.accept(Checkpoint::new("a")).await.expect("accept a");
        check(&store);
        store.accept(Checkpoint::new("c")).await.expect("accept c");
        check(&store);
        store.pull_for_consensus(10).await.expect("pull rest");
        check(&store);
    }

    // ════════════════════════════════════════════════════════════════════════
    // E. UPDATES
    // ════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn test_status_oblivious_update_stops_at_first_store() {
        let store = store();
        store.put(Checkpoint::new("a"));
        store.pull_for_consensus(1).await.expect("pull");

        let updated = store
            .update("a", |mut c| {
                c.round += 1;
                c
            })
            .await
            .expect("update");
        assert_eq!(updated.map(|c| c.round), Some(1));
        assert_eq!(
            store
                .lookup_with_status("a", ConsensusStatus::InConsensus)
                .map(|c| c.round),
            Some(1)
        );
    }

    #[tokio::test]
    async fn test_status_oblivious_update_absent_everywhere() {
        let store = store();
        let updated = store.update("ghost", |c| c).await.expect("update");
        assert!(updated.is_none());
    }

    #[tokio::test]
    async fn test_update_with_status_seeds_empty() {
        let store = store();
        let seeded = store
            .update_with_status(
                "a",
                |mut c| {
                    c.round = 9;
                    c
                },
                Checkpoint::new("a"),
                ConsensusStatus::Unknown,
            )
            .await
            .expect("update");

        assert_eq!(seeded.round, 9);
        assert_eq!(statuses_holding(&store, "a"), vec![ConsensusStatus::Unknown]);
    }

    // ════════════════════════════════════════════════════════════════════════
    // F. LOOKUP ORDER & COUNTS
    // ════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn test_lookup_prefers_accepted() {
        let store = store();
        let pending_version = Checkpoint {
            hash: "a".to_string(),
            round: 1,
        };
        let accepted_version = Checkpoint {
            hash: "a".to_string(),
            round: 2,
        };
        store.put(pending_version);
        store
            .put_with_status(accepted_version.clone(), ConsensusStatus::Accepted)
            .await
            .expect("accepted put");

        assert_eq!(store.lookup("a"), Some(accepted_version));
    }

    #[tokio::test]
    async fn test_counts_and_metrics_map() {
        let store = store();
        store.put(Checkpoint::new("p1"));
        store.put(Checkpoint::new("p2"));
        store.put(Checkpoint::new("ic"));
        store.pull_for_consensus(1).await.expect("pull");
        store
            .put_with_status(Checkpoint::new("acc"), ConsensusStatus::Accepted)
            .await
            .expect("accepted put");
        store
            .put_with_status(Checkpoint::new("unk"), ConsensusStatus::Unknown)
            .await
            .expect("unknown put");

        assert_eq!(store.count(), 5);
        let metrics = store.metrics_map();
        assert_eq!(metrics.get("pending"), Some(&2));
        assert_eq!(metrics.get("in_consensus"), Some(&1));
        assert_eq!(metrics.get("accepted"), Some(&1));
        assert_eq!(metrics.get("unknown"), Some(&1));
    }

    #[tokio::test]
    async fn test_bounded_substores_evict_oldest() {
        let store: LifecycleStore<Checkpoint> = LifecycleStore::new(3);
        for i in 0..5 {
            store
                .put_with_status(Checkpoint::new(&format!("a{}", i)), ConsensusStatus::Accepted)
                .await
                .expect("accepted put");
        }

        assert_eq!(store.count_with_status(ConsensusStatus::Accepted), 3);
        assert!(!store.contains("a0"));
        assert!(!store.contains("a1"));
        assert!(store.contains("a4"));
    }

    #[tokio::test]
    async fn test_last_20_accepted_newest_first() {
        let store = store();
        for i in 0..25 {
            store
                .put_with_status(Checkpoint::new(&format!("a{}", i)), ConsensusStatus::Accepted)
                .await
                .expect("accepted put");
        }

        let last = store.last_20_accepted();
        assert_eq!(last.len(), 20);
        assert_eq!(last[0].hash, "a24");
        assert_eq!(last[19].hash, "a5");
    }

    // ════════════════════════════════════════════════════════════════════════
    // G. MERKLE POOL
    // ════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn test_merkle_root_registration_and_lookup() {
        let store = store();
        store
            .register_merkle_root("root-1", vec!["a".to_string(), "b".to_string()])
            .await
            .expect("register");

        assert_eq!(
            store.find_hashes_by_merkle_root("root-1"),
            Some(vec!["a".to_string(), "b".to_string()])
        );
        assert_eq!(store.find_hashes_by_merkle_root("root-2"), None);
    }
}
