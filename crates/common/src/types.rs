//! Shared Coordination Types
//!
//! Wire and domain types used across the concord coordination layer:
//! snapshot records, peer verification messages, diff results, and the
//! peer directory data model.
//!
//! ## Conventions
//!
//! - Snapshot hashes are opaque hex strings; the coordination layer never
//!   computes them, it only compares them.
//! - Recent-snapshot lists are ordered newest-first (index 0 is the most
//!   recently created snapshot).
//! - `SnapshotsAtHeight` is a `BTreeMap` so that iteration order is always
//!   ascending by height, independent of how the map was built.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Identifier of a peer in the cluster.
pub type PeerId = String;

/// One node's view of its snapshot history, keyed by height.
///
/// Within a single node's view each height maps to exactly one hash;
/// conflicting hashes across nodes are what majority resolution settles.
pub type SnapshotsAtHeight = BTreeMap<i64, String>;

/// Sentinel hash of the genesis snapshot. It exists on every node by
/// construction and is never fetched from peers.
pub const SNAPSHOT_ZERO_HASH: &str =
    "0000000000000000000000000000000000000000000000000000000000000000";

// ════════════════════════════════════════════════════════════════════════════
// SNAPSHOT RECORDS
// ════════════════════════════════════════════════════════════════════════════

/// A `(hash, height)` marker for one materialized snapshot.
///
/// Height is monotone non-decreasing per honest node. Equality covers both
/// fields: two records with the same height but different hashes are
/// different snapshots (a fork at that height).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecentSnapshot {
    /// Opaque snapshot hash.
    pub hash: String,
    /// Chain height the snapshot was taken at.
    pub height: i64,
}

impl RecentSnapshot {
    pub fn new(hash: impl Into<String>, height: i64) -> Self {
        Self {
            hash: hash.into(),
            height,
        }
    }
}

/// Convert a newest-first recent-snapshot list into a height-keyed view.
///
/// If the list contains two entries at the same height (which an honest
/// node never produces), the one closer to the head of the list wins.
pub fn snapshots_at_height(recent: &[RecentSnapshot]) -> SnapshotsAtHeight {
    let mut at_height = SnapshotsAtHeight::new();
    for snapshot in recent.iter().rev() {
        at_height.insert(snapshot.height, snapshot.hash.clone());
    }
    at_height
}

/// Convert a height-keyed view back into a newest-first recent list.
pub fn recent_list(at_height: &SnapshotsAtHeight) -> Vec<RecentSnapshot> {
    at_height
        .iter()
        .rev()
        .map(|(height, hash)| RecentSnapshot::new(hash.clone(), *height))
        .collect()
}

// ════════════════════════════════════════════════════════════════════════════
// PEER VERIFICATION MESSAGES
// ════════════════════════════════════════════════════════════════════════════

/// Announcement of a freshly created snapshot, sent to peers for
/// verification (`POST /snapshot/verify`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotCreated {
    pub hash: String,
    pub height: i64,
}

/// A peer's judgement of an announced snapshot.
///
/// | Status | Meaning |
/// |--------|---------|
/// | SnapshotCorrect | The peer has the same snapshot at that height |
/// | SnapshotInvalid | The peer has a different snapshot at that height |
/// | SnapshotHeightAbove | The peer has not reached that height yet |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VerificationStatus {
    SnapshotCorrect,
    SnapshotInvalid,
    SnapshotHeightAbove,
}

/// A peer's reply to a snapshot announcement, carrying its own recent
/// history so the announcer can detect divergence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotVerification {
    /// Identifier of the replying peer.
    pub id: PeerId,
    /// The peer's judgement of the announced snapshot.
    pub status: VerificationStatus,
    /// The peer's recent-snapshot list, newest first.
    pub recent_snapshot: Vec<RecentSnapshot>,
}

// ════════════════════════════════════════════════════════════════════════════
// DIVERGENCE DIFF
// ════════════════════════════════════════════════════════════════════════════

/// Divergence between the local snapshot history and the cluster majority.
///
/// `to_delete` lists local snapshots absent from the majority, in local
/// order. `to_download` lists majority snapshots absent locally, lowest
/// height first so downloads replay history in order. An empty `to_delete`
/// or `to_download` means no redownload is warranted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotDiff {
    pub to_delete: Vec<RecentSnapshot>,
    pub to_download: Vec<RecentSnapshot>,
    /// Peers that hold the majority state and can serve the downloads.
    pub peers: Vec<PeerId>,
}

// ════════════════════════════════════════════════════════════════════════════
// OCCURRENCES
// ════════════════════════════════════════════════════════════════════════════

/// How often one proposed value appeared among `of` proposals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occurrences<T> {
    pub value: T,
    /// Number of proposers that proposed `value`.
    pub n: usize,
    /// Total number of proposals the value competed against.
    pub of: usize,
}

impl<T> Occurrences<T> {
    /// Fraction of proposals that named this value. Zero when `of` is zero.
    pub fn percentage(&self) -> f64 {
        if self.of == 0 {
            0.0
        } else {
            self.n as f64 / self.of as f64
        }
    }
}

/// One peer's height-keyed snapshot proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerProposal {
    pub peer_id: PeerId,
    pub snapshots: SnapshotsAtHeight,
}

// ════════════════════════════════════════════════════════════════════════════
// PEER DIRECTORY DATA MODEL
// ════════════════════════════════════════════════════════════════════════════

/// Role a peer plays in the cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeType {
    /// Keeps full snapshot history and participates in verification.
    Full,
    /// Serves queries only; not consulted for snapshot majority.
    Light,
}

/// Reachability state the peer directory reports for a peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PeerState {
    Ready,
    Pending,
    Offline,
}

/// Directory entry for one peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerData {
    /// Base URL of the peer's API, e.g. `http://10.0.0.5:9000`.
    pub endpoint: String,
    pub node_type: NodeType,
    pub state: PeerState,
}

impl PeerData {
    pub fn new(endpoint: impl Into<String>, node_type: NodeType, state: PeerState) -> Self {
        Self {
            endpoint: endpoint.into(),
            node_type,
            state,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// UNIT TESTS
// ════════════════════════════════════════════════════════════════════════════
