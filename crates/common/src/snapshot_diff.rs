//! Snapshot Diff & Threshold Logic
//!
//! Decides whether a node's recent snapshot history has diverged from the
//! cluster and, if so, what to delete, what to download, and from whom.
//!
//! ## Flow
//!
//! ```text
//! peer lists ──▶ choose_majority_snapshot_list ──▶ (majority, peers)
//!                                                      │
//! own list ────────────▶ compare_snapshot_state ◀──────┘
//!                                │
//!                                ▼
//!                           SnapshotDiff ──▶ should_redownload
//! ```
//!
//! Everything here is pure: same inputs, same outputs, no I/O.

use std::collections::{HashMap, HashSet};

use crate::types::{
    PeerId, RecentSnapshot, SnapshotDiff, SnapshotVerification, VerificationStatus,
};

/// Majority by whole-list agreement: peers proposing the exact same
/// recent-snapshot list form a group, and the largest group wins.
///
/// Ties are broken deterministically: among equally sized groups the one
/// with the lexicographically smallest sorted peer set wins. An empty
/// cluster yields an empty majority.
pub fn choose_majority_snapshot_list(
    cluster: &[(PeerId, Vec<RecentSnapshot>)],
) -> (Vec<RecentSnapshot>, Vec<PeerId>) {
    let mut groups: HashMap<&[RecentSnapshot], Vec<PeerId>> = HashMap::new();
    for (peer_id, list) in cluster {
        groups.entry(list.as_slice()).or_default().push(peer_id.clone());
    }

    let mut ranked: Vec<(&[RecentSnapshot], Vec<PeerId>)> = groups
        .into_iter()
        .map(|(list, mut peers)| {
            peers.sort();
            (list, peers)
        })
        .collect();
    ranked.sort_by(|a, b| b.1.len().cmp(&a.1.len()).then_with(|| a.1.cmp(&b.1)));

    match ranked.into_iter().next() {
        Some((list, peers)) => (list.to_vec(), peers),
        None => (Vec::new(), Vec::new()),
    }
}

/// Diff the local history against the cluster majority.
///
/// `to_delete` preserves local order; `to_download` is reversed so the
/// lowest heights download first.
pub fn compare_snapshot_state(
    own: &[RecentSnapshot],
    cluster: &[(PeerId, Vec<RecentSnapshot>)],
) -> SnapshotDiff {
    let (majority, peers) = choose_majority_snapshot_list(cluster);
    diff_from_majority(own, &majority, peers)
}

/// Build a [`SnapshotDiff`] from an already-chosen majority list.
pub fn diff_from_majority(
    own: &[RecentSnapshot],
    majority: &[RecentSnapshot],
    peers: Vec<PeerId>,
) -> SnapshotDiff {
    let majority_set: HashSet<&RecentSnapshot> = majority.iter().collect();
    let own_set: HashSet<&RecentSnapshot> = own.iter().collect();

    let to_delete = own
        .iter()
        .filter(|snapshot| !majority_set.contains(snapshot))
        .cloned()
        .collect();
    let mut to_download: Vec<RecentSnapshot> = majority
        .iter()
        .filter(|snapshot| !own_set.contains(snapshot))
        .cloned()
        .collect();
    to_download.reverse();

    SnapshotDiff {
        to_delete,
        to_download,
        peers,
    }
}

/// Decide whether a diff warrants an actual redownload episode.
///
/// Returns false when any of the diff's fields is empty. Otherwise the
/// node redownloads when it is either too far behind the majority
/// (`below_interval`) or forked at a height it shares with the majority
/// (`misaligned`).
pub fn should_redownload(own: &[RecentSnapshot], diff: &SnapshotDiff, delay_interval: i64) -> bool {
    if diff.to_delete.is_empty() || diff.to_download.is_empty() || diff.peers.is_empty() {
        return false;
    }

    let max_own_height = own.iter().map(|s| s.height).max().unwrap_or(0);
    let max_download_height = diff.to_download.iter().map(|s| s.height).max().unwrap_or(0);
    let below_interval = max_own_height + delay_interval < max_download_height;

    let misaligned = own.iter().any(|own_snapshot| {
        diff.to_delete
            .iter()
            .chain(diff.to_download.iter())
            .any(|diverged| {
                diverged.height == own_snapshot.height && diverged.hash != own_snapshot.hash
            })
    });

    below_interval || misaligned
}

/// Whether enough verification replies reported `SnapshotInvalid` to
/// justify a cluster consistency check.
///
/// The rate is computed over the replies actually received; peers that
/// failed to answer (`None`) are not counted as invalid. No replies at
/// all means nothing can be concluded.
pub fn should_run_cluster_check(
    responses: &[Option<SnapshotVerification>],
    max_invalid_snapshot_rate: u8,
) -> bool {
    let received = responses.iter().flatten().count();
    if received == 0 {
        return false;
    }
    let invalid = responses
        .iter()
        .flatten()
        .filter(|v| v.status == VerificationStatus::SnapshotInvalid)
        .count();
    invalid * 100 >= max_invalid_snapshot_rate as usize * received
}

/// Outcome of evaluating broadcast verification replies: a divergence
/// worth acting on, plus the list the local history should become once
/// the episode succeeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotSelection {
    pub diff: SnapshotDiff,
    pub recent_state_to_set: Vec<RecentSnapshot>,
}

/// Evaluate the replies to a snapshot broadcast.
///
/// Returns `None` unless the invalid rate crosses the threshold AND the
/// resulting diff passes [`should_redownload`].
pub fn select_snapshot_from_broadcast_responses(
    responses: &[Option<SnapshotVerification>],
    own: &[RecentSnapshot],
    delay_interval: i64,
    max_invalid_snapshot_rate: u8,
) -> Option<SnapshotSelection> {
    if !should_run_cluster_check(responses, max_invalid_snapshot_rate) {
        return None;
    }

    let cluster: Vec<(PeerId, Vec<RecentSnapshot>)> = responses
        .iter()
        .flatten()
        .map(|v| (v.id.clone(), v.recent_snapshot.clone()))
        .collect();

    let diff = compare_snapshot_state(own, &cluster);
    if !should_redownload(own, &diff, delay_interval) {
        return None;
    }

    let (majority, _) = choose_majority_snapshot_list(&cluster);
    Some(SnapshotSelection {
        diff,
        recent_state_to_set: majority,
    })
}

// ════════════════════════════════════════════════════════════════════════════
// UNIT TESTS
// ════════════════════════════════════════════════════════════════════════════
