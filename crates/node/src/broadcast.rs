//! Snapshot Broadcast & Verify Loop
//!
//! Two peer-facing flows drive divergence detection:
//!
//! - [`broadcast_snapshot`](SnapshotBroadcaster::broadcast_snapshot):
//!   after creating a snapshot, record it locally, announce it to every
//!   ready full peer and evaluate their verdicts. Enough
//!   `SnapshotInvalid` replies plus a real divergence triggers a
//!   redownload episode and the local history adopts the majority.
//! - [`verify_recent_snapshots`](SnapshotBroadcaster::verify_recent_snapshots):
//!   poll peers for their recent lists, resolve a height-by-height
//!   majority, and recover if the local history has forked or fallen
//!   behind.
//!
//! Peer RPC is strictly best-effort: a failed or timed-out call is
//! logged, recorded as a missing reply and never fails the loop.
//!
//! Both flows share the redownload driver's single-flight gate, so a
//! node never runs two recovery episodes at once no matter which flow
//! noticed the divergence first.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use concord_common::{
    choose_majority_state, diff_from_majority, recent_list,
    select_snapshot_from_broadcast_responses, should_redownload, snapshots_at_height, NodeType,
    PeerData, PeerId, ProcessingConfig, RecentSnapshot, SnapshotCreated, SnapshotVerification,
    SnapshotsAtHeight,
};

use crate::node_state::NodeStateService;
use crate::peers::{PeerDirectory, PeerGateway};
use crate::recent::RecentSnapshots;
use crate::redownload::RedownloadDriver;

/// Announces snapshots and verifies the local history against peers.
pub struct SnapshotBroadcaster {
    directory: Arc<dyn PeerDirectory>,
    gateway: Arc<dyn PeerGateway>,
    driver: Arc<RedownloadDriver>,
    recent: Arc<RecentSnapshots>,
    node_state: Arc<NodeStateService>,
    config: ProcessingConfig,
}

impl SnapshotBroadcaster {
    pub fn new(
        directory: Arc<dyn PeerDirectory>,
        gateway: Arc<dyn PeerGateway>,
        driver: Arc<RedownloadDriver>,
        recent: Arc<RecentSnapshots>,
        node_state: Arc<NodeStateService>,
        config: ProcessingConfig,
    ) -> Self {
        Self {
            directory,
            gateway,
            driver,
            recent,
            node_state,
            config,
        }
    }

    /// Record a freshly created snapshot and announce it to the cluster.
    ///
    /// Never fails: peer errors become missing replies, and a failed
    /// recovery episode leaves the local history untouched for the next
    /// sweep to retry.
    pub async fn broadcast_snapshot(&self, hash: &str, height: i64) {
        let own = self.recent.prepend_truncated(
            RecentSnapshot::new(hash, height),
            self.config.recent_snapshot_number,
        );

        let peers = self.directory.ready_peers(NodeType::Full).await;
        if peers.is_empty() {
            debug!(hash, height, "no ready peers to announce snapshot to");
            return;
        }

        let request = SnapshotCreated {
            hash: hash.to_string(),
            height,
        };
        let responses = self.collect_verifications(&peers, &request).await;

        let selection = select_snapshot_from_broadcast_responses(
            &responses,
            &own,
            self.config.snapshot_height_redownload_delay_interval,
            self.config.max_invalid_snapshot_rate,
        );
        let Some(selection) = selection else {
            return;
        };

        info!(
            to_delete = selection.diff.to_delete.len(),
            to_download = selection.diff.to_download.len(),
            "snapshot broadcast detected divergence from majority"
        );
        let restricted = restrict_peers(&peers, &selection.diff.peers);
        match self.driver.try_redownload(&selection.diff, &restricted).await {
            Ok(()) => self.recent.set(selection.recent_state_to_set),
            Err(e) => warn!(error = %e, "redownload after snapshot broadcast failed"),
        }
    }

    /// Compare the local recent history against a height-by-height
    /// cluster majority and recover if it diverges.
    ///
    /// Gated by the shared single-flight flag: a sweep that finds one
    /// already in flight is a no-op. The flag is cleared on every path
    /// when the guard drops.
    pub async fn verify_recent_snapshots(&self) {
        let gate = self.driver.gate();
        let Some(_guard) = gate.try_acquire() else {
            debug!("cluster check already in flight, skipping verification sweep");
            return;
        };

        if !self.node_state.get().can_verify_recent_snapshots() {
            debug!(state = ?self.node_state.get(), "node state forbids snapshot verification");
            return;
        }

        let peers = self.directory.ready_peers(NodeType::Full).await;
        let mut proposals: HashMap<PeerId, SnapshotsAtHeight> = HashMap::new();
        for (peer_id, peer) in &peers {
            match self.gateway.recent_snapshots(peer).await {
                Ok(list) => {
                    proposals.insert(peer_id.clone(), snapshots_at_height(&list));
                }
                Err(e) => {
                    warn!(peer = %peer_id, error = %e, "failed to fetch recent snapshots");
                }
            }
        }
        if proposals.is_empty() {
            return;
        }

        let own = self.recent.get();
        let own_heights = snapshots_at_height(&own);
        let majority_heights = choose_majority_state(&own_heights, &proposals);
        if majority_heights.is_empty() {
            return;
        }
        let majority = recent_list(&majority_heights);

        let candidates = agreeing_peers(&proposals, &majority_heights);
        let diff = diff_from_majority(&own, &majority, candidates);
        if !should_redownload(
            &own,
            &diff,
            self.config.snapshot_height_redownload_delay_interval,
        ) {
            return;
        }

        info!(
            to_delete = diff.to_delete.len(),
            to_download = diff.to_download.len(),
            "recent-snapshot verification detected divergence"
        );
        let restricted = restrict_peers(&peers, &diff.peers);
        match self.driver.run_episode(&diff, &restricted).await {
            Ok(()) => self.recent.set(majority),
            Err(e) => warn!(error = %e, "redownload during verification sweep failed"),
        }
    }

    /// Run the verification sweep forever on a fixed period.
    pub fn spawn_verify_loop(self: Arc<Self>, period: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                self.verify_recent_snapshots().await;
            }
        })
    }

    async fn collect_verifications(
        &self,
        peers: &HashMap<PeerId, PeerData>,
        request: &SnapshotCreated,
    ) -> Vec<Option<SnapshotVerification>> {
        let mut responses = Vec::with_capacity(peers.len());
        for (peer_id, peer) in peers {
            match self.gateway.verify_snapshot(peer, request).await {
                Ok(verification) => responses.push(Some(verification)),
                Err(e) => {
                    warn!(peer = %peer_id, error = %e, "snapshot verification request failed");
                    responses.push(None);
                }
            }
        }
        responses
    }
}

/// Peers eligible to serve a redownload, keyed for the file store.
fn restrict_peers(
    peers: &HashMap<PeerId, PeerData>,
    allowed: &[PeerId],
) -> HashMap<PeerId, PeerData> {
    peers
        .iter()
        .filter(|(peer_id, _)| allowed.contains(peer_id))
        .map(|(peer_id, peer)| (peer_id.clone(), peer.clone()))
        .collect()
}

/// Peers whose proposal matches the majority at every height the
/// majority defines; falls back to all responders when no proposal
/// matches the (possibly blended) majority exactly.
fn agreeing_peers(
    proposals: &HashMap<PeerId, SnapshotsAtHeight>,
    majority: &SnapshotsAtHeight,
) -> Vec<PeerId> {
    let mut agreeing: Vec<PeerId> = proposals
        .iter()
        .filter(|(_, proposal)| {
            majority
                .iter()
                .all(|(height, hash)| proposal.get(height) == Some(hash))
        })
        .map(|(peer_id, _)| peer_id.clone())
        .collect();
    if agreeing.is_empty() {
        agreeing = proposals.keys().cloned().collect();
    }
    agreeing.sort();
    agreeing
}

// ════════════════════════════════════════════════════════════════════════════
// UNIT TESTS
// ════════════════════════════════════════════════════════════════════════════
