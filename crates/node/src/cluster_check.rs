//! Cluster Consistency Check Loop
//!
//! Periodic sweep that compares the node's recent snapshot history
//! against the whole-list majority of the cluster and drives recovery
//! when the local view has diverged. Complements the broadcast path:
//! broadcasting catches divergence at snapshot creation, this loop
//! catches it while the node is quietly serving.
//!
//! Any error along the way is logged and the sweep yields nothing; the
//! next tick tries again.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use concord_common::{
    choose_majority_snapshot_list, compare_snapshot_state, should_redownload, NodeType, PeerData,
    PeerId, ProcessingConfig, RecentSnapshot,
};

use crate::node_state::NodeStateService;
use crate::peers::{PeerDirectory, PeerGateway};
use crate::recent::RecentSnapshots;
use crate::redownload::{RedownloadDriver, RedownloadError};

/// Periodic cluster-consistency sweeper.
pub struct ClusterCheckWorker {
    directory: Arc<dyn PeerDirectory>,
    gateway: Arc<dyn PeerGateway>,
    driver: Arc<RedownloadDriver>,
    recent: Arc<RecentSnapshots>,
    node_state: Arc<NodeStateService>,
    config: ProcessingConfig,
}

impl ClusterCheckWorker {
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

    /// One sweep: skipped unless the node state allows it; on a
    /// successful recovery the local history adopts the majority list.
    pub async fn run_cluster_check(&self) {
        if !self.node_state.get().can_run_cluster_check() {
            debug!(state = ?self.node_state.get(), "node state forbids cluster check");
            return;
        }
        if let Some(majority) = self.check_cluster_consistency().await {
            self.recent.set(majority);
        }
    }

    /// Collect peer histories, diff against the majority and recover if
    /// warranted. Returns the adopted majority list, or `None` when
    /// nothing changed (agreement, no peers, or a failed episode).
    async fn check_cluster_consistency(&self) -> Option<Vec<RecentSnapshot>> {
        let peers = self.directory.ready_peers(NodeType::Full).await;
        let cluster = self.collect_recent_lists(&peers).await;
        if cluster.is_empty() {
            debug!("no peer histories available for cluster check");
            return None;
        }

        let own = self.recent.get();
        let diff = compare_snapshot_state(&own, &cluster);
        if !should_redownload(
            &own,
            &diff,
            self.config.snapshot_height_redownload_delay_interval,
        ) {
            return None;
        }

        info!(
            to_delete = diff.to_delete.len(),
            to_download = diff.to_download.len(),
            "cluster check detected divergence from majority"
        );
        let restricted: HashMap<PeerId, PeerData> = peers
            .iter()
            .filter(|(peer_id, _)| diff.peers.contains(peer_id))
            .map(|(peer_id, peer)| (peer_id.clone(), peer.clone()))
            .collect();

        match self.driver.try_redownload(&diff, &restricted).await {
            Ok(()) => {
                let (majority, _) = choose_majority_snapshot_list(&cluster);
                Some(majority)
            }
            Err(RedownloadError::AlreadyInFlight) => {
                debug!("cluster check skipped: redownload already in flight");
                None
            }
            Err(e) => {
                error!(error = %e, "cluster check redownload failed");
                None
            }
        }
    }

    async fn collect_recent_lists(
        &self,
        peers: &HashMap<PeerId, PeerData>,
    ) -> Vec<(PeerId, Vec<RecentSnapshot>)> {
        let mut cluster = Vec::with_capacity(peers.len());
        for (peer_id, peer) in peers {
            match self.gateway.recent_snapshots(peer).await {
                Ok(list) => cluster.push((peer_id.clone(), list)),
                Err(e) => {
                    warn!(peer = %peer_id, error = %e, "failed to fetch recent snapshots");
                }
            }
        }
        // Deterministic regardless of directory iteration order.
        cluster.sort_by(|a, b| a.0.cmp(&b.0));
        cluster
    }

    /// Run the sweep forever on a fixed period.
    pub fn spawn(self: Arc<Self>, period: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                self.run_cluster_check().await;
            }
        })
    }
}

// ════════════════════════════════════════════════════════════════════════════
// UNIT TESTS
// ════════════════════════════════════════════════════════════════════════════
