//! Redownload Driver
//!
//! Executes recovery episodes when the local snapshot history has
//! diverged from the cluster majority: fetch the majority's snapshots
//! from the peers that hold them, then delete the local divergent ones.
//!
//! ## Episode Protocol
//!
//! ```text
//! 1. node state ──▶ DownloadInProgress
//! 2. file_store.fetch(to_download \ {zero hash}, restricted peers)
//! 3. file_store.remove(to_delete)          (only after fetch succeeds)
//! 4. redownload_finished += 1
//! 5. node state ──▶ Ready
//! ```
//!
//! On any failure the node state is restored to `Ready`,
//! `redownload_error` is incremented and the error propagates to the
//! caller. Fetch strictly precedes deletion so a failed episode never
//! leaves the node with less history than it started with.
//!
//! ## Single Flight
//!
//! At most one episode is in flight per node. Entry is gated by an
//! atomic compare-and-swap on [`SingleFlight`]; the flag is cleared by
//! the RAII [`FlightGuard`] on every exit path, including panics. The
//! same gate also covers the recent-snapshot verification sweep, which
//! runs its episode under an already-held guard via
//! [`run_episode`](RedownloadDriver::run_episode).

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{error, info};

use concord_common::{PeerData, PeerId, SnapshotDiff, SNAPSHOT_ZERO_HASH};

use crate::metrics::CoordinationMetrics;
use crate::node_state::{NodeState, NodeStateService};

/// Errors from a redownload episode.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RedownloadError {
    /// Another episode holds the single-flight gate.
    #[error("a redownload episode is already in flight")]
    AlreadyInFlight,

    #[error("snapshot fetch failed: {0}")]
    Fetch(String),

    #[error("snapshot removal failed: {0}")]
    Remove(String),
}

/// Access to the on-disk snapshot files; internals are not this layer's
/// concern.
#[async_trait]
pub trait SnapshotFileStore: Send + Sync {
    /// Download the given snapshot hashes from the given peers.
    async fn fetch(
        &self,
        hashes: &[String],
        peers: &HashMap<PeerId, PeerData>,
    ) -> Result<(), String>;

    /// Delete the given snapshot hashes locally.
    async fn remove(&self, hashes: &[String]) -> Result<(), String>;
}

// ════════════════════════════════════════════════════════════════════════════
// SINGLE FLIGHT GATE
// ════════════════════════════════════════════════════════════════════════════

/// Atomic single-flight flag shared by everything that may start a
/// redownload episode.
#[derive(Debug, Default)]
pub struct SingleFlight {
    in_flight: AtomicBool,
}

impl SingleFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the gate. `None` means someone else is in flight.
    pub fn try_acquire(&self) -> Option<FlightGuard<'_>> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            Some(FlightGuard { flag: &self.in_flight })
        } else {
            None
        }
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }
}

/// RAII claim on the single-flight gate; dropping it clears the flag.
pub struct FlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

// ════════════════════════════════════════════════════════════════════════════
// DRIVER
// ════════════════════════════════════════════════════════════════════════════

/// Serializes and executes redownload episodes.
pub struct RedownloadDriver {
    file_store: Arc<dyn SnapshotFileStore>,
    node_state: Arc<NodeStateService>,
    metrics: Arc<CoordinationMetrics>,
    gate: Arc<SingleFlight>,
}

impl RedownloadDriver {
    pub fn new(
        file_store: Arc<dyn SnapshotFileStore>,
        node_state: Arc<NodeStateService>,
        metrics: Arc<CoordinationMetrics>,
    ) -> Self {
        Self {
            file_store,
            node_state,
            metrics,
            gate: Arc::new(SingleFlight::new()),
        }
    }

    /// The gate, for callers that must hold it across more than one
    /// episode step (the verification sweep).
    pub fn gate(&self) -> Arc<SingleFlight> {
        Arc::clone(&self.gate)
    }

    /// Claim the gate and run one episode. Returns `AlreadyInFlight`
    /// without touching anything when another episode is running.
    pub async fn try_redownload(
        &self,
        diff: &SnapshotDiff,
        peers: &HashMap<PeerId, PeerData>,
    ) -> Result<(), RedownloadError> {
        let _guard = self
            .gate
            .try_acquire()
            .ok_or(RedownloadError::AlreadyInFlight)?;
        self.run_episode(diff, peers).await
    }

    /// Run one episode. The caller must hold the single-flight gate —
    /// either via [`try_redownload`](Self::try_redownload) or an
    /// explicitly acquired [`FlightGuard`].
    pub(crate) async fn run_episode(
        &self,
        diff: &SnapshotDiff,
        peers: &HashMap<PeerId, PeerData>,
    ) -> Result<(), RedownloadError> {
        self.node_state.set(NodeState::DownloadInProgress);

        match self.fetch_then_remove(diff, peers).await {
            Ok(()) => {
                self.metrics.record_redownload_finished();
                self.node_state.set(NodeState::Ready);
                info!(
                    downloaded = diff.to_download.len(),
                    deleted = diff.to_delete.len(),
                    "redownload episode finished"
                );
                Ok(())
            }
            Err(e) => {
                self.node_state.set(NodeState::Ready);
                self.metrics.record_redownload_error();
                error!(error = %e, "redownload episode failed");
                Err(e)
            }
        }
    }

    async fn fetch_then_remove(
        &self,
        diff: &SnapshotDiff,
        peers: &HashMap<PeerId, PeerData>,
    ) -> Result<(), RedownloadError> {
        let to_fetch: Vec<String> = diff
            .to_download
            .iter()
            .map(|snapshot| snapshot.hash.clone())
            .filter(|hash| hash != SNAPSHOT_ZERO_HASH)
            .collect();
        self.file_store
            .fetch(&to_fetch, peers)
            .await
            .map_err(RedownloadError::Fetch)?;

        let to_remove: Vec<String> = diff
            .to_delete
            .iter()
            .map(|snapshot| snapshot.hash.clone())
            .collect();
        self.file_store
            .remove(&to_remove)
            .await
            .map_err(RedownloadError::Remove)?;
        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// UNIT TESTS
// ════════════════════════════════════════════════════════════════════════════
