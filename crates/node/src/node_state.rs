//! Node Lifecycle State
//!
//! The coarse operational state of this node, consulted by the snapshot
//! loops before doing cluster work and toggled by the redownload driver
//! around recovery episodes.
//!
//! ## Semantics
//!
//! | State | Meaning |
//! |-------|---------|
//! | Initial | Booting; not yet serving or checking the cluster |
//! | Ready | Serving; may broadcast, verify and run cluster checks |
//! | DownloadInProgress | A redownload episode is rewriting history |
//! | Offline | Deliberately out of the cluster |
//!
//! Cluster checks and recent-snapshot verification run only in `Ready`:
//! a downloading node's history is in flux and must not be compared
//! against peers, and a booting or offline node has nothing to compare.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Coarse operational state of the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeState {
    Initial,
    Ready,
    DownloadInProgress,
    Offline,
}

impl NodeState {
    /// Whether the periodic cluster-consistency sweep may run.
    pub fn can_run_cluster_check(&self) -> bool {
        matches!(self, NodeState::Ready)
    }

    /// Whether recent-snapshot verification against peers may run.
    pub fn can_verify_recent_snapshots(&self) -> bool {
        matches!(self, NodeState::Ready)
    }
}

/// Shared holder for the node state, cheap to read and logged on change.
pub struct NodeStateService {
    state: RwLock<NodeState>,
}

impl NodeStateService {
    pub fn new(initial: NodeState) -> Self {
        Self {
            state: RwLock::new(initial),
        }
    }

    pub fn get(&self) -> NodeState {
        *self.state.read()
    }

    pub fn set(&self, next: NodeState) {
        let mut state = self.state.write();
        if *state != next {
            info!(from = ?*state, to = ?next, "node state transition");
            *state = next;
        }
    }
}

impl Default for NodeStateService {
    fn default() -> Self {
        Self::new(NodeState::Initial)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_ready_allows_cluster_work() {
        assert!(NodeState::Ready.can_run_cluster_check());
        assert!(NodeState::Ready.can_verify_recent_snapshots());

        for state in [
            NodeState::Initial,
            NodeState::DownloadInProgress,
            NodeState::Offline,
        ] {
            assert!(!state.can_run_cluster_check());
            assert!(!state.can_verify_recent_snapshots());
        }
    }

    #[test]
    fn test_service_get_set() {
        let service = NodeStateService::default();
        assert_eq!(service.get(), NodeState::Initial);

        service.set(NodeState::Ready);
        assert_eq!(service.get(), NodeState::Ready);

        // Setting the same state again is a no-op.
        service.set(NodeState::Ready);
        assert_eq!(service.get(), NodeState::Ready);
    }
}
