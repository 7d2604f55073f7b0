//! # Concord Common
//!
//! Shared foundation for the concord coordination layer: wire and domain
//! types, typed configuration, and the pure majority / divergence logic
//! that the node crate drives with real peer I/O.
//!
//! | Module | Description |
//! |--------|-------------|
//! | `types` | Snapshot records, verification messages, diffs, peer data |
//! | `config` | Typed TOML configuration with defaults |
//! | `majority` | Height-keyed majority state chooser |
//! | `snapshot_diff` | List-grouping majority, diff and redownload thresholds |
//!
//! Everything in `majority` and `snapshot_diff` is pure and deterministic;
//! all I/O lives in `concord-node`.

pub mod config;
pub mod majority;
pub mod snapshot_diff;
pub mod types;

pub use config::{load_from_file, ConfigError, ProcessingConfig, DEFAULT_SUBSTORE_CAPACITY};
pub use majority::choose_majority_state;
pub use snapshot_diff::{
    choose_majority_snapshot_list, compare_snapshot_state, diff_from_majority,
    select_snapshot_from_broadcast_responses, should_redownload, should_run_cluster_check,
    SnapshotSelection,
};
pub use types::{
    recent_list, snapshots_at_height, NodeType, Occurrences, PeerData, PeerId, PeerProposal,
    PeerState, RecentSnapshot, SnapshotCreated, SnapshotDiff, SnapshotVerification,
    SnapshotsAtHeight, VerificationStatus, SNAPSHOT_ZERO_HASH,
};
