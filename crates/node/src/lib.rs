//! # Concord Node
//!
//! Coordination core of a concord ledger node: the consensus lifecycle
//! store and the snapshot majority / redownload engine.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                        Coordination Core                          │
//! ├──────────────────────────────────────────────────────────────────┤
//! │                                                                   │
//! │  ┌─────────────────────────────────────────────────────────┐     │
//! │  │                LifecycleStore<A>                         │     │
//! │  │  Pending ──▶ InConsensus ──▶ Accepted                    │     │
//! │  │     ▲            │  ▲                                    │     │
//! │  │     └── Unknown ◀┘  └── named locks per substore         │     │
//! │  └─────────────────────────────────────────────────────────┘     │
//! │                                                                   │
//! │  ┌──────────────────┐    ┌──────────────────────────────────┐    │
//! │  │ SnapshotBroadcaster │ │ ClusterCheckWorker               │    │
//! │  │ - broadcast_snapshot│ │ - periodic consistency sweep     │    │
//! │  │ - verify_recent_…   │ │                                  │    │
//! │  └─────────┬────────┘    └───────────────┬──────────────────┘    │
//! │            │      divergence detected     │                      │
//! │            ▼                              ▼                      │
//! │  ┌─────────────────────────────────────────────────────────┐     │
//! │  │ RedownloadDriver (single flight)                        │     │
//! │  │ Ready ──▶ DownloadInProgress ──▶ fetch ──▶ delete ──▶   │     │
//! │  │ Ready                                                   │     │
//! │  └─────────────────────────────────────────────────────────┘     │
//! │                                                                   │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Invariants
//!
//! 1. **Substore disjointness**: after any completed transition an item
//!    hash lives in at most one of Pending / InConsensus / Accepted.
//! 2. **Bounded history**: the bounded substores and the recent-snapshot
//!    list never exceed their configured capacities.
//! 3. **Accept finality**: accepting removes the item from InConsensus
//!    and Unknown within the same transition.
//! 4. **Single-flight recovery**: at most one redownload episode per
//!    node, and the node returns to `Ready` on every outcome.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `store` | Bounded insertion-ordered keyed store (FIFO eviction) |
//! | `mempool` | Pending pool with batched `pull` |
//! | `locks` | Named single-permit gate registry |
//! | `lifecycle` | Four-state lifecycle store + merkle pool |
//! | `node_state` | Node lifecycle enum and shared state service |
//! | `recent` | Atomic recent-snapshot holder |
//! | `peers` | Peer directory / gateway seams + HTTP gateway |
//! | `redownload` | Single-flight recovery driver |
//! | `broadcast` | Snapshot announcement and verification sweep |
//! | `cluster_check` | Periodic cluster-consistency loop |
//! | `health` | Metric-based health failure checker |
//! | `metrics` | Atomic counters with Prometheus export |
//! | `handlers` | Read-only observability endpoints (axum) |

pub mod broadcast;
pub mod cluster_check;
pub mod handlers;
pub mod health;
pub mod lifecycle;
pub mod locks;
pub mod mempool;
pub mod metrics;
pub mod node_state;
pub mod peers;
pub mod recent;
pub mod redownload;
pub mod store;

pub use broadcast::SnapshotBroadcaster;
pub use cluster_check::ClusterCheckWorker;
pub use handlers::{build_router, AppState, HealthResp};
pub use health::{HealthCheckFailure, HealthChecker, MetricSnapshot};
pub use lifecycle::{ConsensusObject, ConsensusStatus, LifecycleError, LifecycleStore};
pub use locks::{
    LockError, NamedLocks, ACCEPTED_UPDATE, IN_CONSENSUS_UPDATE, MERKLE_POOL_UPDATE,
    UNKNOWN_UPDATE,
};
pub use mempool::PendingPool;
pub use metrics::CoordinationMetrics;
pub use node_state::{NodeState, NodeStateService};
pub use peers::{HttpPeerGateway, PeerDirectory, PeerError, PeerGateway};
pub use recent::RecentSnapshots;
pub use redownload::{
    FlightGuard, RedownloadDriver, RedownloadError, SingleFlight, SnapshotFileStore,
};
pub use store::BoundedStore;
