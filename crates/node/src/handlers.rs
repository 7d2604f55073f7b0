//! HTTP Handlers — Observability Only
//!
//! Read-only endpoints for monitoring the coordination layer. All
//! coordination commands flow through the typed APIs; nothing here
//! mutates state.
//!
//! | Endpoint | Content |
//! |----------|---------|
//! | `GET /health` | Node state and history size |
//! | `GET /metrics` | Prometheus exposition of coordination counters |
//! | `GET /snapshot/recent` | The node's recent-snapshot list |
//!
//! `/snapshot/recent` doubles as the peer-facing recent-history
//! endpoint the verification sweeps of other nodes consume.

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use concord_common::RecentSnapshot;

use crate::metrics::CoordinationMetrics;
use crate::node_state::{NodeState, NodeStateService};
use crate::recent::RecentSnapshots;

/// Shared state for the observability router.
pub struct AppState {
    pub node_id: String,
    pub node_state: Arc<NodeStateService>,
    pub recent: Arc<RecentSnapshots>,
    pub metrics: Arc<CoordinationMetrics>,
    /// Per-status lifecycle counts, refreshed by the caller's store.
    pub status_counts: Box<dyn Fn() -> Vec<(String, usize)> + Send + Sync>,
}

/// `GET /health` response.
#[derive(Debug, Serialize)]
pub struct HealthResp {
    pub node_id: String,
    pub state: NodeState,
    pub serving: bool,
    pub recent_snapshots: usize,
}

/// Build the read-only observability router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .route("/snapshot/recent", get(recent))
        .with_state(state)
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResp> {
    let node_state = state.node_state.get();
    Json(HealthResp {
        node_id: state.node_id.clone(),
        state: node_state,
        serving: node_state == NodeState::Ready,
        recent_snapshots: state.recent.len(),
    })
}

async fn metrics(State(state): State<Arc<AppState>>) -> String {
    let counts = (state.status_counts)();
    state.metrics.to_prometheus(&counts)
}

async fn recent(State(state): State<Arc<AppState>>) -> Json<Vec<RecentSnapshot>> {
    Json(state.recent.get())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app_state() -> Arc<AppState> {
        Arc::new(AppState {
            node_id: "node-1".to_string(),
            node_state: Arc::new(NodeStateService::new(NodeState::Ready)),
            recent: Arc::new(RecentSnapshots::new()),
            metrics: Arc::new(CoordinationMetrics::new()),
            status_counts: Box::new(|| vec![("pending".to_string(), 2)]),
        })
    }

    #[tokio::test]
    async fn test_health_reports_serving_state() {
        let state = app_state();
        state.recent.set(vec![RecentSnapshot::new("a", 1)]);

        let Json(resp) = health(State(Arc::clone(&state))).await;
        assert_eq!(resp.node_id, "node-1");
        assert!(resp.serving);
        assert_eq!(resp.recent_snapshots, 1);

        state.node_state.set(NodeState::DownloadInProgress);
        let Json(resp) = health(State(state)).await;
        assert!(!resp.serving);
    }

    #[tokio::test]
    async fn test_metrics_endpoint_includes_status_counts() {
        let state = app_state();
        state.metrics.record_redownload_finished();

        let body = metrics(State(state)).await;
        assert!(body.contains("concord_redownload_finished_total 1"));
        assert!(body.contains("concord_lifecycle_items{status=\"pending\"} 2"));
    }

    #[tokio::test]
    async fn test_recent_endpoint_returns_history() {
        let state = app_state();
        let history = vec![RecentSnapshot::new("b", 2), RecentSnapshot::new("a", 1)];
        state.recent.set(history.clone());

        let Json(resp) = recent(State(state)).await;
        assert_eq!(resp, history);
    }

    #[test]
    fn test_router_builds() {
        let _router = build_router(app_state());
    }
}
