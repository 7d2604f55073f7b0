//! Health Metric Checker
//!
//! Evaluates a point-in-time snapshot of node metrics for the anomalies
//! operators alert on. Failures are reported, counted, and otherwise
//! left alone — nothing here recovers anything; recovery belongs to the
//! redownload driver.
//!
//! | Failure | Condition |
//! |---------|-----------|
//! | HeightEmpty | The node reports height zero after startup |
//! | CheckpointValidationFailures | Any checkpoint failed validation since the last sweep |
//! | InconsistentSnapshotHash | Own snapshot hash differs from the cluster's at the same height |

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::metrics::CoordinationMetrics;

/// Operator-facing health failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HealthCheckFailure {
    #[error("node height is empty")]
    HeightEmpty,

    #[error("{0} checkpoint validation failures observed")]
    CheckpointValidationFailures(u64),

    #[error("snapshot hash at height {height} diverges from the cluster")]
    InconsistentSnapshotHash { height: i64 },
}

/// Point-in-time metric readings fed to the checker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricSnapshot {
    /// Current chain height the node reports.
    pub height: i64,
    /// Checkpoint validation failures since the previous sweep.
    pub checkpoint_validation_failures: u64,
    /// Hash of the node's latest snapshot, if one exists.
    pub own_snapshot_hash: Option<String>,
    /// Hash the cluster majority holds at the same height, if known.
    pub cluster_snapshot_hash: Option<String>,
}

/// Stateless evaluator that also feeds the failure counters.
pub struct HealthChecker {
    metrics: Arc<CoordinationMetrics>,
}

impl HealthChecker {
    pub fn new(metrics: Arc<CoordinationMetrics>) -> Self {
        Self { metrics }
    }

    /// Evaluate one metric snapshot. Returns every failure found, in a
    /// fixed order; an empty vector means healthy.
    pub fn evaluate(&self, snapshot: &MetricSnapshot) -> Vec<HealthCheckFailure> {
        let mut failures = Vec::new();

        if snapshot.height == 0 {
            self.metrics.record_height_empty();
            failures.push(HealthCheckFailure::HeightEmpty);
        }

        if snapshot.checkpoint_validation_failures > 0 {
            self.metrics
                .add_checkpoint_validation_failures(snapshot.checkpoint_validation_failures);
            failures.push(HealthCheckFailure::CheckpointValidationFailures(
                snapshot.checkpoint_validation_failures,
            ));
        }

        if let (Some(own), Some(cluster)) = (
            snapshot.own_snapshot_hash.as_deref(),
            snapshot.cluster_snapshot_hash.as_deref(),
        ) {
            if own != cluster {
                self.metrics.record_inconsistent_snapshot_hash();
                failures.push(HealthCheckFailure::InconsistentSnapshotHash {
                    height: snapshot.height,
                });
            }
        }

        failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::Ordering;

    fn healthy_snapshot() -> MetricSnapshot {
        MetricSnapshot {
            height: 10,
            checkpoint_validation_failures: 0,
            own_snapshot_hash: Some("abc".to_string()),
            cluster_snapshot_hash: Some("abc".to_string()),
        }
    }

    #[test]
    fn test_healthy_snapshot_has_no_failures() {
        let metrics = Arc::new(CoordinationMetrics::new());
        let checker = HealthChecker::new(Arc::clone(&metrics));

        assert!(checker.evaluate(&healthy_snapshot()).is_empty());
        assert_eq!(metrics.height_empty.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_zero_height_reports_height_empty() {
        let metrics = Arc::new(CoordinationMetrics::new());
        let checker = HealthChecker::new(Arc::clone(&metrics));

        let snapshot = MetricSnapshot {
            height: 0,
            ..healthy_snapshot()
        };
        assert_eq!(
            checker.evaluate(&snapshot),
            vec![HealthCheckFailure::HeightEmpty]
        );
        assert_eq!(metrics.height_empty.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_validation_failures_are_counted() {
        let metrics = Arc::new(CoordinationMetrics::new());
        let checker = HealthChecker::new(Arc::clone(&metrics));

        let snapshot = MetricSnapshot {
            checkpoint_validation_failures: 3,
            ..healthy_snapshot()
        };
        assert_eq!(
            checker.evaluate(&snapshot),
            vec![HealthCheckFailure::CheckpointValidationFailures(3)]
        );
        assert_eq!(
            metrics.checkpoint_validation_failures.load(Ordering::SeqCst),
            3
        );
    }

    #[test]
    fn test_diverging_hash_is_inconsistent() {
        let metrics = Arc::new(CoordinationMetrics::new());
        let checker = HealthChecker::new(Arc::clone(&metrics));

        let snapshot = MetricSnapshot {
            cluster_snapshot_hash: Some("other".to_string()),
            ..healthy_snapshot()
        };
        assert_eq!(
            checker.evaluate(&snapshot),
            vec![HealthCheckFailure::InconsistentSnapshotHash { height: 10 }]
        );
        assert_eq!(metrics.inconsistent_snapshot_hash.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_missing_cluster_hash_is_not_inconsistent() {
        let metrics = Arc::new(CoordinationMetrics::new());
        let checker = HealthChecker::new(metrics);

        let snapshot = MetricSnapshot {
            cluster_snapshot_hash: None,
            ..healthy_snapshot()
        };
        assert!(checker.evaluate(&snapshot).is_empty());
    }

    #[test]
    fn test_multiple_failures_in_fixed_order() {
        let metrics = Arc::new(CoordinationMetrics::new());
        let checker = HealthChecker::new(metrics);

        let snapshot = MetricSnapshot {
            height: 0,
            checkpoint_validation_failures: 2,
            own_snapshot_hash: Some("a".to_string()),
            cluster_snapshot_hash: Some("b".to_string()),
        };
        assert_eq!(
            checker.evaluate(&snapshot),
            vec![
                HealthCheckFailure::HeightEmpty,
                HealthCheckFailure::CheckpointValidationFailures(2),
                HealthCheckFailure::InconsistentSnapshotHash { height: 0 },
            ]
        );
    }
}
