//! Coordination Metrics
//!
//! Lock-free counters for the snapshot coordination layer, exported in
//! Prometheus exposition format.
//!
//! | Metric | Description |
//! |--------|-------------|
//! | redownload_finished | Completed redownload episodes |
//! | redownload_error | Failed redownload episodes |
//! | height_empty | Health checks that saw a zero height |
//! | checkpoint_validation_failures | Checkpoint validation failures observed |
//! | inconsistent_snapshot_hash | Health checks that saw a snapshot hash diverging from the cluster |
//!
//! All fields are `AtomicU64`; increments use `Relaxed` ordering
//! (monotonic counters need no synchronization) and exported reads use
//! `SeqCst` for snapshot consistency.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for redownload episodes and health anomalies.
#[derive(Debug, Default)]
pub struct CoordinationMetrics {
    pub redownload_finished: AtomicU64,
    pub redownload_error: AtomicU64,
    pub height_empty: AtomicU64,
    pub checkpoint_validation_failures: AtomicU64,
    pub inconsistent_snapshot_hash: AtomicU64,
}

impl CoordinationMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_redownload_finished(&self) {
        self.redownload_finished.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_redownload_error(&self) {
        self.redownload_error.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_height_empty(&self) {
        self.height_empty.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_checkpoint_validation_failures(&self, count: u64) {
        self.checkpoint_validation_failures
            .fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_inconsistent_snapshot_hash(&self) {
        self.inconsistent_snapshot_hash.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_redownload_finished(&self) -> u64 {
        self.redownload_finished.load(Ordering::SeqCst)
    }

    pub fn get_redownload_error(&self) -> u64 {
        self.redownload_error.load(Ordering::SeqCst)
    }

    /// Export all counters in Prometheus text exposition format,
    /// optionally followed by the per-status lifecycle counts the
    /// caller supplies.
    pub fn to_prometheus(&self, status_counts: &[(String, usize)]) -> String {
        let redownload_finished = self.redownload_finished.load(Ordering::SeqCst);
        let redownload_error = self.redownload_error.load(Ordering::SeqCst);
        let height_empty = self.height_empty.load(Ordering::SeqCst);
        let validation_failures = self.checkpoint_validation_failures.load(Ordering::SeqCst);
        let inconsistent_hash = self.inconsistent_snapshot_hash.load(Ordering::SeqCst);

        let mut out = format!(
            "# HELP concord_redownload_finished_total Completed redownload episodes\n\
             # TYPE concord_redownload_finished_total counter\n\
             concord_redownload_finished_total {}\n\
             # HELP concord_redownload_error_total Failed redownload episodes\n\
             # TYPE concord_redownload_error_total counter\n\
             concord_redownload_error_total {}\n\
             # HELP concord_height_empty_total Health checks observing an empty height\n\
             # TYPE concord_height_empty_total counter\n\
             concord_height_empty_total {}\n\
             # HELP concord_checkpoint_validation_failures_total Checkpoint validation failures observed\n\
             # TYPE concord_checkpoint_validation_failures_total counter\n\
             concord_checkpoint_validation_failures_total {}\n\
             # HELP concord_inconsistent_snapshot_hash_total Health checks observing a diverging snapshot hash\n\
             # TYPE concord_inconsistent_snapshot_hash_total counter\n\
             concord_inconsistent_snapshot_hash_total {}\n",
            redownload_finished,
            redownload_error,
            height_empty,
            validation_failures,
            inconsistent_hash,
        );

        if !status_counts.is_empty() {
            out.push_str(
                "# HELP concord_lifecycle_items Items per lifecycle status\n\
                 # TYPE concord_lifecycle_items gauge\n",
            );
            let mut counts: Vec<&(String, usize)> = status_counts.iter().collect();
            counts.sort_by(|a, b| a.0.cmp(&b.0));
            for (status, count) in counts {
                out.push_str(&format!(
                    "concord_lifecycle_items{{status=\"{}\"}} {}\n",
                    status, count
                ));
            }
        }
        out
    }

    /// Reset all counters to zero. Each field resets independently.
    pub fn reset(&self) {
        self.redownload_finished.store(0, Ordering::SeqCst);
        self.redownload_error.store(0, Ordering::SeqCst);
        self.height_empty.store(0, Ordering::SeqCst);
        self.checkpoint_validation_failures.store(0, Ordering::SeqCst);
        self.inconsistent_snapshot_hash.store(0, Ordering::SeqCst);
    }
}

// ════════════════════════════════════════════════════════════════════════════
// UNIT TESTS
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_new_initializes_to_zero() {
        let metrics = CoordinationMetrics::new();
        assert_eq!(metrics.get_redownload_finished(), 0);
        assert_eq!(metrics.get_redownload_error(), 0);
    }

    #[test]
    fn test_increments_accumulate() {
        let metrics = CoordinationMetrics::new();
        metrics.record_redownload_finished();
        metrics.record_redownload_finished();
        metrics.record_redownload_error();
        metrics.add_checkpoint_validation_failures(5);

        assert_eq!(metrics.get_redownload_finished(), 2);
        assert_eq!(metrics.get_redownload_error(), 1);
        assert_eq!(
            metrics.checkpoint_validation_failures.load(Ordering::SeqCst),
            5
        );
    }

    #[test]
    fn test_to_prometheus_contains_all_series() {
        let metrics = CoordinationMetrics::new();
        metrics.record_redownload_finished();
        metrics.record_height_empty();

        let counts = vec![("pending".to_string(), 7), ("accepted".to_string(), 3)];
        let out = metrics.to_prometheus(&counts);

        assert!(out.contains("concord_redownload_finished_total 1\n"));
        assert!(out.contains("concord_redownload_error_total 0\n"));
        assert!(out.contains("concord_height_empty_total 1\n"));
        assert!(out.contains("concord_lifecycle_items{status=\"pending\"} 7\n"));
        assert!(out.contains("concord_lifecycle_items{status=\"accepted\"} 3\n"));
    }

    #[test]
    fn test_to_prometheus_deterministic_ordering() {
        let metrics = CoordinationMetrics::new();
        let forward = vec![("a".to_string(), 1), ("b".to_string(), 2)];
        let reversed = vec![("b".to_string(), 2), ("a".to_string(), 1)];
        assert_eq!(metrics.to_prometheus(&forward), metrics.to_prometheus(&reversed));
    }

    #[test]
    fn test_reset_zeroes_everything() {
        let metrics = CoordinationMetrics::new();
        metrics.record_redownload_finished();
        metrics.record_redownload_error();
        metrics.reset();

        assert_eq!(metrics.get_redownload_finished(), 0);
        assert_eq!(metrics.get_redownload_error(), 0);
    }

    #[test]
    fn test_concurrent_increments_lose_nothing() {
        let metrics = Arc::new(CoordinationMetrics::new());
        let mut handles = vec![];
        for _ in 0..8 {
            let metrics = Arc::clone(&metrics);
            handles.push(thread::spawn(move || {
                for _ in 0..1000 {
                    metrics.record_redownload_finished();
                }
            }));
        }
        for handle in handles {
            handle.join().expect("thread panicked");
        }
        assert_eq!(metrics.get_redownload_finished(), 8_000);
    }
}
