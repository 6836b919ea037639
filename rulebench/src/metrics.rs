use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Counts the work a strategy actually performs
#[derive(Debug, Clone)]
pub struct StrategyMetrics {
    patterns_evaluated: Arc<AtomicU64>,
    tasks_submitted: Arc<AtomicU64>,
    tasks_completed: Arc<AtomicU64>,
    tasks_cancelled: Arc<AtomicU64>,
    results_polled: Arc<AtomicU64>,
}

impl StrategyMetrics {
    /// Creates a new StrategyMetrics instance
    pub fn new() -> Self {
        Self {
            patterns_evaluated: Arc::new(AtomicU64::new(0)),
            tasks_submitted: Arc::new(AtomicU64::new(0)),
            tasks_completed: Arc::new(AtomicU64::new(0)),
            tasks_cancelled: Arc::new(AtomicU64::new(0)),
            results_polled: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Records one pattern being matched against the target
    pub fn record_evaluation(&self) {
        self.patterns_evaluated.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a task handed to a worker pool
    pub fn record_submission(&self) {
        self.tasks_submitted.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a task that ran to completion on a worker
    pub fn record_completion(&self) {
        self.tasks_completed.fetch_add(1, Ordering::Relaxed);
    }

    /// Records queued tasks discarded by a forced shutdown
    pub fn record_cancellations(&self, count: u64) {
        let total = self.tasks_cancelled.fetch_add(count, Ordering::Relaxed) + count;
        debug!("Cancelled {} queued tasks, total cancelled: {}", count, total);
    }

    /// Records the caller consuming one task result
    pub fn record_poll(&self) {
        self.results_polled.fetch_add(1, Ordering::Relaxed);
    }

    pub fn patterns_evaluated(&self) -> u64 {
        self.patterns_evaluated.load(Ordering::Relaxed)
    }

    pub fn tasks_submitted(&self) -> u64 {
        self.tasks_submitted.load(Ordering::Relaxed)
    }

    pub fn tasks_completed(&self) -> u64 {
        self.tasks_completed.load(Ordering::Relaxed)
    }

    pub fn tasks_cancelled(&self) -> u64 {
        self.tasks_cancelled.load(Ordering::Relaxed)
    }

    pub fn results_polled(&self) -> u64 {
        self.results_polled.load(Ordering::Relaxed)
    }

    /// Gets a snapshot of all counters
    pub fn get_stats(&self) -> StrategyStats {
        StrategyStats {
            patterns_evaluated: self.patterns_evaluated(),
            tasks_submitted: self.tasks_submitted(),
            tasks_completed: self.tasks_completed(),
            tasks_cancelled: self.tasks_cancelled(),
            results_polled: self.results_polled(),
        }
    }

    /// Logs the current counters
    pub fn log_stats(&self) {
        let stats = self.get_stats();
        info!(
            "Strategy stats:\n\
             Patterns evaluated: {}\n\
             Tasks submitted/completed/cancelled: {}/{}/{}\n\
             Results polled: {}",
            stats.patterns_evaluated,
            stats.tasks_submitted,
            stats.tasks_completed,
            stats.tasks_cancelled,
            stats.results_polled
        );
    }
}

impl Default for StrategyMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time copy of [`StrategyMetrics`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrategyStats {
    pub patterns_evaluated: u64,
    pub tasks_submitted: u64,
    pub tasks_completed: u64,
    pub tasks_cancelled: u64,
    pub results_polled: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluation_tracking() {
        let metrics = StrategyMetrics::new();
        metrics.record_evaluation();
        metrics.record_evaluation();
        assert_eq!(metrics.patterns_evaluated(), 2);
    }

    #[test]
    fn test_task_tracking() {
        let metrics = StrategyMetrics::new();

        metrics.record_submission();
        metrics.record_submission();
        metrics.record_submission();
        metrics.record_completion();
        metrics.record_cancellations(2);
        metrics.record_poll();

        let stats = metrics.get_stats();
        assert_eq!(stats.tasks_submitted, 3);
        assert_eq!(stats.tasks_completed, 1);
        assert_eq!(stats.tasks_cancelled, 2);
        assert_eq!(stats.results_polled, 1);
    }

    #[test]
    fn test_clones_share_counters() {
        let metrics = StrategyMetrics::new();
        let clone = metrics.clone();
        clone.record_evaluation();
        assert_eq!(metrics.patterns_evaluated(), 1);
    }
}
