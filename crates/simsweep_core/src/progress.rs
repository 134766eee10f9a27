//! Shared progress counters for a running sweep.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Progress tracking for a sweep.
///
/// Cloning shares the underlying counters, so one handle can live with the
/// workers while another is polled by a reporter. There is no cancellation
/// flag: once dispatched, in-flight external processes cannot be aborted and
/// the sweep runs to completion of all submitted tasks.
#[derive(Debug, Clone)]
pub struct SweepProgress {
    /// Completed trials counter
    completed: Arc<AtomicUsize>,
    /// Total trials
    total: Arc<AtomicUsize>,
}

impl SweepProgress {
    /// Create a new progress tracker
    #[must_use]
    pub fn new(total: usize) -> Self {
        Self {
            completed: Arc::new(AtomicUsize::new(0)),
            total: Arc::new(AtomicUsize::new(total)),
        }
    }

    /// Get the number of completed trials
    #[must_use]
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::Relaxed)
    }

    /// Get the total number of trials
    #[must_use]
    pub fn total(&self) -> usize {
        self.total.load(Ordering::Relaxed)
    }

    /// Completed fraction in `0.0..=1.0`, zero while the total is unknown
    #[must_use]
    pub fn fraction(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        self.completed() as f64 / total as f64
    }

    /// Check whether every trial has reported
    #[must_use]
    pub fn is_done(&self) -> bool {
        let total = self.total();
        total > 0 && self.completed() >= total
    }

    /// Increment the completed counter
    pub fn increment(&self) {
        self.completed.fetch_add(1, Ordering::Relaxed);
    }

    /// Reset for a new sweep
    pub fn reset(&self, total: usize) {
        self.completed.store(0, Ordering::Relaxed);
        self.total.store(total, Ordering::Relaxed);
    }
}

impl Default for SweepProgress {
    fn default() -> Self {
        Self::new(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_counts_and_fraction() {
        let progress = SweepProgress::new(4);
        assert_eq!(progress.completed(), 0);
        assert!(!progress.is_done());
        progress.increment();
        progress.increment();
        assert_eq!(progress.completed(), 2);
        assert!((progress.fraction() - 0.5).abs() < f64::EPSILON);
        progress.increment();
        progress.increment();
        assert!(progress.is_done());
        progress.reset(10);
        assert_eq!(progress.completed(), 0);
        assert_eq!(progress.total(), 10);
    }

    #[test]
    fn test_clones_share_counters() {
        let progress = SweepProgress::new(2);
        let worker_handle = progress.clone();
        worker_handle.increment();
        assert_eq!(progress.completed(), 1);
    }
}
