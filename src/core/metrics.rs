//! Engine metrics for observability
//!
//! Counts records delivered to sinks and sink failures, so a caller can tell
//! whether a fan-out engine is silently losing output.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for one engine
///
/// # Example
///
/// ```
/// use rust_logger_facade::EngineMetrics;
///
/// let metrics = EngineMetrics::new();
///
/// metrics.record_written();
/// metrics.record_failed();
///
/// assert_eq!(metrics.written_count(), 1);
/// assert_eq!(metrics.failed_count(), 1);
/// ```
#[derive(Debug)]
pub struct EngineMetrics {
    /// Records every sink accepted
    written: AtomicU64,

    /// Records at least one sink rejected or panicked on
    failed: AtomicU64,
}

impl EngineMetrics {
    pub const fn new() -> Self {
        Self {
            written: AtomicU64::new(0),
            failed: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn written_count(&self) -> u64 {
        self.written.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn failed_count(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    /// Returns the previous value
    #[inline]
    pub fn record_written(&self) -> u64 {
        self.written.fetch_add(1, Ordering::Relaxed)
    }

    /// Returns the previous value
    #[inline]
    pub fn record_failed(&self) -> u64 {
        self.failed.fetch_add(1, Ordering::Relaxed)
    }

    /// Failure rate as a percentage (0.0 - 100.0)
    ///
    /// Returns 0.0 if nothing has been processed.
    pub fn failure_rate(&self) -> f64 {
        let failed = self.failed_count() as f64;
        let total = self.written_count() as f64 + failed;
        if total == 0.0 {
            0.0
        } else {
            (failed / total) * 100.0
        }
    }
}

impl Default for EngineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_new() {
        let metrics = EngineMetrics::new();
        assert_eq!(metrics.written_count(), 0);
        assert_eq!(metrics.failed_count(), 0);
    }

    #[test]
    fn test_record_returns_previous_value() {
        let metrics = EngineMetrics::new();
        assert_eq!(metrics.record_failed(), 0);
        assert_eq!(metrics.failed_count(), 1);
    }

    #[test]
    fn test_failure_rate() {
        let metrics = EngineMetrics::new();
        assert_eq!(metrics.failure_rate(), 0.0);

        for _ in 0..90 {
            metrics.record_written();
        }
        for _ in 0..10 {
            metrics.record_failed();
        }

        let rate = metrics.failure_rate();
        assert!((9.9..=10.1).contains(&rate), "Failure rate was {}", rate);
    }
}
