//! Metrics hooks for engine invocations
//!
//! Lock-free counters for monitoring index volume, matching volume,
//! stage latencies and failures by kind.
//!
//! ## Usage
//!
//! ```ignore
//! use anonset_engine::metrics::EngineMetrics;
//! use std::sync::Arc;
//!
//! let metrics = Arc::new(EngineMetrics::new());
//! let service = AnonymitySetService::new(config)?.with_metrics(metrics.clone());
//! service.compute(&inputs, &outputs).await?;
//! println!("{:?}", metrics.snapshot());
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::error::ErrorKind;

/// Recording seam used by the service.
pub trait MetricsRecorder: Send + Sync {
    fn record_invocation(&self, input_count: usize, output_count: usize);
    fn record_indexing(&self, subsets: u64, duration: Duration);
    fn record_matching(&self, outputs: usize, duration: Duration);
    fn record_failure(&self, kind: ErrorKind);
}

/// Recorder that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpMetrics;

impl MetricsRecorder for NoOpMetrics {
    fn record_invocation(&self, _input_count: usize, _output_count: usize) {}
    fn record_indexing(&self, _subsets: u64, _duration: Duration) {}
    fn record_matching(&self, _outputs: usize, _duration: Duration) {}
    fn record_failure(&self, _kind: ErrorKind) {}
}

/// Metrics collector for engine invocations
#[derive(Default)]
pub struct EngineMetrics {
    /// Total invocations started
    pub invocations: AtomicU64,
    /// Total subsets represented in half indexes, enumerated or counted
    pub subsets_indexed: AtomicU64,
    /// Total outputs matched
    pub outputs_matched: AtomicU64,
    /// Cumulative index build time in nanoseconds
    pub indexing_time_ns: AtomicU64,
    /// Cumulative matching time in nanoseconds
    pub matching_time_ns: AtomicU64,
    pub invalid_input_failures: AtomicU64,
    pub size_limit_failures: AtomicU64,
    pub overflow_failures: AtomicU64,
    pub execution_failures: AtomicU64,
    pub config_failures: AtomicU64,
}

impl EngineMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            invocations: self.invocations.load(Ordering::Relaxed),
            subsets_indexed: self.subsets_indexed.load(Ordering::Relaxed),
            outputs_matched: self.outputs_matched.load(Ordering::Relaxed),
            indexing_time_ns: self.indexing_time_ns.load(Ordering::Relaxed),
            matching_time_ns: self.matching_time_ns.load(Ordering::Relaxed),
            failures: self.invalid_input_failures.load(Ordering::Relaxed)
                + self.size_limit_failures.load(Ordering::Relaxed)
                + self.overflow_failures.load(Ordering::Relaxed)
                + self.execution_failures.load(Ordering::Relaxed)
                + self.config_failures.load(Ordering::Relaxed),
        }
    }

    /// Failures recorded for one kind.
    pub fn failures_of(&self, kind: ErrorKind) -> u64 {
        self.counter_for(kind).load(Ordering::Relaxed)
    }

    fn counter_for(&self, kind: ErrorKind) -> &AtomicU64 {
        match kind {
            ErrorKind::InvalidInput => &self.invalid_input_failures,
            ErrorKind::SizeLimitExceeded => &self.size_limit_failures,
            ErrorKind::ArithmeticOverflow => &self.overflow_failures,
            ErrorKind::ExecutionFailure => &self.execution_failures,
            ErrorKind::InvalidConfig => &self.config_failures,
        }
    }

    /// Reset all counters
    pub fn reset(&self) {
        for counter in [
            &self.invocations,
            &self.subsets_indexed,
            &self.outputs_matched,
            &self.indexing_time_ns,
            &self.matching_time_ns,
            &self.invalid_input_failures,
            &self.size_limit_failures,
            &self.overflow_failures,
            &self.execution_failures,
            &self.config_failures,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

impl MetricsRecorder for EngineMetrics {
    fn record_invocation(&self, _input_count: usize, _output_count: usize) {
        self.invocations.fetch_add(1, Ordering::Relaxed);
    }

    fn record_indexing(&self, subsets: u64, duration: Duration) {
        self.subsets_indexed.fetch_add(subsets, Ordering::Relaxed);
        self.indexing_time_ns
            .fetch_add(duration.as_nanos() as u64, Ordering::Relaxed);
    }

    fn record_matching(&self, outputs: usize, duration: Duration) {
        self.outputs_matched
            .fetch_add(outputs as u64, Ordering::Relaxed);
        self.matching_time_ns
            .fetch_add(duration.as_nanos() as u64, Ordering::Relaxed);
    }

    fn record_failure(&self, kind: ErrorKind) {
        self.counter_for(kind).fetch_add(1, Ordering::Relaxed);
    }
}

/// Point-in-time snapshot of metrics
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub invocations: u64,
    pub subsets_indexed: u64,
    pub outputs_matched: u64,
    pub indexing_time_ns: u64,
    pub matching_time_ns: u64,
    pub failures: u64,
}
