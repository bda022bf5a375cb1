//! Concurrency-safe outcome counters

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::traits::{MetricsSink, Outcome};

/// Shared counters mutated by the write dispatcher and every read consumer.
///
/// The write counters are only touched by the single dispatcher task; the
/// read counters race across `read_ratio` consumers, so all of them are
/// atomics. Each classified read is also forwarded to the external sink as
/// it happens, keeping scraped counts live during the run.
pub struct MetricsAggregator {
    protocol: &'static str,
    sink: Arc<dyn MetricsSink>,
    writes_ok: AtomicU64,
    writes_failed: AtomicU64,
    reads_positive: AtomicU64,
    reads_negative: AtomicU64,
    reads_failed: AtomicU64,
}

impl MetricsAggregator {
    /// Create an aggregator for one protocol, forwarding to `sink`.
    pub fn new(protocol: &'static str, sink: Arc<dyn MetricsSink>) -> Self {
        Self {
            protocol,
            sink,
            writes_ok: AtomicU64::new(0),
            writes_failed: AtomicU64::new(0),
            reads_positive: AtomicU64::new(0),
            reads_negative: AtomicU64::new(0),
            reads_failed: AtomicU64::new(0),
        }
    }

    /// Protocol this aggregator counts for.
    pub fn protocol(&self) -> &'static str {
        self.protocol
    }

    /// Record one successful write.
    pub fn record_write_ok(&self) {
        self.writes_ok.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one write that failed after retries were exhausted.
    pub fn record_write_failed(&self) {
        self.writes_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one classified read outcome and forward it to the sink.
    pub fn record_read(&self, outcome: Outcome) {
        let counter = match outcome {
            Outcome::Positive => &self.reads_positive,
            Outcome::Negative => &self.reads_negative,
            Outcome::Failed => &self.reads_failed,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        self.sink.observe(self.protocol, outcome);
    }

    /// Read all counters into an owned snapshot.
    pub fn snapshot(&self) -> RunMetrics {
        RunMetrics {
            writes_ok: self.writes_ok.load(Ordering::Relaxed),
            writes_failed: self.writes_failed.load(Ordering::Relaxed),
            reads_positive: self.reads_positive.load(Ordering::Relaxed),
            reads_negative: self.reads_negative.load(Ordering::Relaxed),
            reads_failed: self.reads_failed.load(Ordering::Relaxed),
        }
    }
}

impl std::fmt::Debug for MetricsAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricsAggregator")
            .field("protocol", &self.protocol)
            .field("snapshot", &self.snapshot())
            .finish()
    }
}

/// Counter totals for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunMetrics {
    /// Writes that succeeded (and fanned out read descriptors).
    pub writes_ok: u64,
    /// Writes that failed after retries were exhausted.
    pub writes_failed: u64,
    /// Reads whose checked condition held.
    pub reads_positive: u64,
    /// Reads with a definitive negative result.
    pub reads_negative: u64,
    /// Reads whose call failed after retries were exhausted.
    pub reads_failed: u64,
}

impl RunMetrics {
    /// Total reads performed, equal to the number of items dequeued.
    pub fn reads_total(&self) -> u64 {
        self.reads_positive + self.reads_negative + self.reads_failed
    }

    /// Total write attempts that ran to completion, either way.
    pub fn writes_total(&self) -> u64 {
        self.writes_ok + self.writes_failed
    }
}
