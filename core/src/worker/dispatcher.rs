//! The single write-producing task

use std::sync::Arc;

use tokio::time::Instant;

use crate::metrics::MetricsAggregator;
use crate::queue::WorkQueue;
use crate::retry::RetryPolicy;
use crate::traits::TargetAdapter;

use super::POLL_INTERVAL;

/// The write path: one task performing write operations and fanning each
/// success out into `read_ratio` queued read descriptors.
///
/// The write path is intentionally single-task: it keeps write identity
/// generation simple and avoids write-side contention on the external
/// system. Fan-out pushes apply the queue's backpressure to the write rate,
/// throttling writes whenever reads cannot keep up.
pub struct WriteDispatcher<A: TargetAdapter> {
    adapter: Arc<A>,
    queue: Arc<WorkQueue<A::Item>>,
    metrics: Arc<MetricsAggregator>,
    retry: RetryPolicy,
    read_ratio: usize,
    deadline: Instant,
    dry_run: bool,
}

impl<A: TargetAdapter> WriteDispatcher<A> {
    /// Create the dispatcher for one run.
    pub fn new(
        adapter: Arc<A>,
        queue: Arc<WorkQueue<A::Item>>,
        metrics: Arc<MetricsAggregator>,
        retry: RetryPolicy,
        read_ratio: usize,
        deadline: Instant,
        dry_run: bool,
    ) -> Self {
        Self {
            adapter,
            queue,
            metrics,
            retry,
            read_ratio,
            deadline,
            dry_run,
        }
    }

    /// Loop until the deadline, writing and fanning out.
    pub async fn run(self) {
        tracing::debug!(protocol = self.adapter.name(), "write dispatcher started");

        while Instant::now() < self.deadline {
            if self.dry_run {
                // Keep the timing structure without touching the target.
                tokio::time::sleep(POLL_INTERVAL).await;
                continue;
            }

            match self.retry.run(|| self.adapter.write()).await {
                Ok(item) => {
                    self.metrics.record_write_ok();
                    if !self.fan_out(item).await {
                        break;
                    }
                }
                Err(err) => {
                    self.metrics.record_write_failed();
                    tracing::warn!(
                        protocol = self.adapter.name(),
                        error = %err,
                        "write failed after retries"
                    );
                }
            }
        }

        tracing::debug!(protocol = self.adapter.name(), "write dispatcher finished");
    }

    /// Push `read_ratio` replicas of one item. Returns `false` when the
    /// deadline passed while the queue stayed full; the remaining replicas
    /// are abandoned. They could only ever have been abandoned in the
    /// queue, so no counted invariant is affected.
    async fn fan_out(&self, item: A::Item) -> bool {
        for pushed in 0..self.read_ratio {
            let push = self.queue.push(item.clone());
            if tokio::time::timeout_at(self.deadline, push).await.is_err() {
                tracing::debug!(
                    protocol = self.adapter.name(),
                    pushed,
                    read_ratio = self.read_ratio,
                    "deadline reached during fan-out, abandoning remaining replicas"
                );
                return false;
            }
        }
        true
    }
}
