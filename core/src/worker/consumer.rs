//! Read/check consumer tasks

use std::sync::Arc;

use tokio::time::Instant;

use crate::metrics::MetricsAggregator;
use crate::queue::WorkQueue;
use crate::retry::RetryPolicy;
use crate::traits::{Outcome, TargetAdapter};

use super::POLL_INTERVAL;

/// One of the `read_ratio` read tasks draining the queue.
///
/// The consumer polls with [`WorkQueue::try_pop`] rather than blocking on
/// the queue: an empty queue costs a [`POLL_INTERVAL`] sleep, and the
/// deadline is re-evaluated at least that often, so the task exits promptly
/// once the queue stays empty past the deadline. Items that are still
/// queued when the deadline passes are abandoned, not counted.
pub struct ReadConsumer<A: TargetAdapter> {
    id: usize,
    adapter: Arc<A>,
    queue: Arc<WorkQueue<A::Item>>,
    metrics: Arc<MetricsAggregator>,
    retry: RetryPolicy,
    deadline: Instant,
}

impl<A: TargetAdapter> ReadConsumer<A> {
    /// Create one consumer for the run.
    pub fn new(
        id: usize,
        adapter: Arc<A>,
        queue: Arc<WorkQueue<A::Item>>,
        metrics: Arc<MetricsAggregator>,
        retry: RetryPolicy,
        deadline: Instant,
    ) -> Self {
        Self {
            id,
            adapter,
            queue,
            metrics,
            retry,
            deadline,
        }
    }

    /// Loop until the deadline, dequeuing and classifying reads.
    pub async fn run(self) {
        tracing::debug!(consumer_id = self.id, "read consumer started");

        while Instant::now() < self.deadline {
            let Some(item) = self.queue.try_pop() else {
                tokio::time::sleep(POLL_INTERVAL).await;
                continue;
            };

            // The item dies here: whatever the outcome, it is counted once
            // and never re-enqueued. Only the call itself is retried.
            let outcome = match self.retry.run(|| self.adapter.read(&item)).await {
                Ok(true) => Outcome::Positive,
                Ok(false) => Outcome::Negative,
                Err(err) => {
                    tracing::warn!(
                        consumer_id = self.id,
                        protocol = self.adapter.name(),
                        error = %err,
                        "read failed after retries"
                    );
                    Outcome::Failed
                }
            };
            self.metrics.record_read(outcome);
        }

        tracing::debug!(consumer_id = self.id, "read consumer finished");
    }
}
