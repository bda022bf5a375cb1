//! Controller execution logic

use std::sync::Arc;

use tokio::time::Instant;

use crate::config::WorkloadConfig;
use crate::error::{EngineError, EngineResult};
use crate::metrics::MetricsAggregator;
use crate::queue::WorkQueue;
use crate::retry::RetryPolicy;
use crate::traits::{MetricsSink, TargetAdapter};
use crate::worker::{ReadConsumer, WriteDispatcher};

use super::summary::RunSummary;

/// Runs one workload against one target adapter.
///
/// Worker layout is fixed: one write task and `read_ratio` read tasks.
/// The controller itself retries nothing; the only fatal failure point is
/// the adapter's one-time setup step, surfaced before any worker starts.
pub struct Controller {
    config: WorkloadConfig,
    retry: RetryPolicy,
    queue_capacity: usize,
}

impl Controller {
    /// Create a controller for a validated configuration.
    pub fn new(config: WorkloadConfig) -> EngineResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            retry: RetryPolicy::default(),
            queue_capacity: WorkQueue::<()>::DEFAULT_CAPACITY,
        })
    }

    /// Override the shared retry policy.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Override the work queue capacity.
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// The configuration this controller runs.
    pub fn config(&self) -> &WorkloadConfig {
        &self.config
    }

    /// Run the workload to completion and return its summary.
    pub async fn run<A: TargetAdapter>(
        &self,
        adapter: Arc<A>,
        sink: Arc<dyn MetricsSink>,
    ) -> EngineResult<RunSummary> {
        if !self.config.dry_run {
            adapter.setup().await.map_err(EngineError::Setup)?;
        }

        let deadline = Instant::now() + self.config.duration;
        let queue = Arc::new(WorkQueue::new(self.queue_capacity));
        let metrics = Arc::new(MetricsAggregator::new(adapter.name(), sink));
        let workers = self.config.read_ratio + 1;

        tracing::info!(
            protocol = adapter.name(),
            duration_secs = self.config.duration.as_secs_f64(),
            workers,
            read_ratio = self.config.read_ratio,
            dry_run = self.config.dry_run,
            "starting workload"
        );

        let start = Instant::now();
        let mut handles = Vec::with_capacity(workers);

        handles.push(tokio::spawn(
            WriteDispatcher::new(
                Arc::clone(&adapter),
                Arc::clone(&queue),
                Arc::clone(&metrics),
                self.retry,
                self.config.read_ratio,
                deadline,
                self.config.dry_run,
            )
            .run(),
        ));

        for id in 0..self.config.read_ratio {
            handles.push(tokio::spawn(
                ReadConsumer::new(
                    id,
                    Arc::clone(&adapter),
                    Arc::clone(&queue),
                    Arc::clone(&metrics),
                    self.retry,
                    deadline,
                )
                .run(),
            ));
        }

        for (idx, handle) in handles.into_iter().enumerate() {
            if let Err(err) = handle.await {
                tracing::error!(worker = idx, error = %err, "worker task panicked");
            }
        }

        let elapsed = start.elapsed();
        let abandoned = queue.len();
        let summary = RunSummary {
            protocol: adapter.name(),
            duration: elapsed,
            workers,
            read_ratio: self.config.read_ratio,
            dry_run: self.config.dry_run,
            metrics: metrics.snapshot(),
        };

        tracing::info!(
            protocol = adapter.name(),
            elapsed_secs = elapsed.as_secs_f64(),
            writes_ok = summary.metrics.writes_ok,
            reads_total = summary.metrics.reads_total(),
            abandoned,
            "workload complete"
        );

        Ok(summary)
    }
}
