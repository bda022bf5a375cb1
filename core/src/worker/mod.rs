//! Worker tasks for the write and read paths
//!
//! Two task shapes share the queue and the aggregator for the run's
//! duration: one [`WriteDispatcher`] producing work items and `read_ratio`
//! [`ReadConsumer`]s draining them. Neither waits on the other's individual
//! iterations; the only coordination points are the bounded queue and the
//! shared wall-clock deadline, re-checked at the top of every loop.
//!
//! There is no mid-operation cancellation: a retried call that starts just
//! before the deadline runs its full attempt budget before the task observes
//! the deadline and exits. The overrun is bounded by one call's retries.

mod consumer;
mod dispatcher;

pub use consumer::ReadConsumer;
pub use dispatcher::WriteDispatcher;

use std::time::Duration;

/// Sleep between deadline re-checks when a consumer finds the queue empty,
/// and between dry-run dispatcher iterations.
pub const POLL_INTERVAL: Duration = Duration::from_millis(5);
