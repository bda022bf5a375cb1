//! ory-bench-core: the generic load-generation engine
//!
//! This crate provides the protocol-agnostic machinery shared by every
//! workload:
//!
//! - Core traits (TargetAdapter, MetricsSink)
//! - The bounded fan-out queue connecting the write path to the read pool
//! - A shared fixed-backoff retry policy for all external calls
//! - Concurrency-safe outcome counters and the derived run summary
//! - The controller that runs one deadline-bound workload end to end
//!
//! Protocol-specific wire handling lives in adapter crates; this crate never
//! sees raw request or response shapes.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod controller;
pub mod error;
pub mod metrics;
pub mod queue;
pub mod retry;
pub mod traits;
pub mod worker;

pub use config::{ConfigError, WorkloadConfig};
pub use controller::{Controller, RunSummary};
pub use error::{EngineError, EngineResult};
pub use metrics::{MetricsAggregator, RunMetrics};
pub use queue::WorkQueue;
pub use retry::RetryPolicy;
pub use traits::{MetricsSink, NoopSink, Outcome, TargetAdapter, TargetError};
