//! ory-bench-cli: flag parsing, configuration, and the metrics endpoint
//!
//! Everything outside the core engine lives here: the clap surface, the
//! YAML workload configuration with its CLI overrides, pre-flight health
//! checks against each in-scope service, and the Prometheus sink with its
//! axum exposition endpoint.

pub mod cli;
pub mod config;
pub mod health;
pub mod sink;
