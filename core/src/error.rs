//! Error types for ory-bench-core

use thiserror::Error;

use crate::config::ConfigError;
use crate::traits::TargetError;

/// Errors that abort a workload before any worker starts.
///
/// Failures of individual writes or reads are counted, never surfaced;
/// only configuration problems and the adapter's one-time setup step are
/// fatal.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Workload configuration rejected at validation time.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The adapter's one-time setup step failed. The run is aborted with
    /// no workers started.
    #[error("target setup failed: {0}")]
    Setup(#[source] TargetError),
}

/// Result type alias for engine operations.
pub type EngineResult<T> = std::result::Result<T, EngineError>;
