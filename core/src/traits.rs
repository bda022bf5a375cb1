//! Core traits for target adapters and metrics sinks
//!
//! These traits are defined in core so the engine stays ignorant of any
//! specific protocol. Implementations live in their respective crates.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Target Adapter Trait
// ============================================================================

/// External capability performing one protocol's write and read/check calls.
///
/// Implementations own every wire detail: endpoints, payload shapes, typed
/// response decoding, and the generation of fresh write inputs per call.
/// The engine only sees the opaque [`TargetAdapter::Item`] carried from a
/// successful write to its paired reads.
#[async_trait]
pub trait TargetAdapter: Send + Sync + 'static {
    /// The payload produced by a successful write, carrying whatever the
    /// paired read/check needs. Cloned once per queued read descriptor.
    type Item: Clone + Send + Sync + 'static;

    /// Protocol identifier (e.g., "hydra", "kratos", "keto").
    fn name(&self) -> &'static str;

    /// One-time out-of-band provisioning before any write (e.g., registering
    /// an OAuth2 client). Invoked once by the controller; a failure here is
    /// fatal and aborts the run before any worker starts.
    async fn setup(&self) -> Result<(), TargetError> {
        Ok(())
    }

    /// Perform one write-class operation and return the data the paired
    /// read needs. Inputs must be unique per invocation.
    async fn write(&self) -> Result<Self::Item, TargetError>;

    /// Perform one read/check-class operation.
    ///
    /// `Ok(true)` means the checked condition holds, `Ok(false)` is a
    /// definitive negative, and `Err(_)` means the call itself failed.
    /// Where the line between negative and failed falls is adapter-defined.
    async fn read(&self, item: &Self::Item) -> Result<bool, TargetError>;
}

/// Errors returned by target adapter operations.
#[derive(Debug, Error)]
pub enum TargetError {
    /// The call itself failed (connection refused, timeout, ...).
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The transport succeeded but the status did not match the expected
    /// success condition for the operation.
    #[error("unexpected status {status}: {body}")]
    UnexpectedStatus {
        /// HTTP status code received.
        status: u16,
        /// Response body, for the log line.
        body: String,
    },

    /// The response body could not be decoded into its typed shape.
    #[error("invalid response: {0}")]
    Decode(String),
}

impl TargetError {
    /// Wrap a transport-level error.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        TargetError::Transport(Box::new(err))
    }
}

// ============================================================================
// Outcome Classification
// ============================================================================

/// Classified result of one read/check operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The checked condition holds (token active, permission allowed, ...).
    Positive,
    /// Definitive negative result with no call error.
    Negative,
    /// The call failed after retries were exhausted.
    Failed,
}

impl Outcome {
    /// Label used by metrics sinks.
    pub fn as_label(&self) -> &'static str {
        match self {
            Outcome::Positive => "positive",
            Outcome::Negative => "negative",
            Outcome::Failed => "failed",
        }
    }
}

// ============================================================================
// Metrics Sink
// ============================================================================

/// Receiver of classified read outcomes, notified as they happen so external
/// observers see live counts rather than only the end-of-run snapshot.
///
/// Implementations must be cheap and infallible from the caller's point of
/// view; the engine fires and forgets.
pub trait MetricsSink: Send + Sync {
    /// Record one classified read outcome for the given protocol.
    fn observe(&self, protocol: &str, outcome: Outcome);
}

/// Sink that discards every observation. Used in tests and dry runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl MetricsSink for NoopSink {
    fn observe(&self, _protocol: &str, _outcome: Outcome) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_labels() {
        assert_eq!(Outcome::Positive.as_label(), "positive");
        assert_eq!(Outcome::Negative.as_label(), "negative");
        assert_eq!(Outcome::Failed.as_label(), "failed");
    }

    #[test]
    fn test_outcome_snake_case_serialization() {
        assert_eq!(
            serde_json::to_string(&Outcome::Positive).unwrap(),
            "\"positive\""
        );
        let parsed: Outcome = serde_json::from_str("\"failed\"").unwrap();
        assert_eq!(parsed, Outcome::Failed);
    }

    #[test]
    fn test_target_error_display() {
        let err = TargetError::UnexpectedStatus {
            status: 503,
            body: "unavailable".into(),
        };
        assert_eq!(err.to_string(), "unexpected status 503: unavailable");

        let err = TargetError::Decode("missing field `active`".into());
        assert!(err.to_string().contains("invalid response"));
    }
}
