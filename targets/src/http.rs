//! Shared HTTP plumbing for the Ory adapters

use std::time::Duration;

use reqwest::{Response, StatusCode};

use ory_bench_core::TargetError;

/// Per-request timeout applied to every adapter call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Build the reqwest client all adapters share the configuration of.
pub(crate) fn build_client() -> Result<reqwest::Client, TargetError> {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(TargetError::transport)
}

/// Map a transport-level reqwest failure into the adapter error space.
pub(crate) fn transport(err: reqwest::Error) -> TargetError {
    TargetError::transport(err)
}

/// Require an exact status; anything else becomes `UnexpectedStatus` with
/// the response body captured for the log line.
pub(crate) async fn expect_status(
    response: Response,
    expected: StatusCode,
) -> Result<Response, TargetError> {
    if response.status() == expected {
        return Ok(response);
    }
    unexpected(response).await
}

/// Require any 2xx status.
pub(crate) async fn expect_success(response: Response) -> Result<Response, TargetError> {
    if response.status().is_success() {
        return Ok(response);
    }
    unexpected(response).await
}

async fn unexpected(response: Response) -> Result<Response, TargetError> {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    Err(TargetError::UnexpectedStatus { status, body })
}

/// Decode a JSON body into its typed shape.
pub(crate) async fn decode<T: serde::de::DeserializeOwned>(
    response: Response,
) -> Result<T, TargetError> {
    response
        .json::<T>()
        .await
        .map_err(|err| TargetError::Decode(err.to_string()))
}
