//! Pre-flight health checks against the target services

use std::time::Duration;

use anyhow::{ensure, Context, Result};

const HEALTH_TIMEOUT: Duration = Duration::from_secs(3);

/// Probe `{base_url}/health/alive` and fail fast when the service is not
/// reachable, before any worker starts.
pub async fn check_alive(service: &str, base_url: &str) -> Result<()> {
    let client = reqwest::Client::builder()
        .timeout(HEALTH_TIMEOUT)
        .build()
        .context("failed to build health check client")?;

    let url = format!("{base_url}/health/alive");
    let response = client
        .get(&url)
        .send()
        .await
        .with_context(|| format!("unable to reach {service} at {url}"))?;

    ensure!(
        response.status().is_success(),
        "{service} at {url} is not ready (status {})",
        response.status()
    );

    tracing::debug!(service, %url, "health check passed");
    Ok(())
}
