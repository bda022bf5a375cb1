//! Prometheus metrics sink and its exposition endpoint

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

use ory_bench_core::{MetricsSink, Outcome};

/// Metrics sink backed by per-protocol Prometheus counters.
///
/// One `IntCounterVec` per registered protocol, labeled by classified
/// result. Observations for protocols outside the configured scope are
/// dropped silently; the engine fires and forgets.
pub struct PrometheusSink {
    registry: Registry,
    counters: HashMap<&'static str, IntCounterVec>,
}

fn metric_for(protocol: &str) -> (String, String) {
    match protocol {
        "hydra" => (
            "token_check_total".into(),
            "Total oauth token checks run".into(),
        ),
        "kratos" => (
            "identity_check_total".into(),
            "Total identity checks run".into(),
        ),
        "keto" => (
            "permission_check_total".into(),
            "Total permission checks run".into(),
        ),
        other => (
            format!("{other}_check_total"),
            format!("Total {other} checks run"),
        ),
    }
}

impl PrometheusSink {
    /// Create a sink with counters registered for the given protocols.
    pub fn new<I>(protocols: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'static str>,
    {
        let registry = Registry::new();
        let mut counters = HashMap::new();

        for protocol in protocols {
            let (name, help) = metric_for(protocol);
            let counter = IntCounterVec::new(Opts::new(name, help), &["result"])
                .context("failed to create counter")?;
            registry
                .register(Box::new(counter.clone()))
                .with_context(|| format!("failed to register {protocol} counter"))?;
            counters.insert(protocol, counter);
        }

        Ok(Self { registry, counters })
    }

    /// Render the registry in the Prometheus text exposition format.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

impl MetricsSink for PrometheusSink {
    fn observe(&self, protocol: &str, outcome: Outcome) {
        if let Some(counter) = self.counters.get(protocol) {
            counter.with_label_values(&[outcome.as_label()]).inc();
        }
    }
}

/// Build the exposition router: `/metrics` and `/healthz`.
pub fn router(sink: Arc<PrometheusSink>) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .route("/healthz", get(healthz))
        .with_state(sink)
}

async fn metrics_handler(State(sink): State<Arc<PrometheusSink>>) -> Response {
    match sink.render() {
        Ok(body) => (StatusCode::OK, body).into_response(),
        Err(err) => {
            tracing::error!(error = %err, "failed to encode metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn healthz() -> &'static str {
    "ok"
}

/// Bind and serve the exposition endpoint until the process exits.
pub async fn serve(sink: Arc<PrometheusSink>, addr: SocketAddr) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind metrics endpoint on {addr}"))?;
    tracing::info!(%addr, "metrics endpoint listening");
    axum::serve(listener, router(sink))
        .await
        .context("metrics server failed")?;
    Ok(())
}
