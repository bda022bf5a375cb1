//! CLI argument parsing and command handling

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, ValueEnum};

use ory_bench_core::{Controller, MetricsSink, RunSummary, TargetAdapter, WorkloadConfig};
use ory_bench_targets::{HydraAdapter, KetoAdapter, KratosAdapter};

use crate::config::AppConfig;
use crate::health;
use crate::sink::{self, PrometheusSink};

/// ory-bench - workload simulator for the Ory identity stack
#[derive(Parser, Debug)]
#[command(name = "ory-bench")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Protocol scope to exercise; "all" runs every protocol sequentially
    #[arg(long, value_enum, default_value = "all")]
    pub scope: Scope,

    /// Override the configured run duration, in seconds
    #[arg(long = "duration-sec")]
    pub duration_sec: Option<u64>,

    /// Override the configured read/write ratio (e.g. 100 = 100:1)
    #[arg(long = "read-ratio")]
    pub read_ratio: Option<usize>,

    /// Simulate the workload without touching the targets
    #[arg(long)]
    pub dry_run: bool,

    /// Path to the workload config file
    #[arg(long = "workload-config", default_value = "config/config.yaml")]
    pub workload_config: PathBuf,

    /// Keep the metrics endpoint alive after the run completes
    #[arg(long)]
    pub serve_metrics: bool,

    /// Bind address of the metrics endpoint
    #[arg(long, default_value = "0.0.0.0:2112")]
    pub metrics_addr: SocketAddr,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Which protocols a run covers.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Ory Hydra only
    Hydra,
    /// Ory Kratos only
    Kratos,
    /// Ory Keto only
    Keto,
    /// Every protocol, run sequentially
    All,
}

#[derive(Debug, Clone, Copy)]
enum Protocol {
    Hydra,
    Kratos,
    Keto,
}

impl Protocol {
    fn name(self) -> &'static str {
        match self {
            Protocol::Hydra => "hydra",
            Protocol::Kratos => "kratos",
            Protocol::Keto => "keto",
        }
    }
}

impl Scope {
    fn protocols(self) -> &'static [Protocol] {
        match self {
            Scope::Hydra => &[Protocol::Hydra],
            Scope::Kratos => &[Protocol::Kratos],
            Scope::Keto => &[Protocol::Keto],
            Scope::All => &[Protocol::Hydra, Protocol::Kratos, Protocol::Keto],
        }
    }
}

impl Cli {
    /// Run the selected workloads based on CLI arguments.
    pub async fn run(&self) -> Result<()> {
        let app = AppConfig::load(&self.workload_config)?;
        let workload = app.workload(self.duration_sec, self.read_ratio, self.dry_run);
        let protocols = self.scope.protocols();

        tracing::info!(
            scope = ?self.scope,
            duration_secs = workload.duration.as_secs(),
            read_ratio = workload.read_ratio,
            dry_run = workload.dry_run,
            "starting ory-bench"
        );

        // The exposition endpoint runs from the start so scrapers see live
        // counts during the run, not just the final totals.
        let sink = Arc::new(PrometheusSink::new(
            protocols.iter().map(|protocol| protocol.name()),
        )?);
        let server = {
            let sink = Arc::clone(&sink);
            let addr = self.metrics_addr;
            tokio::spawn(async move {
                if let Err(err) = sink::serve(sink, addr).await {
                    tracing::error!(error = %err, "metrics endpoint failed");
                }
            })
        };

        for protocol in protocols {
            let summary = self.run_protocol(*protocol, &app, &workload, &sink).await?;
            println!("{summary}");
        }

        if self.serve_metrics {
            println!(
                "Metrics available at http://{}/metrics, waiting for scrapes. Ctrl+C to exit.",
                self.metrics_addr
            );
            tokio::signal::ctrl_c().await?;
        }
        server.abort();

        Ok(())
    }

    async fn run_protocol(
        &self,
        protocol: Protocol,
        app: &AppConfig,
        workload: &WorkloadConfig,
        sink: &Arc<PrometheusSink>,
    ) -> Result<RunSummary> {
        match protocol {
            Protocol::Hydra => {
                let (admin, public) = app.hydra_endpoints(self.dry_run)?;
                if !self.dry_run {
                    health::check_alive("hydra", &admin).await?;
                }
                run_one(HydraAdapter::new(admin, public)?, workload, sink).await
            }
            Protocol::Kratos => {
                let (admin, public) = app.kratos_endpoints(self.dry_run)?;
                if !self.dry_run {
                    health::check_alive("kratos", &admin).await?;
                }
                run_one(KratosAdapter::new(admin, public)?, workload, sink).await
            }
            Protocol::Keto => {
                let (write, read) = app.keto_endpoints(self.dry_run)?;
                if !self.dry_run {
                    health::check_alive("keto", &read).await?;
                }
                run_one(KetoAdapter::new(write, read)?, workload, sink).await
            }
        }
    }
}

async fn run_one<A: TargetAdapter>(
    adapter: A,
    workload: &WorkloadConfig,
    sink: &Arc<PrometheusSink>,
) -> Result<RunSummary> {
    let controller = Controller::new(workload.clone())?;
    let sink: Arc<dyn MetricsSink> = sink.clone();
    let summary = controller.run(Arc::new(adapter), sink).await?;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["ory-bench"]).unwrap();
        assert_eq!(cli.scope, Scope::All);
        assert!(cli.duration_sec.is_none());
        assert!(cli.read_ratio.is_none());
        assert!(!cli.dry_run);
        assert!(!cli.serve_metrics);
        assert_eq!(cli.workload_config, PathBuf::from("config/config.yaml"));
        assert_eq!(cli.metrics_addr.port(), 2112);
    }

    #[test]
    fn test_flag_parsing() {
        let cli = Cli::try_parse_from([
            "ory-bench",
            "--scope",
            "keto",
            "--duration-sec",
            "30",
            "--read-ratio",
            "50",
            "--dry-run",
            "--serve-metrics",
            "--workload-config",
            "custom.yaml",
        ])
        .unwrap();

        assert_eq!(cli.scope, Scope::Keto);
        assert_eq!(cli.duration_sec, Some(30));
        assert_eq!(cli.read_ratio, Some(50));
        assert!(cli.dry_run);
        assert!(cli.serve_metrics);
        assert_eq!(cli.workload_config, PathBuf::from("custom.yaml"));
    }

    #[test]
    fn test_invalid_scope_rejected() {
        assert!(Cli::try_parse_from(["ory-bench", "--scope", "ldap"]).is_err());
    }

    #[test]
    fn test_scope_protocol_sets() {
        assert_eq!(Scope::Hydra.protocols().len(), 1);
        assert_eq!(Scope::All.protocols().len(), 3);
        assert_eq!(Scope::All.protocols()[0].name(), "hydra");
        assert_eq!(Scope::Kratos.protocols()[0].name(), "kratos");
    }
}
