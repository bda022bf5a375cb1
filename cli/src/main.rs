//! ory-bench CLI
//!
//! Command-line entry point for running Ory workload simulations.

use anyhow::Result;
use clap::Parser;
use ory_bench_cli::cli::Cli;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let default_filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    // Run the workload(s)
    cli.run().await
}
