//! sciobjsdb - command line client for the ScienceObjectsDB storage service
//!
//! Loads the configuration, then runs one subcommand against the service:
//! `create`, `ls`, `describe` or `upload`. Results go to stdout, logs to stderr.

use std::io;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use sciobjsdb_cli::cli::Cli;
use sciobjsdb_cli::config::Config;

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "sciobjsdb={level},sciobjsdb_cli={level}",
            level = default_level
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())
        .context("Failed to load configuration")?
        .with_endpoint_overrides(cli.host.clone(), cli.port);
    debug!(
        "Using endpoint {}:{}",
        config.endpoint.host, config.endpoint.port
    );

    let stdout = io::stdout();
    cli.command
        .run(&config, stdout.lock())
        .await
        .context("Command failed")?;

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli).await {
        error!("{:#}", err);
        process::exit(1);
    }
}
