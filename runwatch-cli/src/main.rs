//! runwatch -- job run log matcher.
//!
//! Reads a job event log, pairs every STARTED event with its FINISHED event,
//! and records the run duration and alert flag in the `Alert` table.

mod cli;
mod error;
mod logging;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use runwatch_core::config::{CONFIG_PATH_ENV, DEFAULT_CONFIG_PATH, RunwatchConfig};
use runwatch_matcher::{JobRunBuilder, RunConfig, RunSummary, SqliteAlertSink};

use crate::cli::Cli;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(summary) => {
            tracing::debug!(?summary, "runwatch finished");
        }
        Err(e) => {
            tracing::error!(error = %e, exit_code = e.exit_code(), "runwatch failed");
            eprintln!("error: {}", e);
            std::process::exit(e.exit_code());
        }
    }
}

/// Resolve the configuration file path from the environment.
fn config_path() -> PathBuf {
    std::env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

async fn run(cli: Cli) -> Result<RunSummary, CliError> {
    let path = config_path();
    let config = RunwatchConfig::load_or_default(&path)
        .await
        .map_err(CliError::config)?;

    logging::init_tracing(&config.general)?;
    runwatch_core::metrics::describe_all();
    tracing::info!(
        config = %path.display(),
        input = %cli.input.display(),
        database = %config.storage.database_path,
        "runwatch starting"
    );

    let sink = SqliteAlertSink::open(&config.storage.database_path).map_err(CliError::sink)?;

    let job_run = JobRunBuilder::new()
        .config(RunConfig::from_core(&config))
        .sink(Arc::new(sink))
        .build()?;

    let summary = job_run.run(&cli.input).await?;
    Ok(summary)
}
