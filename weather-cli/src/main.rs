//! Binary crate for the `weather-etl` job.
//!
//! This crate focuses on:
//! - Parsing the (optional) command-line flags
//! - Installing the log subscriber
//! - Reporting a fatal error to the scheduler through the exit status

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cmd = cli::Cli::parse();
    cmd.run().await
}
