use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::warn;
use weather_etl_core::{Config, LocationRegistry, OpenWeatherProvider, PgDatabase, run_batch};

/// Top-level CLI struct. Running without arguments performs one batch.
#[derive(Debug, Parser)]
#[command(name = "weather-etl", version, about = "Store current weather for a list of locations")]
pub struct Cli {
    /// TOML file with `[[locations]]` entries replacing the built-in list.
    #[arg(long, global = true)]
    pub locations: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch and store weather for every location (the default).
    Run,

    /// Print the locations a run would visit and exit.
    Locations,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let registry = match &self.locations {
            Some(path) => LocationRegistry::load(path)?,
            None => LocationRegistry::default(),
        };

        match self.command.unwrap_or(Command::Run) {
            Command::Locations => {
                for location in &registry {
                    println!("{}\t{}\t{}", location.name, location.latitude, location.longitude);
                }
            }
            Command::Run => {
                let config = Config::from_env()?;
                let provider = OpenWeatherProvider::new(&config.provider)
                    .context("Failed to build HTTP client")?;
                let database = PgDatabase::new(&config.database);

                let report = run_batch(&registry, &provider, &database).await?;
                if !report.is_clean() {
                    warn!(
                        failed = report.failures.len(),
                        stored = report.stored,
                        "run completed with skipped locations"
                    );
                }
            }
        }

        Ok(())
    }
}
