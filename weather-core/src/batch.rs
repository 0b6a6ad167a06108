//! One full pass over the registry under a single transaction.

use tracing::{debug, error, info};

use crate::{
    error::{EtlError, LocationError},
    location::LocationRegistry,
    model::Location,
    provider::WeatherProvider,
    store::{WeatherDatabase, WeatherStore},
};

/// A location that produced no row in this run.
#[derive(Debug)]
pub struct LocationFailure {
    pub city: String,
    pub error: LocationError,
}

/// Outcome of a committed run.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub attempted: usize,
    pub stored: usize,
    pub failures: Vec<LocationFailure>,
}

impl BatchReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Fetch and store every location, then commit once.
///
/// A fetch or insert failure is logged and recorded against its location; the
/// loop moves on. Only opening or committing the connection can fail the run.
pub async fn run_batch<P, D>(
    registry: &LocationRegistry,
    provider: &P,
    database: &D,
) -> Result<BatchReport, EtlError>
where
    P: WeatherProvider + ?Sized,
    D: WeatherDatabase + ?Sized,
{
    let mut store = database.open().await?;
    info!(locations = registry.len(), "starting weather run");

    let mut report = BatchReport::default();
    for location in registry {
        report.attempted += 1;

        match ingest(location, provider, &mut store).await {
            Ok(()) => {
                report.stored += 1;
                info!(city = %location.name, "inserted weather");
            }
            Err(e) => {
                error!(city = %location.name, error = %e, "skipping location");
                report.failures.push(LocationFailure {
                    city: location.name.clone(),
                    error: e,
                });
            }
        }
    }

    store.commit().await?;
    info!(
        attempted = report.attempted,
        stored = report.stored,
        failed = report.failures.len(),
        "weather run committed"
    );

    Ok(report)
}

async fn ingest<P, S>(
    location: &Location,
    provider: &P,
    store: &mut S,
) -> Result<(), LocationError>
where
    P: WeatherProvider + ?Sized,
    S: WeatherStore,
{
    let reading = provider.fetch(location).await?;
    debug!(city = %location.name, ?reading, "fetched weather");

    store.store(&reading).await?;
    Ok(())
}
