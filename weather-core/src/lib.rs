//! Core library for the `weather-etl` job.
//!
//! This crate defines:
//! - Configuration read once from the environment
//! - The registry of locations to observe
//! - Abstraction over the weather provider, with the OpenWeather implementation
//! - Persistence of readings into Postgres
//! - The batch runner tying them together
//!
//! It is used by `weather-etl`, but the runner is generic over provider and
//! database so it can be driven from anywhere.

pub mod batch;
pub mod config;
pub mod error;
pub mod location;
pub mod model;
pub mod provider;
pub mod store;

pub use batch::{BatchReport, LocationFailure, run_batch};
pub use config::{Config, DatabaseConfig, ProviderConfig};
pub use error::{
    ConfigError, ConnectionError, EtlError, FetchError, LocationError, ParseError, StoreError,
};
pub use location::LocationRegistry;
pub use model::{Location, WeatherReading};
pub use provider::{OpenWeatherProvider, WeatherProvider};
pub use store::{PgDatabase, PgWeatherStore, WeatherDatabase, WeatherStore};
