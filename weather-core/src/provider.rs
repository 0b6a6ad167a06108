use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    error::FetchError,
    model::{Location, WeatherReading},
};

pub mod openweather;

pub use openweather::OpenWeatherProvider;

/// Source of current conditions for a location.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn fetch(&self, location: &Location) -> Result<WeatherReading, FetchError>;
}
