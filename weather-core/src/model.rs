use chrono::NaiveDate;
use serde::Deserialize;

/// A named point on the map, used as the query key for the provider.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Location {
    pub name: String,
    #[serde(rename = "lat")]
    pub latitude: f64,
    #[serde(rename = "lon")]
    pub longitude: f64,
}

impl Location {
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.into(),
            latitude,
            longitude,
        }
    }
}

/// Current conditions for one location, stamped with the UTC day it was fetched on.
///
/// Maps 1:1 onto a row of the `weather` table.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReading {
    pub city: String,
    pub temperature_c: f64,
    pub humidity_pct: i32,
    pub description: String,
    pub observed_date: NaiveDate,
}
