use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::{
    config::ProviderConfig,
    error::{FetchError, ParseError},
    model::{Location, WeatherReading},
};

use super::WeatherProvider;

const RETRY_BASE_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    retries: u32,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self, FetchError> {
        let http = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
            retries: config.retries,
            http,
        })
    }

    async fn fetch_current(&self, location: &Location) -> Result<String, FetchError> {
        let url = format!("{}/weather", self.base_url);
        let lat = location.latitude.to_string();
        let lon = location.longitude.to_string();

        // The request URL carries the API key, so it is stripped from every transport error.
        let res = self
            .http
            .get(&url)
            .query(&[
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
            ])
            .send()
            .await
            .map_err(|e| FetchError::Network(e.without_url()))?;

        let status = res.status();
        let body = res.text().await.map_err(|e| FetchError::Network(e.without_url()))?;

        if !status.is_success() {
            return Err(FetchError::Status {
                status,
                body: truncate_body(&body),
            });
        }

        Ok(body)
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    #[tracing::instrument(
        name = "fetch_weather",
        level = "debug",
        skip(self),
        fields(city = %location.name)
    )]
    async fn fetch(&self, location: &Location) -> Result<WeatherReading, FetchError> {
        let mut attempt = 0;
        let body = loop {
            match self.fetch_current(location).await {
                Err(FetchError::Network(e)) if attempt < self.retries => {
                    let delay = RETRY_BASE_DELAY.saturating_mul(1 << attempt.min(6));
                    attempt += 1;
                    warn!(attempt, error = %e, "request failed, retrying in {delay:?}");
                    tokio::time::sleep(delay).await;
                }
                other => break other?,
            }
        };

        let reading = parse_current(&body, &location.name, Utc::now().date_naive())?;
        debug!(?reading, "parsed current weather");
        Ok(reading)
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: Option<f64>,
    humidity: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: Option<String>,
}

/// Current weather payload. Everything is optional so that error payloads
/// (`{"cod":401,"message":"..."}`) deserialize and can be reported properly.
#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    main: Option<OwMain>,
    #[serde(default)]
    weather: Vec<OwWeather>,
    message: Option<Value>,
}

/// Turn a current-weather response body into a reading for `city`.
pub fn parse_current(
    body: &str,
    city: &str,
    observed_date: NaiveDate,
) -> Result<WeatherReading, ParseError> {
    let parsed: OwCurrentResponse = serde_json::from_str(body)?;

    let message = parsed.message.map(|m| match m {
        Value::String(s) => s,
        other => other.to_string(),
    });
    let missing = |field| ParseError::MissingField {
        field,
        message: message.clone(),
    };

    let main = parsed.main.ok_or_else(|| missing("main"))?;
    let temperature_c = main.temp.ok_or_else(|| missing("main.temp"))?;
    let humidity_pct = main.humidity.ok_or_else(|| missing("main.humidity"))?;

    let description = parsed
        .weather
        .into_iter()
        .next()
        .and_then(|w| w.description)
        .ok_or_else(|| missing("weather[0].description"))?;

    Ok(WeatherReading {
        city: city.to_string(),
        temperature_c,
        humidity_pct,
        description,
        observed_date,
    })
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
