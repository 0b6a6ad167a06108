//! Error taxonomy for a batch run.
//!
//! Only [`EtlError`] is fatal. [`FetchError`] and [`StoreError`] are scoped to
//! one location and end up in the run report as a [`LocationError`].

use reqwest::StatusCode;
use thiserror::Error;

/// Required process configuration is absent or malformed.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),

    #[error("Invalid value for {var}: {reason}")]
    Invalid {
        var: &'static str,
        reason: String,
    },
}

/// The database connection could not be opened, committed or closed.
#[derive(Debug, Error)]
#[error("Database connection error: {0}")]
pub struct ConnectionError(#[from] pub sqlx::Error);

/// The provider answered, but not with the shape a reading is built from.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Response body is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Response has no `{field}`{}", provider_message(.message))]
    MissingField {
        field: &'static str,
        message: Option<String>,
    },
}

fn provider_message(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|m| format!(" (provider said: {m})"))
        .unwrap_or_default()
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request to weather provider failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Weather provider returned status {status}: {body}")]
    Status {
        status: StatusCode,
        body: String,
    },

    #[error(transparent)]
    Parse(#[from] ParseError),
}

#[derive(Debug, Error)]
#[error("Failed to insert weather row: {0}")]
pub struct StoreError(#[from] pub sqlx::Error);

/// Why a single location produced no row in this run.
#[derive(Debug, Error)]
pub enum LocationError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors that abort the whole run.
#[derive(Debug, Error)]
pub enum EtlError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to load location registry from {path}: {reason}")]
    Registry {
        path: String,
        reason: String,
    },

    #[error(transparent)]
    Connection(#[from] ConnectionError),
}
