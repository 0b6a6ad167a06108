use std::{fmt, time::Duration};

use sqlx::postgres::PgConnectOptions;

use crate::error::ConfigError;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";
pub const DEFAULT_DB_HOST: &str = "postgres";
pub const DEFAULT_DB_PORT: u16 = 5432;
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings for the OpenWeather client.
#[derive(Clone)]
pub struct ProviderConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
    /// Extra attempts after a transport failure. Zero means a single request.
    pub retries: u32,
}

/// Postgres connection parameters.
#[derive(Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: String,
    pub password: String,
}

/// Everything a run needs, read once at process start.
#[derive(Clone, Debug)]
pub struct Config {
    pub provider: ProviderConfig,
    pub database: DatabaseConfig,
}

impl Config {
    /// Build the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    ///
    /// Empty values are treated the same as unset ones.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());
        let require = |var: &'static str| get(var).ok_or(ConfigError::Missing(var));

        let timeout_secs: Option<u64> =
            parse_opt(get("WEATHER_HTTP_TIMEOUT_SECS"), "WEATHER_HTTP_TIMEOUT_SECS")?;
        if timeout_secs == Some(0) {
            return Err(ConfigError::Invalid {
                var: "WEATHER_HTTP_TIMEOUT_SECS",
                reason: "timeout must be at least one second".to_string(),
            });
        }

        let provider = ProviderConfig {
            api_key: require("OPENWEATHER_API_KEY")?,
            base_url: get("OPENWEATHER_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            timeout: timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_HTTP_TIMEOUT),
            retries: parse_opt(get("WEATHER_HTTP_RETRIES"), "WEATHER_HTTP_RETRIES")?
                .unwrap_or(0),
        };

        let database = DatabaseConfig {
            host: get("POSTGRES_HOST")
                .unwrap_or_else(|| DEFAULT_DB_HOST.to_string()),
            port: parse_opt(get("POSTGRES_PORT"), "POSTGRES_PORT")?
                .unwrap_or(DEFAULT_DB_PORT),
            name: require("POSTGRES_DB")?,
            user: require("POSTGRES_USER")?,
            password: require("POSTGRES_PASSWORD")?,
        };

        Ok(Self { provider, database })
    }
}

impl DatabaseConfig {
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.name)
            .username(&self.user)
            .password(&self.password)
    }
}

fn parse_opt<T>(value: Option<String>, var: &'static str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    value
        .map(|v| {
            v.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
                var,
                reason: format!("{v:?}: {e}"),
            })
        })
        .transpose()
}

// Secrets stay out of logs.
impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("retries", &self.retries)
            .finish()
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("name", &self.name)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |var| map.get(var).cloned()
    }

    const REQUIRED: &[(&str, &str)] = &[
        ("OPENWEATHER_API_KEY", "OPEN_KEY"),
        ("POSTGRES_DB", "weather"),
        ("POSTGRES_USER", "airflow"),
        ("POSTGRES_PASSWORD", "hunter2"),
    ];

    #[test]
    fn required_only_uses_defaults() {
        let cfg = Config::from_lookup(env(REQUIRED)).expect("config must load");

        assert_eq!(cfg.provider.api_key, "OPEN_KEY");
        assert_eq!(cfg.provider.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.provider.timeout, DEFAULT_HTTP_TIMEOUT);
        assert_eq!(cfg.provider.retries, 0);
        assert_eq!(cfg.database.host, "postgres");
        assert_eq!(cfg.database.port, 5432);
        assert_eq!(cfg.database.name, "weather");
    }

    #[test]
    fn missing_api_key_is_reported_by_name() {
        let vars: Vec<_> = REQUIRED
            .iter()
            .copied()
            .filter(|(k, _)| *k != "OPENWEATHER_API_KEY")
            .collect();
        let err = Config::from_lookup(env(&vars)).unwrap_err();

        assert!(matches!(err, ConfigError::Missing("OPENWEATHER_API_KEY")));
    }

    #[test]
    fn empty_password_counts_as_missing() {
        let mut vars = REQUIRED.to_vec();
        vars.retain(|(k, _)| *k != "POSTGRES_PASSWORD");
        vars.push(("POSTGRES_PASSWORD", "  "));

        let err = Config::from_lookup(env(&vars)).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("POSTGRES_PASSWORD")));
    }

    #[test]
    fn overrides_are_parsed() {
        let mut vars = REQUIRED.to_vec();
        vars.extend([
            ("POSTGRES_HOST", "localhost"),
            ("POSTGRES_PORT", "6543"),
            ("OPENWEATHER_BASE_URL", "http://127.0.0.1:8080/"),
            ("WEATHER_HTTP_TIMEOUT_SECS", "5"),
            ("WEATHER_HTTP_RETRIES", "2"),
        ]);

        let cfg = Config::from_lookup(env(&vars)).expect("config must load");
        assert_eq!(cfg.database.host, "localhost");
        assert_eq!(cfg.database.port, 6543);
        assert_eq!(cfg.provider.base_url, "http://127.0.0.1:8080");
        assert_eq!(cfg.provider.timeout, Duration::from_secs(5));
        assert_eq!(cfg.provider.retries, 2);
    }

    #[test]
    fn bad_port_is_invalid() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("POSTGRES_PORT", "not-a-port"));

        let err = Config::from_lookup(env(&vars)).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                var: "POSTGRES_PORT",
                ..
            }
        ));
    }

    #[test]
    fn zero_timeout_is_invalid() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("WEATHER_HTTP_TIMEOUT_SECS", "0"));

        let err = Config::from_lookup(env(&vars)).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                var: "WEATHER_HTTP_TIMEOUT_SECS",
                ..
            }
        ));
    }

    #[test]
    fn debug_output_hides_secrets() {
        let cfg = Config::from_lookup(env(REQUIRED)).expect("config must load");
        let dbg = format!("{cfg:?}");

        assert!(!dbg.contains("OPEN_KEY"));
        assert!(!dbg.contains("hunter2"));
        assert!(dbg.contains("<redacted>"));
    }
}
