//! Persistence of readings into the `weather` table.
//!
//! A run holds one connection and one transaction. Rows become visible only
//! when the run commits.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::{
    Connection, PgPool, Postgres, Transaction,
    postgres::{PgConnectOptions, PgPoolOptions},
};
use tracing::{debug, warn};

use crate::{
    config::DatabaseConfig,
    error::{ConnectionError, StoreError},
    model::WeatherReading,
};

const INSERT_READING: &str = "INSERT INTO weather \
     (city, temperature, humidity, weather_description, date) \
     VALUES ($1, $2, $3, $4, $5)";

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(30);

/// Something a run can open a [`WeatherStore`] on.
#[async_trait]
pub trait WeatherDatabase: Send + Sync {
    type Store: WeatherStore;

    async fn open(&self) -> Result<Self::Store, ConnectionError>;
}

/// An open connection with a transaction in progress.
#[async_trait]
pub trait WeatherStore: Send {
    /// Append one row. Never commits.
    async fn store(&mut self, reading: &WeatherReading) -> Result<(), StoreError>;

    /// Commit everything stored so far and close the connection.
    async fn commit(self) -> Result<(), ConnectionError>;
}

#[derive(Debug, Clone)]
pub struct PgDatabase {
    options: PgConnectOptions,
}

impl PgDatabase {
    pub fn new(config: &DatabaseConfig) -> Self {
        Self {
            options: config.connect_options(),
        }
    }
}

#[async_trait]
impl WeatherDatabase for PgDatabase {
    type Store = PgWeatherStore;

    async fn open(&self) -> Result<PgWeatherStore, ConnectionError> {
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect_with(self.options.clone())
            .await?;
        let tx = pool.begin().await?;

        debug!("opened database transaction");
        Ok(PgWeatherStore { pool, tx })
    }
}

pub struct PgWeatherStore {
    pool: PgPool,
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl WeatherStore for PgWeatherStore {
    async fn store(&mut self, reading: &WeatherReading) -> Result<(), StoreError> {
        // A failed statement poisons a Postgres transaction, so each row gets
        // its own savepoint and a failure only rolls back that row.
        let mut savepoint = Connection::begin(&mut *self.tx).await?;

        let inserted = sqlx::query(INSERT_READING)
            .bind(&reading.city)
            .bind(reading.temperature_c)
            .bind(reading.humidity_pct)
            .bind(&reading.description)
            .bind(reading.observed_date)
            .execute(&mut *savepoint)
            .await;

        match inserted {
            Ok(_) => {
                savepoint.commit().await?;
                Ok(())
            }
            Err(e) => Err(insert_failure(e, savepoint.rollback().await)),
        }
    }

    async fn commit(self) -> Result<(), ConnectionError> {
        self.tx.commit().await?;
        self.pool.close().await;
        debug!("committed database transaction");
        Ok(())
    }
}

/// The insert error is what the caller sees; a failed rollback is only logged.
fn insert_failure(insert: sqlx::Error, rollback: Result<(), sqlx::Error>) -> StoreError {
    if let Err(e) = rollback {
        warn!(error = %e, "failed to roll back savepoint after insert error");
    }
    StoreError(insert)
}
