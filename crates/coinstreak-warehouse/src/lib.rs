//! # Coinstreak Warehouse
//!
//! DuckDB-based storage for cached daily OHLC records.
//!
//! ## Overview
//!
//! The warehouse keeps one row per currency and one row per (currency, date)
//! pair. All user-provided values are bound as query parameters, and every
//! logical unit of work (currency creation, batch insert, range read) runs on
//! a pooled connection that is released on every exit path.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use coinstreak_warehouse::{DailyRecordRow, Warehouse};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let warehouse = Warehouse::open_default()?;
//!     let currency = warehouse.create_currency("btc-bitcoin")?;
//!
//!     warehouse.ingest_daily_records(
//!         currency.id,
//!         &[DailyRecordRow {
//!             date: "2020-01-01".to_string(),
//!             open: 7194.89,
//!             high: 7254.33,
//!             low: 7174.94,
//!             close: 7200.17,
//!         }],
//!     )?;
//!
//!     let rows = warehouse.daily_records(currency.id, "2020-01-01", "2020-01-31")?;
//!     println!("{} cached days", rows.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Tables
//!
//! | Table | Description |
//! |-------|-------------|
//! | `currencies` | Currencies keyed by unique name |
//! | `daily_records` | Daily OHLC values, unique per (currency, date) |
//! | `schema_migrations` | Applied migration versions |

pub mod duckdb;
pub mod migrations;
pub mod schema;

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use ::duckdb::Connection;
use ::duckdb::ToSql;
use serde::Deserialize;
use thiserror::Error;

pub use duckdb::{DuckDbConnectionManager, PooledConnection};
pub use schema::{Column, EntitySchema, CURRENCIES, DAILY_RECORDS};

/// Errors that can occur during warehouse operations.
#[derive(Debug, Error)]
pub enum WarehouseError {
    /// `DuckDB` database error.
    #[error(transparent)]
    DuckDb(#[from] ::duckdb::Error),

    /// I/O error (file system operations).
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Configuration for the warehouse database.
#[derive(Debug, Clone)]
pub struct WarehouseConfig {
    /// Path to the `DuckDB` database file.
    pub db_path: PathBuf,
    /// Maximum number of idle connections kept in the pool.
    pub max_pool_size: usize,
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Self {
            db_path: resolve_coinstreak_home().join("cache").join("coinstreak.duckdb"),
            max_pool_size: 2,
        }
    }
}

impl WarehouseConfig {
    /// Configuration pointing at an explicit database file.
    pub fn with_db_path(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            ..Self::default()
        }
    }
}

/// A stored currency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyRow {
    pub id: i64,
    pub name: String,
}

/// One day of OHLC values as stored, with the date as `YYYY-MM-DD`.
///
/// Field names match the payload fields of [`DAILY_RECORDS`], so a
/// transformed remote record decodes straight into this type.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DailyRecordRow {
    pub date: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

/// The main warehouse interface.
#[derive(Clone)]
pub struct Warehouse {
    manager: DuckDbConnectionManager,
}

impl Warehouse {
    /// Open a warehouse with default configuration.
    pub fn open_default() -> Result<Self, WarehouseError> {
        Self::open(WarehouseConfig::default())
    }

    /// Open a warehouse with the specified configuration.
    pub fn open(config: WarehouseConfig) -> Result<Self, WarehouseError> {
        if let Some(parent) = config.db_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let manager = DuckDbConnectionManager::open(config.db_path.clone(), config.max_pool_size)?;
        let warehouse = Self { manager };
        warehouse.initialize()?;
        Ok(warehouse)
    }

    /// Initialize the database schema.
    pub fn initialize(&self) -> Result<(), WarehouseError> {
        let connection = self.manager.acquire()?;
        migrations::apply_migrations(&connection)?;
        Ok(())
    }

    /// Get the path to the database file.
    pub fn db_path(&self) -> &Path {
        self.manager.db_path()
    }

    /// Look up a currency by its unique name.
    pub fn find_currency(&self, name: &str) -> Result<Option<CurrencyRow>, WarehouseError> {
        let connection = self.manager.acquire()?;
        select_currency(&connection, name)
    }

    /// Persist a new currency and return it with its generated id.
    pub fn create_currency(&self, name: &str) -> Result<CurrencyRow, WarehouseError> {
        let connection = self.manager.acquire()?;
        connection.execute_batch("BEGIN TRANSACTION")?;
        let result = (|| -> Result<CurrencyRow, WarehouseError> {
            connection.execute(CURRENCIES.insert_sql().as_str(), [name])?;
            select_currency(&connection, name)?.ok_or(WarehouseError::DuckDb(
                ::duckdb::Error::QueryReturnedNoRows,
            ))
        })();

        let currency = finalize_transaction(&connection, result)?;
        tracing::info!(currency = %currency.name, id = currency.id, "stored new currency");
        Ok(currency)
    }

    /// Daily records of one currency with `start <= date <= end`, ascending by date.
    ///
    /// Both bounds are `YYYY-MM-DD` strings.
    pub fn daily_records(
        &self,
        currency_id: i64,
        start: &str,
        end: &str,
    ) -> Result<Vec<DailyRecordRow>, WarehouseError> {
        let connection = self.manager.acquire()?;
        let mut statement = connection.prepare(
            "SELECT CAST(date AS VARCHAR), open, high, low, close \
             FROM daily_records \
             WHERE currency_id = ? AND date BETWEEN CAST(? AS DATE) AND CAST(? AS DATE) \
             ORDER BY date",
        )?;

        let params: [&dyn ToSql; 3] = [&currency_id, &start, &end];
        let rows = statement
            .query_map(params.as_slice(), |row| {
                Ok(DailyRecordRow {
                    date: row.get(0)?,
                    open: row.get(1)?,
                    high: row.get(2)?,
                    low: row.get(3)?,
                    close: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    /// Insert daily records for one currency inside a single transaction.
    ///
    /// The whole batch is rolled back if any row violates the
    /// (currency, date) uniqueness constraint.
    pub fn ingest_daily_records(
        &self,
        currency_id: i64,
        rows: &[DailyRecordRow],
    ) -> Result<usize, WarehouseError> {
        if rows.is_empty() {
            return Ok(0);
        }

        let connection = self.manager.acquire()?;
        connection.execute_batch("BEGIN TRANSACTION")?;
        let result = (|| -> Result<usize, WarehouseError> {
            let insert_sql = DAILY_RECORDS.insert_sql();
            let mut statement = connection.prepare(insert_sql.as_str())?;
            for row in rows {
                let params: [&dyn ToSql; 6] = [
                    &row.date,
                    &row.open,
                    &row.high,
                    &row.low,
                    &row.close,
                    &currency_id,
                ];
                statement.execute(params.as_slice())?;
            }

            Ok(rows.len())
        })();

        let inserted = finalize_transaction(&connection, result)?;
        tracing::debug!(currency_id, inserted, "committed daily record batch");
        Ok(inserted)
    }
}

fn select_currency(connection: &Connection, name: &str) -> Result<Option<CurrencyRow>, WarehouseError> {
    let mut statement = connection.prepare("SELECT id, name FROM currencies WHERE name = ?")?;
    let mut rows = statement.query([name])?;

    match rows.next()? {
        Some(row) => Ok(Some(CurrencyRow {
            id: row.get(0)?,
            name: row.get(1)?,
        })),
        None => Ok(None),
    }
}

/// Finalize a transaction, committing on success or rolling back on failure.
fn finalize_transaction<T>(
    connection: &Connection,
    result: Result<T, WarehouseError>,
) -> Result<T, WarehouseError> {
    match result {
        Ok(value) => {
            connection.execute_batch("COMMIT")?;
            Ok(value)
        }
        Err(error) => {
            let _ = connection.execute_batch("ROLLBACK");
            Err(error)
        }
    }
}

/// Resolve the coinstreak home directory from environment or default.
fn resolve_coinstreak_home() -> PathBuf {
    if let Some(path) = env::var_os("COINSTREAK_HOME") {
        let path = PathBuf::from(path);
        if !path.as_os_str().is_empty() {
            return path;
        }
    }

    if let Some(home) = env::var_os("HOME") {
        return PathBuf::from(home).join(".coinstreak");
    }

    PathBuf::from(".coinstreak")
}
