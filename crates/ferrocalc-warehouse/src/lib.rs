//! # Ferrocalc Warehouse
//!
//! DuckDB-backed persistence for calculation history and rate snapshots.
//!
//! ## Overview
//!
//! [`Warehouse`] exposes synchronous, parameterized operations over a single
//! database file. It also implements the async [`HistoryStore`](ferrocalc_core::HistoryStore) and
//! [`RateStore`](ferrocalc_core::RateStore) contracts from `ferrocalc-core` by running each operation
//! on tokio's blocking pool, so the calculator can use it directly.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ferrocalc_warehouse::{Warehouse, WarehouseConfig};
//! use ferrocalc_core::UtcDateTime;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let warehouse = Warehouse::open(WarehouseConfig::default())?;
//!     let id = warehouse.append_calculation("2+3*4", "14", UtcDateTime::now())?;
//!
//!     for record in warehouse.list_calculations(10)? {
//!         println!("{} {} = {}", record.id, record.expression, record.result);
//!     }
//!
//!     warehouse.delete_calculation(id)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Tables
//!
//! | Table | Description |
//! |-------|-------------|
//! | `calculations` | One row per successful evaluation |
//! | `rate_snapshots` | One row per base currency |
//! | `rate_entries` | Factors of each snapshot |
//! | `schema_migrations` | Applied migration versions |

pub mod duckdb;
pub mod migrations;
mod store;

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use ::duckdb::{params, Connection, ToSql};
use ferrocalc_core::{
    CalculationRecord, CurrencyCode, DeleteOutcome, RateSnapshot, RateTable, RecordId, StoreError,
    UtcDateTime,
};
use log::{debug, warn};
use thiserror::Error;

pub use duckdb::{DuckDbConnectionManager, PooledConnection};

/// Errors that can occur during warehouse operations.
#[derive(Debug, Error)]
pub enum WarehouseError {
    /// `DuckDB` database error.
    #[error(transparent)]
    DuckDb(#[from] ::duckdb::Error),

    /// I/O error (file system operations).
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A stored row could not be turned back into a domain value.
    #[error("corrupt row in {table}: {message}")]
    Corrupt {
        table: &'static str,
        message: String,
    },
}

impl From<WarehouseError> for StoreError {
    fn from(error: WarehouseError) -> Self {
        match error {
            WarehouseError::Corrupt { .. } => StoreError::corrupt(error.to_string()),
            WarehouseError::DuckDb(_) | WarehouseError::Io(_) => {
                StoreError::unavailable(error.to_string())
            }
        }
    }
}

/// Configuration for the warehouse database.
#[derive(Debug, Clone)]
pub struct WarehouseConfig {
    /// Root directory for ferrocalc data.
    pub ferrocalc_home: PathBuf,
    /// Path to the `DuckDB` database file.
    pub db_path: PathBuf,
    /// Maximum number of idle connections kept in the pool.
    pub max_pool_size: usize,
}

impl WarehouseConfig {
    /// Configuration rooted at `ferrocalc_home`, with the database file inside it.
    pub fn in_home(ferrocalc_home: impl Into<PathBuf>) -> Self {
        let ferrocalc_home = ferrocalc_home.into();
        let db_path = ferrocalc_home.join("warehouse.duckdb");
        Self {
            ferrocalc_home,
            db_path,
            max_pool_size: 4,
        }
    }
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Self::in_home(resolve_ferrocalc_home())
    }
}

/// Calculation history and rate snapshots in one `DuckDB` file.
#[derive(Clone)]
pub struct Warehouse {
    manager: DuckDbConnectionManager,
}

impl Warehouse {
    /// Open a warehouse with default configuration.
    pub fn open_default() -> Result<Self, WarehouseError> {
        Self::open(WarehouseConfig::default())
    }

    /// Open a warehouse, creating the database directory and schema as needed.
    pub fn open(config: WarehouseConfig) -> Result<Self, WarehouseError> {
        if let Some(parent) = config.db_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let manager = DuckDbConnectionManager::open(config.db_path.clone(), config.max_pool_size)?;
        let warehouse = Self { manager };
        warehouse.initialize()?;
        debug!("warehouse ready at {}", warehouse.db_path().display());
        Ok(warehouse)
    }

    /// Apply pending schema migrations.
    pub fn initialize(&self) -> Result<(), WarehouseError> {
        let connection = self.manager.acquire()?;
        migrations::apply_migrations(&connection)?;
        Ok(())
    }

    /// Get the path to the database file.
    pub fn db_path(&self) -> &Path {
        self.manager.db_path()
    }

    /// Insert a calculation and return its new identifier.
    pub fn append_calculation(
        &self,
        expression: &str,
        result: &str,
        timestamp: UtcDateTime,
    ) -> Result<RecordId, WarehouseError> {
        let id = RecordId::generate();
        let connection = self.manager.acquire()?;

        let id_text = id.to_string();
        let created_at = timestamp.format_rfc3339();
        let created_at_micros = timestamp.unix_micros();
        let params: [&dyn ToSql; 5] = [
            &id_text,
            &expression,
            &result,
            &created_at,
            &created_at_micros,
        ];
        connection.execute(
            "INSERT INTO calculations (id, expression, result, created_at, created_at_micros) \
             VALUES (?, ?, ?, ?, ?)",
            params.as_slice(),
        )?;

        Ok(id)
    }

    /// Up to `limit` calculations, most recent first. Ties keep insertion order reversed.
    pub fn list_calculations(&self, limit: usize) -> Result<Vec<CalculationRecord>, WarehouseError> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let connection = self.manager.acquire()?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let mut statement = connection.prepare(
            "SELECT id, expression, result, created_at FROM calculations \
             ORDER BY created_at_micros DESC, seq DESC LIMIT ?",
        )?;
        let rows = statement.query_map(params![limit], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (id, expression, result, created_at) = row?;
            records.push(CalculationRecord {
                id: RecordId::parse(&id).map_err(|error| corrupt("calculations", error))?,
                expression,
                result,
                timestamp: UtcDateTime::parse(&created_at)
                    .map_err(|error| corrupt("calculations", error))?,
            });
        }

        Ok(records)
    }

    pub fn delete_calculation(&self, id: RecordId) -> Result<DeleteOutcome, WarehouseError> {
        let connection = self.manager.acquire()?;
        let deleted = connection.execute("DELETE FROM calculations WHERE id = ?", [id.to_string()])?;
        Ok(if deleted > 0 {
            DeleteOutcome::Found
        } else {
            DeleteOutcome::NotFound
        })
    }

    /// The stored snapshot for `base`, if any.
    ///
    /// Both tables are read inside one transaction, so a concurrent
    /// [`upsert_rates`](Self::upsert_rates) is seen entirely or not at all.
    pub fn find_rates(&self, base: &CurrencyCode) -> Result<Option<RateSnapshot>, WarehouseError> {
        let mut connection = self.manager.acquire()?;
        connection.execute_batch("BEGIN TRANSACTION")?;
        let result = read_snapshot(&connection, base);
        finalize_transaction(&mut connection, result)
    }

    /// Replace the snapshot stored for `base` in a single transaction.
    ///
    /// Readers observe either the previous snapshot or the new one, never a mix.
    pub fn upsert_rates(
        &self,
        base: &CurrencyCode,
        snapshot: &RateSnapshot,
    ) -> Result<(), WarehouseError> {
        let mut connection = self.manager.acquire()?;
        connection.execute_batch("BEGIN TRANSACTION")?;
        let result = (|| -> Result<(), WarehouseError> {
            let fetched_at = snapshot.fetched_at().format_rfc3339();
            let base = base.as_str();
            let params: [&dyn ToSql; 2] = [&base, &fetched_at];
            connection.execute(
                "INSERT OR REPLACE INTO rate_snapshots (base, fetched_at, updated_at) \
                 VALUES (?, ?, CURRENT_TIMESTAMP)",
                params.as_slice(),
            )?;

            connection.execute("DELETE FROM rate_entries WHERE base = ?", [base])?;
            for (currency, factor) in snapshot.rates() {
                let currency = currency.as_str();
                let params: [&dyn ToSql; 3] = [&base, &currency, factor];
                connection.execute(
                    "INSERT INTO rate_entries (base, currency, factor) VALUES (?, ?, ?)",
                    params.as_slice(),
                )?;
            }

            Ok(())
        })();

        finalize_transaction(&mut connection, result)
    }

    /// Number of bases with a stored snapshot.
    pub fn rate_snapshot_count(&self) -> Result<usize, WarehouseError> {
        let connection = self.manager.acquire()?;
        let count: i64 =
            connection.query_row("SELECT COUNT(*) FROM rate_snapshots", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }
}

fn read_snapshot(
    connection: &Connection,
    base: &CurrencyCode,
) -> Result<Option<RateSnapshot>, WarehouseError> {
    let fetched_at = {
        let mut statement =
            connection.prepare("SELECT fetched_at FROM rate_snapshots WHERE base = ?")?;
        let mut rows = statement.query([base.as_str()])?;
        match rows.next()? {
            Some(row) => row.get::<_, String>(0)?,
            None => return Ok(None),
        }
    };

    let mut statement =
        connection.prepare("SELECT currency, factor FROM rate_entries WHERE base = ?")?;
    let entries = statement.query_map([base.as_str()], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?))
    })?;

    let mut rates = RateTable::new();
    for entry in entries {
        let (currency, factor) = entry?;
        let currency =
            CurrencyCode::parse(&currency).map_err(|error| corrupt("rate_entries", error))?;
        rates.insert(currency, factor);
    }

    let fetched_at =
        UtcDateTime::parse(&fetched_at).map_err(|error| corrupt("rate_snapshots", error))?;
    RateSnapshot::new(base.clone(), rates, fetched_at)
        .map(Some)
        .map_err(|error| corrupt("rate_snapshots", error))
}

fn finalize_transaction<T>(
    connection: &mut PooledConnection,
    result: Result<T, WarehouseError>,
) -> Result<T, WarehouseError> {
    match result {
        Ok(value) => match connection.execute_batch("COMMIT") {
            Ok(()) => Ok(value),
            Err(error) => {
                // A conflicting concurrent write aborts the commit.
                rollback(connection);
                Err(error.into())
            }
        },
        Err(error) => {
            rollback(connection);
            Err(error)
        }
    }
}

// A connection whose transaction could not be closed never returns to the pool.
fn rollback(connection: &mut PooledConnection) {
    if let Err(error) = connection.execute_batch("ROLLBACK") {
        warn!("rollback failed, discarding connection: {error}");
        connection.discard();
    }
}

fn corrupt(table: &'static str, error: impl std::fmt::Display) -> WarehouseError {
    WarehouseError::Corrupt {
        table,
        message: error.to_string(),
    }
}

/// `FERROCALC_HOME`, then `$HOME/.ferrocalc`, then `.ferrocalc`.
pub fn resolve_ferrocalc_home() -> PathBuf {
    if let Some(path) = env::var_os("FERROCALC_HOME") {
        let path = PathBuf::from(path);
        if !path.as_os_str().is_empty() {
            return path;
        }
    }

    if let Some(home) = env::var_os("HOME") {
        return PathBuf::from(home).join(".ferrocalc");
    }

    PathBuf::from(".ferrocalc")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn open(temp: &tempfile::TempDir) -> Warehouse {
        Warehouse::open(WarehouseConfig::in_home(temp.path().join("ferrocalc-home")))
            .expect("warehouse open")
    }

    fn code(raw: &str) -> CurrencyCode {
        CurrencyCode::parse(raw).expect("valid code")
    }

    #[test]
    fn opens_in_nested_home_and_reopens() {
        let temp = tempdir().expect("tempdir");
        let first = open(&temp);
        first
            .append_calculation("1+1", "2", UtcDateTime::now())
            .expect("append");
        drop(first);

        let reopened = open(&temp);
        assert_eq!(reopened.list_calculations(10).expect("list").len(), 1);
    }

    #[test]
    fn stores_expressions_verbatim() {
        let temp = tempdir().expect("tempdir");
        let warehouse = open(&temp);

        // Parameter binding keeps quotes and SQL fragments intact.
        let expression = r#"1'); DROP TABLE calculations; --"#;
        warehouse
            .append_calculation(expression, "0", UtcDateTime::now())
            .expect("append");

        let records = warehouse.list_calculations(1).expect("list");
        assert_eq!(records[0].expression, expression);
    }

    #[test]
    fn equal_timestamps_list_latest_insert_first() {
        let temp = tempdir().expect("tempdir");
        let warehouse = open(&temp);
        let at = UtcDateTime::parse("2024-05-01T12:00:00Z").expect("timestamp");

        warehouse.append_calculation("1", "1", at).expect("append");
        warehouse.append_calculation("2", "2", at).expect("append");

        let records = warehouse.list_calculations(2).expect("list");
        assert_eq!(records[0].expression, "2");
        assert_eq!(records[1].expression, "1");
    }

    #[test]
    fn upsert_replaces_removed_currencies() {
        let temp = tempdir().expect("tempdir");
        let warehouse = open(&temp);
        let fetched_at = UtcDateTime::parse("2024-05-01T12:00:00Z").expect("timestamp");

        let wide: RateTable = [(code("USD"), 1.0), (code("EUR"), 0.9), (code("JPY"), 150.0)]
            .into_iter()
            .collect();
        let narrow: RateTable = [(code("USD"), 1.0), (code("EUR"), 0.95)]
            .into_iter()
            .collect();

        let first = RateSnapshot::new(code("USD"), wide, fetched_at).expect("snapshot");
        let second = RateSnapshot::new(code("USD"), narrow, fetched_at).expect("snapshot");
        warehouse.upsert_rates(&code("USD"), &first).expect("upsert");
        warehouse.upsert_rates(&code("USD"), &second).expect("upsert");

        assert_eq!(warehouse.find_rates(&code("USD")).expect("find"), Some(second));
        assert_eq!(warehouse.rate_snapshot_count().expect("count"), 1);
    }

    #[test]
    fn corrupt_rows_surface_as_corrupt_store_errors() {
        let temp = tempdir().expect("tempdir");
        let warehouse = open(&temp);
        {
            let connection = warehouse.manager.acquire().expect("connection");
            connection
                .execute_batch(
                    "INSERT INTO calculations (id, expression, result, created_at, created_at_micros) \
                     VALUES ('not-a-uuid', '1', '1', '2024-01-01T00:00:00Z', 0)",
                )
                .expect("insert");
        }

        let error = warehouse.list_calculations(5).expect_err("must fail");
        assert!(matches!(error, WarehouseError::Corrupt { table: "calculations", .. }));
        assert_eq!(StoreError::from(error).code(), "store.corrupt");
    }

    #[test]
    fn failed_rollback_keeps_connection_out_of_the_pool() {
        let temp = tempdir().expect("tempdir");
        let warehouse = open(&temp);
        assert_eq!(warehouse.manager.idle_count(), 1);

        // No transaction is open, so ROLLBACK itself fails.
        let mut connection = warehouse.manager.acquire().expect("connection");
        let result: Result<(), WarehouseError> = Err(corrupt("rate_entries", "bad row"));
        let error = finalize_transaction(&mut connection, result).expect_err("must fail");
        drop(connection);

        assert!(matches!(error, WarehouseError::Corrupt { table: "rate_entries", .. }));
        assert_eq!(warehouse.manager.idle_count(), 0);
    }

    #[test]
    fn committed_reads_return_connection_to_the_pool() {
        let temp = tempdir().expect("tempdir");
        let warehouse = open(&temp);

        assert_eq!(warehouse.find_rates(&code("USD")).expect("find"), None);
        assert_eq!(warehouse.manager.idle_count(), 1);
    }
}
