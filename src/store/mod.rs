//! Dynamic record store for weather comparison data.
//!
//! One SQLite table, `weather_data`, keyed by city name. Columns accumulate
//! on demand over the run (`ensure_column`) and are never removed. All
//! identifiers that reach SQL text come from a validated, registered set;
//! only WHERE values are caller data, and those are always bound.

use crate::error::TesterError;
use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool, TypeInfo, ValueRef};
use std::collections::BTreeSet;
use std::path::Path;
use std::str::FromStr;
use std::sync::Mutex;

const TABLE: &str = "weather_data";

/// Declared type for a column added via [`RecordStore::ensure_column`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Real,
    Integer,
    Text,
}

impl ColumnType {
    fn as_sql(&self) -> &'static str {
        match self {
            ColumnType::Real => "REAL",
            ColumnType::Integer => "INTEGER",
            ColumnType::Text => "TEXT",
        }
    }
}

/// Whitelisted aggregate functions for [`RecordStore::aggregate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregate {
    Max,
    Min,
    Avg,
}

impl Aggregate {
    fn as_sql(&self) -> &'static str {
        match self {
            Aggregate::Max => "MAX",
            Aggregate::Min => "MIN",
            Aggregate::Avg => "AVG",
        }
    }
}

impl FromStr for Aggregate {
    type Err = TesterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "MAX" => Ok(Aggregate::Max),
            "MIN" => Ok(Aggregate::Min),
            "AVG" => Ok(Aggregate::Avg),
            other => Err(TesterError::InvalidArgument(format!(
                "aggregate must be one of MAX, MIN, AVG, got '{other}'"
            ))),
        }
    }
}

/// Stored cell value, bridging Rust values and SQLite storage classes.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Integer(v) => write!(f, "{v}"),
            Value::Real(v) => write!(f, "{v}"),
            Value::Text(v) => write!(f, "{v}"),
        }
    }
}

fn bind_value<'q>(
    query: sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>>,
    value: &'q Value,
) -> sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>> {
    match value {
        Value::Null => query.bind(None::<String>),
        Value::Integer(v) => query.bind(*v),
        Value::Real(v) => query.bind(*v),
        Value::Text(v) => query.bind(v.as_str()),
    }
}

/// Decode one row into values, following the storage class SQLite reports.
fn decode_row(row: &SqliteRow) -> Result<Vec<Value>> {
    let mut values = Vec::with_capacity(row.len());
    for i in 0..row.len() {
        let raw = row.try_get_raw(i)?;
        let value = if raw.is_null() {
            Value::Null
        } else {
            match raw.type_info().name() {
                "INTEGER" => Value::Integer(row.try_get::<i64, _>(i)?),
                "REAL" => Value::Real(row.try_get::<f64, _>(i)?),
                _ => Value::Text(row.try_get::<String, _>(i)?),
            }
        };
        values.push(value);
    }
    Ok(values)
}

/// `[A-Za-z_][A-Za-z0-9_]*` — the only shape allowed into SQL text.
fn validate_identifier(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(TesterError::InvalidArgument(format!("invalid column name '{name}'")).into())
    }
}

/// SQLite-backed store with schema-on-demand columns.
///
/// Holds a single connection; every statement auto-commits. `close()`
/// releases the connection and later calls fail with `ConnectionClosed`.
pub struct RecordStore {
    pool: SqlitePool,
    /// Columns known to exist, seeded from the live schema at open time.
    /// Writes and reads are validated against this set instead of
    /// interpolating caller strings.
    columns: Mutex<BTreeSet<String>>,
}

impl RecordStore {
    /// Open (creating if missing) the store at `path`.
    pub async fn open(path: &Path) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        Self::init(pool).await
    }

    /// In-memory store, used by tests.
    pub async fn open_in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        Self::init(pool).await
    }

    async fn init(pool: SqlitePool) -> Result<Self> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS weather_data (
                city TEXT PRIMARY KEY,
                api_temperature REAL,
                feels_like REAL
            )",
        )
        .execute(&pool)
        .await?;

        let store = Self {
            pool,
            columns: Mutex::new(BTreeSet::new()),
        };
        let existing = store.schema_columns().await?;
        *store.columns.lock().unwrap() = existing.into_iter().collect();
        Ok(store)
    }

    fn pool(&self) -> Result<&SqlitePool> {
        if self.pool.is_closed() {
            Err(TesterError::ConnectionClosed.into())
        } else {
            Ok(&self.pool)
        }
    }

    fn check_registered(&self, name: &str) -> Result<()> {
        validate_identifier(name)?;
        if self.columns.lock().unwrap().contains(name) {
            Ok(())
        } else {
            Err(TesterError::InvalidArgument(format!("unknown column '{name}'")).into())
        }
    }

    /// Column names of `weather_data` as the database reports them.
    pub async fn schema_columns(&self) -> Result<Vec<String>> {
        let rows = sqlx::query(&format!("PRAGMA table_info({TABLE})"))
            .fetch_all(self.pool()?)
            .await?;
        rows.iter()
            .map(|row| Ok(row.try_get::<String, _>("name")?))
            .collect()
    }

    /// Add `name` to the schema iff it is not there yet. Idempotent;
    /// columns are nullable and never removed.
    pub async fn ensure_column(&self, name: &str, column_type: ColumnType) -> Result<()> {
        validate_identifier(name)?;

        let existing = self.schema_columns().await?;
        if !existing.iter().any(|c| c == name) {
            sqlx::query(&format!(
                "ALTER TABLE {TABLE} ADD COLUMN {name} {}",
                column_type.as_sql()
            ))
            .execute(self.pool()?)
            .await?;
            log::info!("added column {name} {} to {TABLE}", column_type.as_sql());
        }

        self.columns.lock().unwrap().insert(name.to_string());
        Ok(())
    }

    /// Insert-or-replace the row for `city`.
    ///
    /// `fields` is an ordered list of (column, value) pairs; every column
    /// must have been ensured before. REPLACE semantics are full-row: when
    /// the city already exists, columns absent from `fields` revert to NULL
    /// rather than keeping their previous values.
    pub async fn upsert(&self, city: &str, fields: &[(&str, Value)]) -> Result<()> {
        for (name, _) in fields {
            if *name == "city" {
                return Err(TesterError::InvalidArgument(
                    "'city' is the key and cannot appear in fields".to_string(),
                )
                .into());
            }
            self.check_registered(name)?;
        }

        let mut columns = vec!["city".to_string()];
        columns.extend(fields.iter().map(|(name, _)| name.to_string()));
        let placeholders = vec!["?"; columns.len()].join(", ");
        let sql = format!(
            "INSERT OR REPLACE INTO {TABLE} ({}) VALUES ({placeholders})",
            columns.join(", ")
        );

        let mut query = sqlx::query(&sql).bind(city);
        for (_, value) in fields {
            query = bind_value(query, value);
        }
        query.execute(self.pool()?).await?;
        Ok(())
    }

    /// Values of `fields` for `city`, or `None` when the city has no row.
    pub async fn fetch(&self, city: &str, fields: &[&str]) -> Result<Option<Vec<Value>>> {
        if fields.is_empty() {
            return Err(
                TesterError::InvalidArgument("fetch requires at least one field".to_string())
                    .into(),
            );
        }
        for name in fields {
            self.check_registered(name)?;
        }

        let sql = format!(
            "SELECT {} FROM {TABLE} WHERE city = ?",
            fields.join(", ")
        );
        let row = sqlx::query(&sql)
            .bind(city)
            .fetch_optional(self.pool()?)
            .await?;
        row.as_ref().map(decode_row).transpose()
    }

    /// `(city, value)` for the row achieving the aggregate over `column`,
    /// or `None` when the table is empty or the column is all-NULL.
    pub async fn aggregate(
        &self,
        column: &str,
        function: Aggregate,
    ) -> Result<Option<(String, f64)>> {
        self.check_registered(column)?;

        let sql = format!(
            "SELECT city, {}({column}) FROM {TABLE}",
            function.as_sql()
        );
        let row = sqlx::query(&sql).fetch_one(self.pool()?).await?;
        let city: Option<String> = row.try_get(0)?;
        let value: Option<f64> = row.try_get(1)?;
        Ok(city.zip(value))
    }

    /// General filtered read.
    ///
    /// Selects `fields` (all columns when empty), optionally filtered by a
    /// caller predicate with positional `?` parameters. Predicate values are
    /// always bound, never interpolated. Rows come back in insertion order.
    pub async fn query_records(
        &self,
        fields: &[&str],
        where_clause: Option<&str>,
        params: &[Value],
    ) -> Result<Vec<Vec<Value>>> {
        let selected = if fields.is_empty() {
            "*".to_string()
        } else {
            for name in fields {
                self.check_registered(name)?;
            }
            fields.join(", ")
        };

        let mut sql = format!("SELECT {selected} FROM {TABLE}");
        if let Some(clause) = where_clause {
            sql.push_str(" WHERE ");
            sql.push_str(clause);
        }

        let mut query = sqlx::query(&sql);
        for value in params {
            query = bind_value(query, value);
        }
        let rows = query.fetch_all(self.pool()?).await?;
        rows.iter().map(decode_row).collect()
    }

    /// Release the connection. Operations after this fail with
    /// `ConnectionClosed`.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
