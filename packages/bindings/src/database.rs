// ABOUTME: SQL database binding with D1-style query methods
// ABOUTME: SQLite implementation over an sqlx pool, rows returned as JSON objects

use std::str::FromStr;

use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Column, Row};
use tracing::debug;

use crate::error::BindingError;

/// One result row keyed by column name
pub type DbRow = Map<String, Value>;

#[async_trait]
pub trait Database: Send + Sync {
    /// Run a query and return every row
    async fn all(&self, sql: &str) -> Result<Vec<DbRow>, BindingError>;

    /// Run a statement and return the number of affected rows
    async fn run(&self, sql: &str) -> Result<u64, BindingError>;
}

#[derive(Debug, Clone)]
pub struct SqliteDatabase {
    pool: SqlitePool,
}

impl SqliteDatabase {
    /// Open a pool for `url` (e.g. `sqlite://data/app.db` or `sqlite::memory:`).
    ///
    /// Missing database files are created. In-memory databases get a single
    /// connection so every query sees the same data.
    pub async fn connect(url: &str) -> Result<Self, BindingError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let max_connections = if url.contains(":memory:") { 1 } else { 5 };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        debug!(max_connections, "SQLite binding connected");
        Ok(Self { pool })
    }

    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Database for SqliteDatabase {
    async fn all(&self, sql: &str) -> Result<Vec<DbRow>, BindingError> {
        let rows = sqlx::query(sql).fetch_all(&self.pool).await?;
        Ok(rows.iter().map(row_to_json).collect())
    }

    async fn run(&self, sql: &str) -> Result<u64, BindingError> {
        let result = sqlx::query(sql).execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}

fn row_to_json(row: &SqliteRow) -> DbRow {
    let mut object = Map::new();
    for column in row.columns() {
        let index = column.ordinal();
        let value = if let Ok(v) = row.try_get::<Option<i64>, _>(index) {
            v.map(Value::from).unwrap_or(Value::Null)
        } else if let Ok(v) = row.try_get::<Option<f64>, _>(index) {
            v.map(Value::from).unwrap_or(Value::Null)
        } else if let Ok(v) = row.try_get::<Option<String>, _>(index) {
            v.map(Value::from).unwrap_or(Value::Null)
        } else {
            // blobs have no JSON form
            Value::Null
        };
        object.insert(column.name().to_string(), value);
    }
    object
}
