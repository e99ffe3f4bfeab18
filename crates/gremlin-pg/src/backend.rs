use std::str::FromStr;

use async_trait::async_trait;
use serde_json::{Map, Number, Value};
use sqlx::{
    Column, Connection, Executor, Row, TypeInfo,
    postgres::{PgConnectOptions, PgConnection, PgRow},
};
use tracing::debug;

use crate::errors::PgError;

/// One result row, column name to JSON value.
pub type SqlRow = Map<String, Value>;

/// Opens database sessions for the manager.
///
/// Abstracts the driver so the proxy can be exercised without a live database.
#[async_trait]
pub trait SqlBackend: Send + Sync + 'static {
    /// Parse `dsn` and open a session.
    ///
    /// Malformed connection strings fail with [`PgError::ConnectionSetupFailed`], unreachable
    /// servers with [`PgError::ConnectionFailed`].
    async fn connect(&self, dsn: &str) -> Result<Box<dyn SqlSession>, PgError>;
}

#[async_trait]
pub trait SqlSession: Send {
    async fn ping(&mut self) -> Result<(), String>;

    /// Run `sql` and collect every returned row.
    async fn query(&mut self, sql: &str) -> Result<Vec<SqlRow>, String>;

    async fn close(self: Box<Self>);
}

/// PostgreSQL backend on top of sqlx.
#[derive(Debug, Default, Clone, Copy)]
pub struct PgBackend;

#[async_trait]
impl SqlBackend for PgBackend {
    async fn connect(&self, dsn: &str) -> Result<Box<dyn SqlSession>, PgError> {
        let options = PgConnectOptions::from_str(dsn)
            .map_err(|e| PgError::ConnectionSetupFailed(e.to_string()))?;
        let conn = PgConnection::connect_with(&options)
            .await
            .map_err(|e| PgError::ConnectionFailed(e.to_string()))?;
        Ok(Box::new(PgSession { conn }))
    }
}

struct PgSession {
    conn: PgConnection,
}

#[async_trait]
impl SqlSession for PgSession {
    async fn ping(&mut self) -> Result<(), String> {
        self.conn.ping().await.map_err(|e| e.to_string())
    }

    async fn query(&mut self, sql: &str) -> Result<Vec<SqlRow>, String> {
        // Simple query protocol: every value comes back in text format.
        let rows = self
            .conn
            .fetch_all(sqlx::raw_sql(sql))
            .await
            .map_err(|e| e.to_string())?;
        rows.iter().map(row_to_json).collect()
    }

    async fn close(self: Box<Self>) {
        if let Err(e) = self.conn.close().await {
            debug!(target: "gremlin.pg", error = %e, "closing session failed");
        }
    }
}

fn row_to_json(row: &PgRow) -> Result<SqlRow, String> {
    let mut out = Map::with_capacity(row.len());
    for (idx, column) in row.columns().iter().enumerate() {
        let text: Option<String> = row.try_get_unchecked(idx).map_err(|e| e.to_string())?;
        let value = match text {
            Some(text) => text_to_json(column.type_info().name(), text),
            None => Value::Null,
        };
        out.insert(column.name().to_string(), value);
    }
    Ok(out)
}

/// Converts a text-format value into JSON by its PostgreSQL type name.
///
/// NUMERIC and everything without a JSON counterpart stays a string.
pub(crate) fn text_to_json(type_name: &str, text: String) -> Value {
    match type_name {
        "BOOL" => match text.as_str() {
            "t" | "true" => Value::Bool(true),
            "f" | "false" => Value::Bool(false),
            _ => Value::String(text),
        },
        "INT2" | "INT4" | "INT8" | "OID" => text
            .parse::<i64>()
            .map(Value::from)
            .unwrap_or(Value::String(text)),
        "FLOAT4" | "FLOAT8" => text
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .unwrap_or(Value::String(text)),
        "JSON" | "JSONB" => serde_json::from_str(&text).unwrap_or(Value::String(text)),
        _ => Value::String(text),
    }
}
