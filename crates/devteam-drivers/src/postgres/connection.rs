//! PostgreSQL connection implementation

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use devteam_core::{
    Connection, DevteamError, QueryResult, Result, Row, StatementResult, Value,
};
use tokio_postgres::types::ToSql;
use tokio_postgres::{Client, NoTls, Row as PgRow};
use uuid::Uuid;

fn format_postgres_error(error: &tokio_postgres::Error) -> String {
    let Some(db_error) = error.as_db_error() else {
        return error.to_string();
    };

    let code = db_error.code();
    let mut message = db_error.message().to_string();

    if let Some(detail) = db_error.detail() {
        if !detail.trim().is_empty() {
            message.push_str(&format!(" (detail: {})", detail));
        }
    }

    match code.code() {
        "23505" => format!("duplicate value violates unique constraint: {}", message),
        "23503" => format!("foreign key violation: {}", message),
        "23502" => format!("null value violates not-null constraint: {}", message),
        "22P02" => format!("invalid input syntax: {}", message),
        _ => format!("{} (code: {:?})", message, code),
    }
}

/// Convert DAO parameter values into postgres wire parameters
fn bind_params(params: &[Value]) -> Vec<Box<dyn ToSql + Sync + Send>> {
    params
        .iter()
        .map(|value| -> Box<dyn ToSql + Sync + Send> {
            match value {
                Value::Null => Box::new(Option::<String>::None),
                Value::Bool(v) => Box::new(*v),
                Value::Int32(v) => Box::new(*v),
                Value::Int64(v) => Box::new(*v),
                Value::Float64(v) => Box::new(*v),
                Value::String(v) => Box::new(v.clone()),
                Value::Bytes(v) => Box::new(v.clone()),
                Value::Uuid(v) => Box::new(*v),
                Value::DateTime(v) => Box::new(*v),
                Value::DateTimeUtc(v) => Box::new(*v),
            }
        })
        .collect()
}

/// Convert one result cell into a `Value`
fn convert_cell(row: &PgRow, idx: usize) -> Value {
    let type_name = row.columns()[idx].type_().name();

    match type_name {
        "bool" => row
            .try_get::<_, Option<bool>>(idx)
            .ok()
            .flatten()
            .map(Value::Bool)
            .unwrap_or(Value::Null),
        "int2" | "smallint" => row
            .try_get::<_, Option<i16>>(idx)
            .ok()
            .flatten()
            .map(|v| Value::Int32(v as i32))
            .unwrap_or(Value::Null),
        "int4" | "int" | "integer" => row
            .try_get::<_, Option<i32>>(idx)
            .ok()
            .flatten()
            .map(Value::Int32)
            .unwrap_or(Value::Null),
        "int8" | "bigint" => row
            .try_get::<_, Option<i64>>(idx)
            .ok()
            .flatten()
            .map(Value::Int64)
            .unwrap_or(Value::Null),
        "float4" | "real" => row
            .try_get::<_, Option<f32>>(idx)
            .ok()
            .flatten()
            .map(|v| Value::Float64(v as f64))
            .unwrap_or(Value::Null),
        "float8" | "double precision" => row
            .try_get::<_, Option<f64>>(idx)
            .ok()
            .flatten()
            .map(Value::Float64)
            .unwrap_or(Value::Null),
        "text" | "varchar" | "char" | "bpchar" | "name" => row
            .try_get::<_, Option<String>>(idx)
            .ok()
            .flatten()
            .map(Value::String)
            .unwrap_or(Value::Null),
        "bytea" => row
            .try_get::<_, Option<Vec<u8>>>(idx)
            .ok()
            .flatten()
            .map(Value::Bytes)
            .unwrap_or(Value::Null),
        "uuid" => row
            .try_get::<_, Option<Uuid>>(idx)
            .ok()
            .flatten()
            .map(Value::Uuid)
            .unwrap_or(Value::Null),
        "timestamp" => row
            .try_get::<_, Option<NaiveDateTime>>(idx)
            .ok()
            .flatten()
            .map(Value::DateTime)
            .unwrap_or(Value::Null),
        "timestamptz" => row
            .try_get::<_, Option<DateTime<Utc>>>(idx)
            .ok()
            .flatten()
            .map(Value::DateTimeUtc)
            .unwrap_or(Value::Null),
        other => {
            // Last resort: let the driver render the column as text
            match row.try_get::<_, Option<String>>(idx) {
                Ok(v) => v.map(Value::String).unwrap_or(Value::Null),
                Err(_) => {
                    tracing::warn!(column_type = %other, "unmapped postgres column type");
                    Value::Null
                }
            }
        }
    }
}

fn convert_rows(pg_rows: Vec<PgRow>) -> (Vec<String>, Vec<Row>) {
    let columns: Vec<String> = pg_rows
        .first()
        .map(|row| row.columns().iter().map(|c| c.name().to_string()).collect())
        .unwrap_or_default();

    let mut rows = Vec::with_capacity(pg_rows.len());
    for pg_row in &pg_rows {
        let values = (0..pg_row.columns().len())
            .map(|idx| convert_cell(pg_row, idx))
            .collect();
        rows.push(Row::new(columns.clone(), values));
    }

    (columns, rows)
}

/// PostgreSQL connection wrapper
///
/// The background connection task is spawned at connect time and ends when
/// the client is dropped. `close` only marks the session; the pool drops
/// its handle afterwards, which tears the socket down.
pub struct PostgresConnection {
    client: Client,
    closed: AtomicBool,
}

impl PostgresConnection {
    /// Connect to a PostgreSQL database
    pub async fn connect(
        host: &str,
        port: u16,
        database: &str,
        user: Option<&str>,
        password: Option<&str>,
    ) -> Result<Self> {
        tracing::info!(host = %host, port = %port, database = %database, "connecting to PostgreSQL");

        let mut config = tokio_postgres::Config::new();
        config.host(host).port(port).dbname(database);

        if let Some(u) = user {
            config.user(u);
        }
        if let Some(p) = password {
            config.password(p);
        }

        let (client, connection) = config
            .connect(NoTls)
            .await
            .map_err(|e| DevteamError::Connection(format_postgres_error(&e)))?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::warn!(error = %e, "postgres connection task ended with error");
            }
        });

        Ok(Self {
            client,
            closed: AtomicBool::new(false),
        })
    }
}

#[async_trait]
impl Connection for PostgresConnection {
    fn driver_name(&self) -> &str {
        "postgres"
    }

    async fn execute(&self, sql: &str, params: &[Value]) -> Result<StatementResult> {
        let boxed = bind_params(params);
        let refs: Vec<&(dyn ToSql + Sync)> = boxed
            .iter()
            .map(|b| b.as_ref() as &(dyn ToSql + Sync))
            .collect();

        let affected = self
            .client
            .execute(sql, &refs)
            .await
            .map_err(|e| DevteamError::Query(format_postgres_error(&e)))?;

        Ok(StatementResult::new(affected))
    }

    async fn query(&self, sql: &str, params: &[Value]) -> Result<QueryResult> {
        let boxed = bind_params(params);
        let refs: Vec<&(dyn ToSql + Sync)> = boxed
            .iter()
            .map(|b| b.as_ref() as &(dyn ToSql + Sync))
            .collect();

        let start = Instant::now();
        let pg_rows = self
            .client
            .query(sql, &refs)
            .await
            .map_err(|e| DevteamError::Query(format_postgres_error(&e)))?;

        let (columns, rows) = convert_rows(pg_rows);
        let mut result = QueryResult::new(columns, rows);
        result.execution_time_ms = start.elapsed().as_millis() as u64;
        Ok(result)
    }

    async fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst) || self.client.is_closed()
    }
}
