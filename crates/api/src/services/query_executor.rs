//! Executes stored queries against the datastore.
//!
//! A query body runs with its `{{key}}` placeholders rewritten to bind
//! parameters, inside a read-only transaction bounded by the query's
//! statement timeout. The transaction is always rolled back.

use serde_json::Value as JsonValue;
use sqlx::postgres::{PgArguments, Postgres};
use sqlx::query::QueryScalar;
use sqlx::PgPool;
use std::collections::HashMap;
use std::time::Instant;
use thiserror::Error;

use domain::models::query::Query;
use domain::services::{PreparedStatement, TemplateError};

/// Error type for query execution.
#[derive(Debug, Error)]
pub enum QueryExecutionError {
    #[error("Query is invalid")]
    InvalidQuery,

    #[error(transparent)]
    Template(#[from] TemplateError),

    /// The statement itself failed (syntax, permissions, timeout).
    #[error("{0}")]
    Statement(String),

    /// The datastore could not be reached.
    #[error("Datastore error: {0}")]
    Datastore(sqlx::Error),
}

/// Rows produced by a query execution.
#[derive(Debug, Clone)]
pub struct ExecutionOutcome {
    pub rows: JsonValue,
    pub row_count: usize,
    pub duration_ms: u64,
}

type JsonScalar<'q> = QueryScalar<'q, Postgres, JsonValue, PgArguments>;

/// Runs stored queries in read-only transactions.
#[derive(Clone)]
pub struct QueryExecutor {
    pool: PgPool,
}

impl QueryExecutor {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Executes `query` with `params` bound to its template keys.
    pub async fn execute(
        &self,
        query: &Query,
        params: &HashMap<String, JsonValue>,
    ) -> Result<ExecutionOutcome, QueryExecutionError> {
        if !query.is_valid {
            return Err(QueryExecutionError::InvalidQuery);
        }

        let prepared = PreparedStatement::prepare(&query.body);
        let values = prepared.bind_values(params)?;
        let sql = wrap_as_json(&prepared.sql);

        let start = Instant::now();
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(QueryExecutionError::Datastore)?;

        sqlx::query("SET TRANSACTION READ ONLY")
            .execute(&mut *tx)
            .await
            .map_err(statement_error)?;
        sqlx::query("SELECT set_config('statement_timeout', $1, true)")
            .bind(query.timeout_ms.to_string())
            .execute(&mut *tx)
            .await
            .map_err(statement_error)?;

        let statement = values
            .into_iter()
            .fold(sqlx::query_scalar::<_, JsonValue>(&sql), bind_json);
        let rows = statement.fetch_one(&mut *tx).await.map_err(statement_error)?;

        if let Err(e) = tx.rollback().await {
            tracing::warn!(error = %e, query_id = %query.id, "Failed to roll back query transaction");
        }

        let row_count = rows.as_array().map_or(0, Vec::len);
        Ok(ExecutionOutcome {
            rows,
            row_count,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }
}

/// Aggregates every row of `sql` into one JSON array.
///
/// The body sits on its own lines so a trailing `--` comment cannot swallow
/// the closing parenthesis.
fn wrap_as_json(sql: &str) -> String {
    format!(
        "SELECT COALESCE(json_agg(t), '[]'::json) FROM (\n{}\n) t",
        sql
    )
}

/// Binds a parameter using the SQL type matching its JSON type.
fn bind_json<'q>(statement: JsonScalar<'q>, value: &'q JsonValue) -> JsonScalar<'q> {
    match value {
        JsonValue::String(s) => statement.bind(s.as_str()),
        JsonValue::Bool(b) => statement.bind(*b),
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => statement.bind(i),
            None => statement.bind(n.as_f64().unwrap_or_default()),
        },
        other => statement.bind(other.clone()),
    }
}

fn statement_error(err: sqlx::Error) -> QueryExecutionError {
    match err {
        sqlx::Error::Database(db_err) => QueryExecutionError::Statement(db_err.message().to_string()),
        other => QueryExecutionError::Datastore(other),
    }
}
