//! Query repository for database operations.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::QueryEntity;
use crate::metrics::QueryTimer;

const QUERY_COLUMNS: &str = "id, account_id, page_id, name, query_type, body, timeout_ms, \
                             is_valid, invalids, template_keys, created_at, updated_at";

/// Fields for inserting a query.
#[derive(Debug, Clone)]
pub struct NewQuery {
    pub account_id: Option<Uuid>,
    pub page_id: Option<Uuid>,
    pub name: String,
    pub query_type: String,
    pub body: String,
    pub timeout_ms: i32,
    pub is_valid: bool,
    pub invalids: Vec<String>,
    pub template_keys: Vec<String>,
}

/// Partial update for a query.
///
/// Validity and template keys are always rewritten since they are derived
/// from the merged name and body.
#[derive(Debug, Clone, Default)]
pub struct QueryUpdate {
    pub page_id: Option<Uuid>,
    pub name: Option<String>,
    pub query_type: Option<String>,
    pub body: Option<String>,
    pub timeout_ms: Option<i32>,
    pub is_valid: bool,
    pub invalids: Vec<String>,
    pub template_keys: Vec<String>,
}

/// Repository for query-related database operations.
#[derive(Clone)]
pub struct QueryRepository {
    pool: PgPool,
}

impl QueryRepository {
    /// Creates a new QueryRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new query.
    pub async fn create(&self, query: &NewQuery) -> Result<QueryEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_query");
        let sql = format!(
            r#"
            INSERT INTO queries (account_id, page_id, name, query_type, body, timeout_ms,
                                 is_valid, invalids, template_keys)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {QUERY_COLUMNS}
            "#
        );
        let result = sqlx::query_as::<_, QueryEntity>(&sql)
            .bind(query.account_id)
            .bind(query.page_id)
            .bind(&query.name)
            .bind(&query.query_type)
            .bind(&query.body)
            .bind(query.timeout_ms)
            .bind(query.is_valid)
            .bind(&query.invalids)
            .bind(&query.template_keys)
            .fetch_one(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Find a query by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<QueryEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_query_by_id");
        let sql = format!("SELECT {QUERY_COLUMNS} FROM queries WHERE id = $1");
        let result = sqlx::query_as::<_, QueryEntity>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Find a query by name. Names are not unique; the most recently
    /// updated query wins.
    pub async fn find_by_name(&self, name: &str) -> Result<Option<QueryEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_query_by_name");
        let sql = format!(
            "SELECT {QUERY_COLUMNS} FROM queries WHERE name = $1 \
             ORDER BY updated_at DESC, id ASC LIMIT 1"
        );
        let result = sqlx::query_as::<_, QueryEntity>(&sql)
            .bind(name)
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        result
    }

    /// List queries ordered by name, optionally scoped to an account.
    pub async fn list(
        &self,
        account_id: Option<Uuid>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<QueryEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_queries");
        let sql = format!(
            "SELECT {QUERY_COLUMNS} FROM queries \
             WHERE ($1::uuid IS NULL OR account_id = $1) \
             ORDER BY name ASC, id ASC \
             LIMIT $2 OFFSET $3"
        );
        let result = sqlx::query_as::<_, QueryEntity>(&sql)
            .bind(account_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Count queries, optionally scoped to an account.
    pub async fn count(&self, account_id: Option<Uuid>) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_queries");
        let result: Result<(i64,), sqlx::Error> = sqlx::query_as(
            "SELECT COUNT(*) FROM queries WHERE ($1::uuid IS NULL OR account_id = $1)",
        )
        .bind(account_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        Ok(result?.0)
    }

    /// Apply a partial update. Returns `None` when the query does not exist.
    pub async fn update(
        &self,
        id: Uuid,
        update: &QueryUpdate,
    ) -> Result<Option<QueryEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_query");
        let sql = format!(
            r#"
            UPDATE queries
            SET page_id = COALESCE($2, page_id),
                name = COALESCE($3, name),
                query_type = COALESCE($4, query_type),
                body = COALESCE($5, body),
                timeout_ms = COALESCE($6, timeout_ms),
                is_valid = $7,
                invalids = $8,
                template_keys = $9,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {QUERY_COLUMNS}
            "#
        );
        let result = sqlx::query_as::<_, QueryEntity>(&sql)
            .bind(id)
            .bind(update.page_id)
            .bind(update.name.as_deref())
            .bind(update.query_type.as_deref())
            .bind(update.body.as_deref())
            .bind(update.timeout_ms)
            .bind(update.is_valid)
            .bind(&update.invalids)
            .bind(&update.template_keys)
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Delete a query. Returns the number of rows affected.
    pub async fn delete(&self, id: Uuid) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_query");
        let result = sqlx::query("DELETE FROM queries WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await;
        timer.record();
        Ok(result?.rows_affected())
    }
}
