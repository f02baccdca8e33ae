//! Page repository for database operations.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::PageEntity;
use crate::metrics::QueryTimer;

/// Partial update for a page. `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct PageUpdate {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub layout: Option<serde_json::Value>,
}

/// Repository for page-related database operations.
#[derive(Clone)]
pub struct PageRepository {
    pool: PgPool,
}

impl PageRepository {
    /// Creates a new PageRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new page. A duplicate slug within the account violates a
    /// unique index and surfaces as a database error.
    pub async fn create(
        &self,
        account_id: Option<Uuid>,
        name: &str,
        slug: &str,
        layout: &serde_json::Value,
    ) -> Result<PageEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_page");
        let result = sqlx::query_as::<_, PageEntity>(
            r#"
            INSERT INTO pages (account_id, name, slug, layout)
            VALUES ($1, $2, $3, $4)
            RETURNING id, account_id, name, slug, layout, created_at, updated_at
            "#,
        )
        .bind(account_id)
        .bind(name)
        .bind(slug)
        .bind(layout)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a page by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<PageEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_page_by_id");
        let result = sqlx::query_as::<_, PageEntity>(
            r#"
            SELECT id, account_id, name, slug, layout, created_at, updated_at
            FROM pages
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List pages ordered by slug, optionally scoped to an account.
    pub async fn list(
        &self,
        account_id: Option<Uuid>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PageEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_pages");
        let result = sqlx::query_as::<_, PageEntity>(
            r#"
            SELECT id, account_id, name, slug, layout, created_at, updated_at
            FROM pages
            WHERE ($1::uuid IS NULL OR account_id = $1)
            ORDER BY slug ASC, id ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(account_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Count pages, optionally scoped to an account.
    pub async fn count(&self, account_id: Option<Uuid>) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_pages");
        let result: Result<(i64,), sqlx::Error> =
            sqlx::query_as("SELECT COUNT(*) FROM pages WHERE ($1::uuid IS NULL OR account_id = $1)")
                .bind(account_id)
                .fetch_one(&self.pool)
                .await;
        timer.record();
        Ok(result?.0)
    }

    /// Apply a partial update. Returns `None` when the page does not exist.
    pub async fn update(
        &self,
        id: Uuid,
        update: &PageUpdate,
    ) -> Result<Option<PageEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_page");
        let result = sqlx::query_as::<_, PageEntity>(
            r#"
            UPDATE pages
            SET name = COALESCE($2, name),
                slug = COALESCE($3, slug),
                layout = COALESCE($4, layout),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, account_id, name, slug, layout, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(update.name.as_deref())
        .bind(update.slug.as_deref())
        .bind(update.layout.as_ref())
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Delete a page. Queries attached to it are detached.
    pub async fn delete(&self, id: Uuid) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_page");
        let result = sqlx::query("DELETE FROM pages WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await;
        timer.record();
        Ok(result?.rows_affected())
    }
}
