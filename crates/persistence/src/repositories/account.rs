//! Account repository for database operations.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::AccountEntity;
use crate::metrics::QueryTimer;

/// Repository for account-related database operations.
#[derive(Clone)]
pub struct AccountRepository {
    pool: PgPool,
}

impl AccountRepository {
    /// Creates a new AccountRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new account.
    pub async fn create(
        &self,
        name: &str,
        domain: Option<&str>,
    ) -> Result<AccountEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_account");
        let result = sqlx::query_as::<_, AccountEntity>(
            r#"
            INSERT INTO accounts (name, domain)
            VALUES ($1, $2)
            RETURNING id, name, domain, created_at, updated_at
            "#,
        )
        .bind(name)
        .bind(domain)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find an account by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<AccountEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_account_by_id");
        let result = sqlx::query_as::<_, AccountEntity>(
            r#"
            SELECT id, name, domain, created_at, updated_at
            FROM accounts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List accounts ordered by name.
    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<AccountEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_accounts");
        let result = sqlx::query_as::<_, AccountEntity>(
            r#"
            SELECT id, name, domain, created_at, updated_at
            FROM accounts
            ORDER BY name ASC, id ASC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Count all accounts.
    pub async fn count(&self) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_accounts");
        let result: Result<(i64,), sqlx::Error> =
            sqlx::query_as("SELECT COUNT(*) FROM accounts")
                .fetch_one(&self.pool)
                .await;
        timer.record();
        Ok(result?.0)
    }

    /// Update an account. `None` fields keep their current value.
    pub async fn update(
        &self,
        id: Uuid,
        name: Option<&str>,
        domain: Option<&str>,
    ) -> Result<Option<AccountEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_account");
        let result = sqlx::query_as::<_, AccountEntity>(
            r#"
            UPDATE accounts
            SET name = COALESCE($2, name),
                domain = COALESCE($3, domain),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, domain, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(domain)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Delete an account. Records referencing it are detached, not removed.
    /// Returns the number of rows affected (0 if not found).
    pub async fn delete(&self, id: Uuid) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_account");
        let result = sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await;
        timer.record();
        Ok(result?.rows_affected())
    }
}
