//! Component repository for database operations.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::ComponentEntity;
use crate::metrics::QueryTimer;

/// Partial update for a component. `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct ComponentUpdate {
    pub name: Option<String>,
    pub component_type: Option<String>,
    pub properties: Option<serde_json::Value>,
}

/// Repository for component-related database operations.
#[derive(Clone)]
pub struct ComponentRepository {
    pool: PgPool,
}

impl ComponentRepository {
    /// Creates a new ComponentRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new component.
    pub async fn create(
        &self,
        account_id: Option<Uuid>,
        name: &str,
        component_type: &str,
        properties: &serde_json::Value,
    ) -> Result<ComponentEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_component");
        let result = sqlx::query_as::<_, ComponentEntity>(
            r#"
            INSERT INTO components (account_id, name, component_type, properties)
            VALUES ($1, $2, $3, $4)
            RETURNING id, account_id, name, component_type, properties, created_at, updated_at
            "#,
        )
        .bind(account_id)
        .bind(name)
        .bind(component_type)
        .bind(properties)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a component by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<ComponentEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_component_by_id");
        let result = sqlx::query_as::<_, ComponentEntity>(
            r#"
            SELECT id, account_id, name, component_type, properties, created_at, updated_at
            FROM components
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List components, newest first, optionally scoped to an account.
    pub async fn list(
        &self,
        account_id: Option<Uuid>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ComponentEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_components");
        let result = sqlx::query_as::<_, ComponentEntity>(
            r#"
            SELECT id, account_id, name, component_type, properties, created_at, updated_at
            FROM components
            WHERE ($1::uuid IS NULL OR account_id = $1)
            ORDER BY created_at DESC, id ASC
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

    /// Count components, optionally scoped to an account.
    pub async fn count(&self, account_id: Option<Uuid>) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_components");
        let result: Result<(i64,), sqlx::Error> = sqlx::query_as(
            "SELECT COUNT(*) FROM components WHERE ($1::uuid IS NULL OR account_id = $1)",
        )
        .bind(account_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        Ok(result?.0)
    }

    /// Apply a partial update. Returns `None` when the component does not exist.
    pub async fn update(
        &self,
        id: Uuid,
        update: &ComponentUpdate,
    ) -> Result<Option<ComponentEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_component");
        let result = sqlx::query_as::<_, ComponentEntity>(
            r#"
            UPDATE components
            SET name = COALESCE($2, name),
                component_type = COALESCE($3, component_type),
                properties = COALESCE($4, properties),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, account_id, name, component_type, properties, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(update.name.as_deref())
        .bind(update.component_type.as_deref())
        .bind(update.properties.as_ref())
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Delete a component. Returns the number of rows affected.
    pub async fn delete(&self, id: Uuid) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_component");
        let result = sqlx::query("DELETE FROM components WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await;
        timer.record();
        Ok(result?.rows_affected())
    }
}
