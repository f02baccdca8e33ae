//! Role repository for database operations.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::RoleEntity;
use crate::metrics::QueryTimer;

/// Repository for role lookups. Roles are seeded by migrations.
#[derive(Clone)]
pub struct RoleRepository {
    pool: PgPool,
}

impl RoleRepository {
    /// Creates a new RoleRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List all roles ordered by name.
    pub async fn list(&self) -> Result<Vec<RoleEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_roles");
        let result = sqlx::query_as::<_, RoleEntity>(
            r#"
            SELECT id, name, description, created_at
            FROM roles
            ORDER BY name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a role by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<RoleEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_role_by_id");
        let result = sqlx::query_as::<_, RoleEntity>(
            r#"
            SELECT id, name, description, created_at
            FROM roles
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }
}
