//! User repository for database operations.

use sqlx::PgPool;
use uuid::Uuid;

use domain::models::user::ProviderIdentity;

use crate::entities::UserEntity;
use crate::metrics::QueryTimer;

/// Repository for user-related database operations.
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Creates a new UserRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a user by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_user_by_id");
        let result = sqlx::query_as::<_, UserEntity>(
            r#"
            SELECT id, account_id, role_id, email, name, avatar_url, provider,
                   provider_user_id, created_at, updated_at, last_login_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a user by email (case-insensitive).
    pub async fn find_by_email(&self, email: &str) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_user_by_email");
        let result = sqlx::query_as::<_, UserEntity>(
            r#"
            SELECT id, account_id, role_id, email, name, avatar_url, provider,
                   provider_user_id, created_at, updated_at, last_login_at
            FROM users
            WHERE LOWER(email) = LOWER($1)
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Record a login for a provider identity.
    ///
    /// Matches on provider + provider user id first, then falls back to the
    /// email address (linking the identity to that user). Creates the user
    /// when neither matches. Runs in one transaction.
    pub async fn upsert_from_identity(
        &self,
        identity: &ProviderIdentity,
    ) -> Result<UserEntity, sqlx::Error> {
        let timer = QueryTimer::new("upsert_user_from_identity");
        let result = self.upsert_in_tx(identity).await;
        timer.record();
        result
    }

    async fn upsert_in_tx(&self, identity: &ProviderIdentity) -> Result<UserEntity, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        let provider = identity.provider.as_str();

        let by_identity = sqlx::query_as::<_, UserEntity>(
            r#"
            UPDATE users
            SET email = $3,
                name = COALESCE($4, name),
                avatar_url = COALESCE($5, avatar_url),
                last_login_at = NOW(),
                updated_at = NOW()
            WHERE provider = $1 AND provider_user_id = $2
            RETURNING id, account_id, role_id, email, name, avatar_url, provider,
                      provider_user_id, created_at, updated_at, last_login_at
            "#,
        )
        .bind(provider)
        .bind(&identity.provider_user_id)
        .bind(&identity.email)
        .bind(identity.name.as_deref())
        .bind(identity.avatar_url.as_deref())
        .fetch_optional(&mut *tx)
        .await?;

        if let Some(user) = by_identity {
            tx.commit().await?;
            return Ok(user);
        }

        let by_email = sqlx::query_as::<_, UserEntity>(
            r#"
            UPDATE users
            SET provider = $1,
                provider_user_id = $2,
                name = COALESCE($4, name),
                avatar_url = COALESCE($5, avatar_url),
                last_login_at = NOW(),
                updated_at = NOW()
            WHERE LOWER(email) = LOWER($3)
            RETURNING id, account_id, role_id, email, name, avatar_url, provider,
                      provider_user_id, created_at, updated_at, last_login_at
            "#,
        )
        .bind(provider)
        .bind(&identity.provider_user_id)
        .bind(&identity.email)
        .bind(identity.name.as_deref())
        .bind(identity.avatar_url.as_deref())
        .fetch_optional(&mut *tx)
        .await?;

        let user = match by_email {
            Some(user) => user,
            None => {
                sqlx::query_as::<_, UserEntity>(
                    r#"
                    INSERT INTO users (email, name, avatar_url, provider, provider_user_id, last_login_at)
                    VALUES ($1, $2, $3, $4, $5, NOW())
                    RETURNING id, account_id, role_id, email, name, avatar_url, provider,
                              provider_user_id, created_at, updated_at, last_login_at
                    "#,
                )
                .bind(&identity.email)
                .bind(identity.name.as_deref())
                .bind(identity.avatar_url.as_deref())
                .bind(provider)
                .bind(&identity.provider_user_id)
                .fetch_one(&mut *tx)
                .await?
            }
        };

        tx.commit().await?;
        Ok(user)
    }
}
