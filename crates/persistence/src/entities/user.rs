//! User entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;

use domain::models::{IdentityProviderKind, User};

/// Database row mapping for the users table.
#[derive(Debug, Clone, FromRow)]
pub struct UserEntity {
    pub id: Uuid,
    pub account_id: Option<Uuid>,
    pub role_id: Option<Uuid>,
    pub email: String,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub provider: String,
    pub provider_user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl From<UserEntity> for User {
    fn from(entity: UserEntity) -> Self {
        Self {
            id: entity.id,
            account_id: entity.account_id,
            role_id: entity.role_id,
            email: entity.email,
            name: entity.name,
            avatar_url: entity.avatar_url,
            provider: IdentityProviderKind::from_str(&entity.provider)
                .unwrap_or(IdentityProviderKind::Google), // Only provider stored so far
            provider_user_id: entity.provider_user_id,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
            last_login_at: entity.last_login_at,
        }
    }
}
