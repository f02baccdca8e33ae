//! Page entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use domain::models::Page;

/// Database row mapping for the pages table.
#[derive(Debug, Clone, FromRow)]
pub struct PageEntity {
    pub id: Uuid,
    pub account_id: Option<Uuid>,
    pub name: String,
    pub slug: String,
    pub layout: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PageEntity> for Page {
    fn from(entity: PageEntity) -> Self {
        Self {
            id: entity.id,
            account_id: entity.account_id,
            name: entity.name,
            slug: entity.slug,
            layout: entity.layout,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
