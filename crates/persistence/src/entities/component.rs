//! Component entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use domain::models::Component;

/// Database row mapping for the components table.
#[derive(Debug, Clone, FromRow)]
pub struct ComponentEntity {
    pub id: Uuid,
    pub account_id: Option<Uuid>,
    pub name: String,
    pub component_type: String,
    pub properties: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ComponentEntity> for Component {
    fn from(entity: ComponentEntity) -> Self {
        Self {
            id: entity.id,
            account_id: entity.account_id,
            name: entity.name,
            component_type: entity.component_type,
            properties: entity.properties,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
