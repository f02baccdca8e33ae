//! Query entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;

use domain::models::query::{Query, QueryType};

/// Database row mapping for the queries table.
#[derive(Debug, Clone, FromRow)]
pub struct QueryEntity {
    pub id: Uuid,
    pub account_id: Option<Uuid>,
    pub page_id: Option<Uuid>,
    pub name: String,
    pub query_type: String,
    pub body: String,
    pub timeout_ms: i32,
    pub is_valid: bool,
    pub invalids: Vec<String>,
    pub template_keys: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<QueryEntity> for Query {
    fn from(entity: QueryEntity) -> Self {
        Self {
            id: entity.id,
            account_id: entity.account_id,
            page_id: entity.page_id,
            name: entity.name,
            query_type: QueryType::from_str(&entity.query_type).unwrap_or_default(),
            body: entity.body,
            timeout_ms: entity.timeout_ms,
            is_valid: entity.is_valid,
            invalids: entity.invalids,
            template_keys: entity.template_keys,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
