//! Account entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use domain::models::Account;

/// Database row mapping for the accounts table.
#[derive(Debug, Clone, FromRow)]
pub struct AccountEntity {
    pub id: Uuid,
    pub name: String,
    pub domain: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<AccountEntity> for Account {
    fn from(entity: AccountEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            domain: entity.domain,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_entity_conversion() {
        let entity = AccountEntity {
            id: Uuid::new_v4(),
            name: "Support".to_string(),
            domain: Some("support.example.com".to_string()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let id = entity.id;
        let account: Account = entity.into();
        assert_eq!(account.id, id);
        assert_eq!(account.name, "Support");
        assert_eq!(account.domain.as_deref(), Some("support.example.com"));
    }
}
