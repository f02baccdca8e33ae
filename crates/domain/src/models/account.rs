//! Account domain model.
//!
//! An account groups users and the tools they build.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    pub domain: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request payload for creating an account.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    #[validate(length(min = 1, max = 255, message = "Domain must be 1-255 characters"))]
    pub domain: Option<String>,
}

/// Request payload for updating an account (partial update).
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAccountRequest {
    pub id: Uuid,

    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,

    #[validate(length(min = 1, max = 255, message = "Domain must be 1-255 characters"))]
    pub domain: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_account_request() {
        let request: CreateAccountRequest =
            serde_json::from_str(r#"{"name": "Ops", "domain": "ops.example.com"}"#).unwrap();
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_create_account_empty_name() {
        let request = CreateAccountRequest {
            name: String::new(),
            domain: None,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_update_account_requires_id() {
        let result: Result<UpdateAccountRequest, _> = serde_json::from_str(r#"{"name": "Ops"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_update_account_long_name() {
        let request = UpdateAccountRequest {
            id: Uuid::new_v4(),
            name: Some("a".repeat(101)),
            domain: None,
        };
        assert!(request.validate().is_err());
    }
}
