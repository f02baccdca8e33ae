//! Component domain model.
//!
//! A component is a configured UI widget (table, form, chart, ...) whose
//! properties are stored as an opaque JSON object.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    pub id: Uuid,
    pub account_id: Option<Uuid>,
    pub name: String,
    pub component_type: String,
    pub properties: JsonValue,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_properties() -> JsonValue {
    JsonValue::Object(Default::default())
}

/// Properties must be a JSON object.
pub(crate) fn validate_json_object(value: &JsonValue) -> Result<(), validator::ValidationError> {
    if value.is_object() {
        Ok(())
    } else {
        let mut err = validator::ValidationError::new("json_object");
        err.message = Some("Properties must be a JSON object".into());
        Err(err)
    }
}

/// Request payload for creating a component.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateComponentRequest {
    pub account_id: Option<Uuid>,

    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    #[validate(length(min = 1, max = 50, message = "Component type must be 1-50 characters"))]
    pub component_type: String,

    #[serde(default = "default_properties")]
    #[validate(custom(function = "validate_json_object"))]
    pub properties: JsonValue,
}

/// Request payload for updating a component (partial update).
///
/// The component is addressed by `id` in the body.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateComponentRequest {
    pub id: Uuid,

    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,

    #[validate(length(min = 1, max = 50, message = "Component type must be 1-50 characters"))]
    pub component_type: Option<String>,

    #[validate(custom(function = "validate_json_object"))]
    pub properties: Option<JsonValue>,
}
