//! Page domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;
use validator::Validate;

/// A page lays out components under a URL slug.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: Uuid,
    pub account_id: Option<Uuid>,
    pub name: String,
    pub slug: String,
    pub layout: JsonValue,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Regex for slug validation
lazy_static::lazy_static! {
    pub static ref PAGE_SLUG_REGEX: regex::Regex = regex::Regex::new(r"^[a-z0-9][a-z0-9-]*$").unwrap();
}

/// Validate slug format: lowercase alphanumeric with hyphens, no leading hyphen.
fn validate_slug(slug: &str) -> Result<(), validator::ValidationError> {
    if PAGE_SLUG_REGEX.is_match(slug) {
        Ok(())
    } else {
        Err(validator::ValidationError::new("slug_format").with_message(
            std::borrow::Cow::Borrowed("Slug must be lowercase alphanumeric with hyphens"),
        ))
    }
}

fn default_layout() -> JsonValue {
    JsonValue::Array(Vec::new())
}

/// Request payload for creating a page.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePageRequest {
    pub account_id: Option<Uuid>,

    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    #[validate(length(min = 1, max = 100, message = "Slug must be 1-100 characters"))]
    #[validate(custom(function = "validate_slug"))]
    pub slug: String,

    #[serde(default = "default_layout")]
    pub layout: JsonValue,
}

/// Request payload for updating a page (partial update).
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePageRequest {
    pub id: Uuid,

    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,

    #[validate(length(min = 1, max = 100, message = "Slug must be 1-100 characters"))]
    #[validate(custom(function = "validate_slug"))]
    pub slug: Option<String>,

    pub layout: Option<JsonValue>,
}
