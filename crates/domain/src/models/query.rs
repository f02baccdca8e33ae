//! Query domain model.
//!
//! A query is a stored, named SQL statement that the UI can execute with
//! runtime parameters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

/// Default statement timeout for executed queries.
pub const DEFAULT_QUERY_TIMEOUT_MS: i32 = 10_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Query {
    pub id: Uuid,
    pub account_id: Option<Uuid>,
    pub page_id: Option<Uuid>,
    pub name: String,
    pub query_type: QueryType,
    pub body: String,
    pub timeout_ms: i32,
    pub is_valid: bool,
    pub invalids: Vec<String>,
    pub template_keys: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Kinds of query the server can execute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryType {
    #[default]
    Sql,
}

impl QueryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryType::Sql => "sql",
        }
    }
}

impl FromStr for QueryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sql" => Ok(QueryType::Sql),
            _ => Err(format!("Invalid query type: {}", s)),
        }
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

fn default_timeout_ms() -> i32 {
    DEFAULT_QUERY_TIMEOUT_MS
}

/// Name must contain something other than whitespace.
fn validate_name_present(name: &str) -> Result<(), validator::ValidationError> {
    if name.trim().is_empty() {
        let mut err = validator::ValidationError::new("name_required");
        err.message = Some("Name is required".into());
        Err(err)
    } else {
        Ok(())
    }
}

/// Request payload for creating a query.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateQueryRequest {
    pub account_id: Option<Uuid>,
    pub page_id: Option<Uuid>,

    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    #[validate(custom(function = "validate_name_present"))]
    pub name: String,

    #[serde(default)]
    pub query_type: QueryType,

    #[serde(default)]
    #[validate(length(max = 65536, message = "Body must be at most 65536 characters"))]
    pub body: String,

    #[serde(default = "default_timeout_ms")]
    #[validate(range(min = 100, max = 60000, message = "Timeout must be 100-60000 ms"))]
    pub timeout_ms: i32,
}

/// Request payload for updating a query (partial update).
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateQueryRequest {
    pub id: Uuid,

    pub page_id: Option<Uuid>,

    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    #[validate(custom(function = "validate_name_present"))]
    pub name: Option<String>,

    pub query_type: Option<QueryType>,

    #[validate(length(max = 65536, message = "Body must be at most 65536 characters"))]
    pub body: Option<String>,

    #[validate(range(min = 100, max = 60000, message = "Timeout must be 100-60000 ms"))]
    pub timeout_ms: Option<i32>,
}

/// Request payload for executing a stored query.
///
/// Exactly one of `id` or `name` identifies the query.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteQueryRequest {
    pub id: Option<Uuid>,
    pub name: Option<String>,
    #[serde(default)]
    pub params: HashMap<String, JsonValue>,
}

/// Which stored query an execution targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryTarget {
    Id(Uuid),
    Name(String),
}

impl ExecuteQueryRequest {
    /// Resolves the target, rejecting requests naming zero or two queries.
    pub fn target(&self) -> Result<QueryTarget, String> {
        match (&self.id, &self.name) {
            (Some(id), None) => Ok(QueryTarget::Id(*id)),
            (None, Some(name)) if !name.trim().is_empty() => {
                Ok(QueryTarget::Name(name.trim().to_string()))
            }
            (Some(_), Some(_)) => Err("Provide either id or name, not both".to_string()),
            _ => Err("Query id or name is required".to_string()),
        }
    }

    /// Name of the first parameter whose value is null, if any.
    pub fn first_null_param(&self) -> Option<&str> {
        let mut keys: Vec<&String> = self
            .params
            .iter()
            .filter(|(_, v)| v.is_null())
            .map(|(k, _)| k)
            .collect();
        keys.sort();
        keys.first().map(|k| k.as_str())
    }
}

/// Result of executing a query.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryExecutionResponse {
    pub query_id: Uuid,
    pub rows: JsonValue,
    pub row_count: usize,
    pub duration_ms: u64,
}
