//! Query body templates.
//!
//! A stored query body may reference runtime parameters as `{{key}}`.
//! Before execution every placeholder is rewritten into a positional bind
//! parameter (`$1`, `$2`, ...) so that parameter values never become part of
//! the SQL text. A placeholder wrapped in single quotes (`'{{key}}'`) is
//! treated as the same bind parameter, quotes included.

use std::collections::{BTreeSet, HashMap};

use serde_json::Value as JsonValue;
use thiserror::Error;

lazy_static::lazy_static! {
    static ref PLACEHOLDER_REGEX: regex::Regex =
        regex::Regex::new(r"('?)\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}('?)").unwrap();

    /// Valid query names are plain identifiers.
    pub static ref QUERY_NAME_REGEX: regex::Regex =
        regex::Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();
}

/// Reason recorded when a query name is not an identifier.
pub const INVALID_NAME_REASON: &str = "Invalid query name";

/// Reason recorded when a query has no body.
pub const EMPTY_BODY_REASON: &str = "No body found in query";

/// Errors raised while binding parameters to a template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("Missing value for parameter '{0}'")]
    MissingParam(String),

    #[error("Parameter '{0}' must not be null")]
    NullParam(String),
}

/// Result of validating a query definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryInspection {
    pub is_valid: bool,
    pub invalids: Vec<String>,
    pub template_keys: Vec<String>,
}

/// Checks a query definition and extracts its template keys.
///
/// Invalid queries are still stored; they are rejected at execution time.
pub fn inspect_query(name: &str, body: &str) -> QueryInspection {
    let mut invalids = Vec::new();

    if !QUERY_NAME_REGEX.is_match(name.trim()) {
        invalids.push(INVALID_NAME_REASON.to_string());
    }
    if body.trim().is_empty() {
        invalids.push(EMPTY_BODY_REASON.to_string());
    }

    QueryInspection {
        is_valid: invalids.is_empty(),
        invalids,
        template_keys: extract_template_keys(body),
    }
}

/// Returns the sorted, de-duplicated placeholder names in `body`.
pub fn extract_template_keys(body: &str) -> Vec<String> {
    PLACEHOLDER_REGEX
        .captures_iter(body)
        .map(|caps| caps[2].to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// A query body rewritten to use positional bind parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedStatement {
    /// SQL text with `$n` placeholders and no trailing semicolon.
    pub sql: String,
    /// Parameter names in bind order; `bind_keys[0]` binds to `$1`.
    pub bind_keys: Vec<String>,
}

impl PreparedStatement {
    /// Rewrites every `{{key}}` in `body` to `$n`, numbering keys by first
    /// appearance. Repeated keys reuse their number.
    pub fn prepare(body: &str) -> Self {
        let mut bind_keys: Vec<String> = Vec::new();

        let sql = PLACEHOLDER_REGEX.replace_all(body, |caps: &regex::Captures<'_>| {
            let key = &caps[2];
            let position = match bind_keys.iter().position(|k| k == key) {
                Some(idx) => idx + 1,
                None => {
                    bind_keys.push(key.to_string());
                    bind_keys.len()
                }
            };

            let (open, close) = (&caps[1], &caps[3]);
            if !open.is_empty() && !close.is_empty() {
                format!("${}", position)
            } else {
                format!("{}${}{}", open, position, close)
            }
        });

        let sql = sql.trim().trim_end_matches(';').trim_end().to_string();

        Self { sql, bind_keys }
    }

    /// Resolves the value for each bind parameter, in bind order.
    pub fn bind_values<'a>(
        &self,
        params: &'a HashMap<String, JsonValue>,
    ) -> Result<Vec<&'a JsonValue>, TemplateError> {
        self.bind_keys
            .iter()
            .map(|key| match params.get(key) {
                None => Err(TemplateError::MissingParam(key.clone())),
                Some(JsonValue::Null) => Err(TemplateError::NullParam(key.clone())),
                Some(value) => Ok(value),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_keys_sorted_and_unique() {
        let keys = extract_template_keys(
            "SELECT * FROM users WHERE id = {{userId}} AND team = {{ team }} OR id = {{userId}}",
        );
        assert_eq!(keys, vec!["team".to_string(), "userId".to_string()]);
    }

    #[test]
    fn test_extract_keys_none() {
        assert!(extract_template_keys("SELECT 1").is_empty());
        assert!(extract_template_keys("SELECT '{{ not a key }}'").is_empty());
    }

    #[test]
    fn test_prepare_numbers_by_first_appearance() {
        let stmt = PreparedStatement::prepare(
            "SELECT * FROM t WHERE b = {{b}} AND a = {{a}} AND c = {{b}};",
        );
        assert_eq!(stmt.sql, "SELECT * FROM t WHERE b = $1 AND a = $2 AND c = $1");
        assert_eq!(stmt.bind_keys, vec!["b".to_string(), "a".to_string()]);
    }

    #[test]
    fn test_prepare_strips_quotes_around_placeholder() {
        let stmt = PreparedStatement::prepare("SELECT * FROM t WHERE name = '{{name}}'");
        assert_eq!(stmt.sql, "SELECT * FROM t WHERE name = $1");
    }

    #[test]
    fn test_prepare_keeps_unbalanced_quote() {
        let stmt = PreparedStatement::prepare("SELECT '{{a}} || 'x'");
        assert_eq!(stmt.sql, "SELECT '$1 || 'x'");
    }

    #[test]
    fn test_prepare_without_placeholders() {
        let stmt = PreparedStatement::prepare("  SELECT 1  ;; ");
        assert_eq!(stmt.sql, "SELECT 1");
        assert!(stmt.bind_keys.is_empty());
    }

    #[test]
    fn test_bind_values_in_order() {
        let stmt = PreparedStatement::prepare("SELECT {{b}}, {{a}}");
        let params: HashMap<String, JsonValue> =
            [("a".to_string(), json!(1)), ("b".to_string(), json!("x"))]
                .into_iter()
                .collect();

        let values = stmt.bind_values(&params).unwrap();
        assert_eq!(values, vec![&json!("x"), &json!(1)]);
    }

    #[test]
    fn test_bind_values_missing() {
        let stmt = PreparedStatement::prepare("SELECT {{a}}");
        let params = HashMap::new();
        assert_eq!(
            stmt.bind_values(&params),
            Err(TemplateError::MissingParam("a".to_string()))
        );
    }

    #[test]
    fn test_bind_values_null() {
        let stmt = PreparedStatement::prepare("SELECT {{a}}");
        let params: HashMap<String, JsonValue> =
            [("a".to_string(), JsonValue::Null)].into_iter().collect();
        assert_eq!(
            stmt.bind_values(&params),
            Err(TemplateError::NullParam("a".to_string()))
        );
    }

    #[test]
    fn test_inspect_valid_query() {
        let inspection = inspect_query("getUsers", "SELECT * FROM users WHERE id = {{id}}");
        assert!(inspection.is_valid);
        assert!(inspection.invalids.is_empty());
        assert_eq!(inspection.template_keys, vec!["id".to_string()]);
    }

    #[test]
    fn test_inspect_invalid_name_and_body() {
        let inspection = inspect_query("get-users", "   ");
        assert!(!inspection.is_valid);
        assert_eq!(
            inspection.invalids,
            vec![INVALID_NAME_REASON.to_string(), EMPTY_BODY_REASON.to_string()]
        );
    }

    #[test]
    fn test_query_name_regex() {
        assert!(QUERY_NAME_REGEX.is_match("_private1"));
        assert!(!QUERY_NAME_REGEX.is_match("1query"));
        assert!(!QUERY_NAME_REGEX.is_match("with space"));
    }
}
