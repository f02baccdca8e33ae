//! Domain services.
//!
//! Services contain logic that operates on domain models without touching
//! the database.

pub mod query_template;

pub use query_template::{
    extract_template_keys, inspect_query, PreparedStatement, QueryInspection, TemplateError,
};
