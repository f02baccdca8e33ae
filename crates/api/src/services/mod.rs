//! Services used by route handlers.

pub mod cookies;
pub mod oauth;
pub mod query_executor;

pub use cookies::CookieHelper;
pub use oauth::{GoogleProvider, IdentityProvider, OAuthError, ProviderRegistry};
pub use query_executor::{ExecutionOutcome, QueryExecutionError, QueryExecutor};
