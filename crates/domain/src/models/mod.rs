//! Domain models for the internal tools backend.

pub mod account;
pub mod component;
pub mod list;
pub mod page;
pub mod query;
pub mod role;
pub mod user;

pub use account::Account;
pub use component::Component;
pub use list::{ListParams, ListResponse};
pub use page::Page;
pub use query::Query;
pub use role::Role;
pub use user::{IdentityProviderKind, User};
