//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod account;
pub mod component;
pub mod page;
pub mod query;
pub mod role;
pub mod user;

pub use account::AccountEntity;
pub use component::ComponentEntity;
pub use page::PageEntity;
pub use query::QueryEntity;
pub use role::RoleEntity;
pub use user::UserEntity;
