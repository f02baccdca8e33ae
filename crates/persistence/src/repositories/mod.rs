//! Repository implementations for database operations.

pub mod account;
pub mod component;
pub mod page;
pub mod query;
pub mod role;
pub mod user;

pub use account::AccountRepository;
pub use component::{ComponentRepository, ComponentUpdate};
pub use page::{PageRepository, PageUpdate};
pub use query::{NewQuery, QueryRepository, QueryUpdate};
pub use role::RoleRepository;
pub use user::UserRepository;
