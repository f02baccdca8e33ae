//! Domain layer for the internal tools backend.
//!
//! This crate contains:
//! - Domain models (Account, Component, Page, Query, Role, User)
//! - Request/response payloads with validation rules
//! - Query template handling used by query execution

pub mod models;
pub mod services;
