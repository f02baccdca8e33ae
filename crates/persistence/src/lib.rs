//! Persistence layer for the internal tools backend.
//!
//! This crate contains:
//! - Datastore creation and embedded migrations
//! - Entity definitions (database row mappings)
//! - Repository implementations

pub mod db;
pub mod entities;
pub mod metrics;
pub mod repositories;
