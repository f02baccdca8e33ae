//! Shared utilities for the internal tools backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Session token signing and validation
//! - OAuth state signing and nonce generation

pub mod crypto;
pub mod session;
