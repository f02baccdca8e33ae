//! HTTP route handlers.

pub mod accounts;
pub mod auth;
pub mod components;
pub mod health;
pub mod pages;
pub mod queries;
pub mod roles;
