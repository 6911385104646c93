//! # zorium-common
//!
//! Shared types, configuration, error handling, and utilities used across all Zorium crates.
//! This is the foundation layer: no business logic, just primitives and contracts.

pub mod auth;
pub mod config;
pub mod error;
pub mod ids;
pub mod models;
pub mod pagination;
pub mod validation;
