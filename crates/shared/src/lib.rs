//! Shared types, errors, and configuration for the check run workspace.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for type-safe entity references
//! - The `Ssn` value type with masking for logs and printed output
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::{AppConfig, CheckRunConfig, DatabaseConfig};
pub use error::{AppError, AppResult};
pub use types::{CheckRunId, Ssn, SsnError};
