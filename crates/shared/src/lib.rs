//! Shared types, errors, and configuration for Leavedesk.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for type-safe entity references
//! - Application-wide error taxonomy
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

#[cfg(test)]
mod config_tests;

pub use config::{AppConfig, LeaveConfig, LoggingConfig};
pub use error::AppError;
