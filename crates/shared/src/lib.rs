//! Shared types, errors, and configuration for QBSync.
//!
//! This crate provides common types used across all other crates:
//! - Typed string keys for tenants and business documents
//! - The document kind discriminator used by the sync ledger
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
