//! Huddle Core Library
//!
//! This crate provides the domain models, error types, configuration, and field
//! validation shared by the persistence gateway, the services, and the HTTP API.

pub mod config;
pub mod error;
pub mod models;
pub mod validation;

// Re-export commonly used types
pub use config::{Config, LogFormat};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::CallerScope;
