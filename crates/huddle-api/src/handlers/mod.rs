//! HTTP handlers
//!
//! Handlers resolve the caller, validate the request shape, call a service
//! with the caller's scope and shape the response.

pub mod auth;
pub mod organizations;
pub mod root;
pub mod sessions;
