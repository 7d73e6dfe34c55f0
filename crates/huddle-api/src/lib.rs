//! Huddle API library
//!
//! HTTP handlers, bearer authentication, routing and application setup.

mod api_doc;
mod handlers;
mod telemetry;

pub mod auth;
pub mod error;
pub mod setup;
pub mod state;

pub use error::ErrorResponse;
pub use state::AppState;
