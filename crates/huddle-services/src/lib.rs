//! Huddle Services Layer
//!
//! Domain rules for organizations, memberships, sessions and messages. The
//! services validate input, enforce membership rules and call the stores with
//! the caller's scope; HTTP concerns stay in huddle-api.

pub mod services;

pub use services::{MessagingService, OrganizationService};
