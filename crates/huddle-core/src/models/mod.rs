//! Data models for the application
//!
//! Organized by domain: the caller scope carried through every request,
//! organizations with their memberships, and messaging sessions.

mod caller;
mod messaging;
mod organization;

pub use caller::*;
pub use messaging::*;
pub use organization::*;
