//! Bearer token authentication

pub mod jwt;
pub mod middleware;
pub mod models;

pub use jwt::TokenVerifier;
pub use models::AuthenticatedUser;
