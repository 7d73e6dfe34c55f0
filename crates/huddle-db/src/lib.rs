//! Huddle Persistence Gateway
//!
//! Caller-scoped access to the relational store. Every operation receives a
//! [`CallerScope`](huddle_core::CallerScope) and runs inside a transaction
//! that carries the caller's claims, so row-level policies in the database
//! see the same identity the HTTP layer verified.

pub mod db;

#[cfg(feature = "test-helpers")]
pub mod test_helpers;

pub use db::{
    MessagingStore, OrganizationStore, PgGateway, PgMessagingStore, PgOrganizationStore,
    StoreHealth,
};
