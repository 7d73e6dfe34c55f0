//! Test helpers for exercising the services and the HTTP layer without Postgres

pub mod mock_store;

pub use mock_store::MockStore;
