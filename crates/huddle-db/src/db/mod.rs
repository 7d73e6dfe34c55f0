//! Store traits and their Postgres implementations
//
// Request-scoped transactions
pub mod gateway;
//
// Organizations and memberships
pub mod organization;
//
// Sessions, session membership and messages
pub mod messaging;
//
// Store seams consumed by the services
pub mod store;

pub use gateway::PgGateway;
pub use messaging::PgMessagingStore;
pub use organization::PgOrganizationStore;
pub use store::{MessagingStore, OrganizationStore, StoreHealth};
