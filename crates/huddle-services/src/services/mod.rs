mod messaging;
mod organization;

pub use messaging::MessagingService;
pub use organization::OrganizationService;
