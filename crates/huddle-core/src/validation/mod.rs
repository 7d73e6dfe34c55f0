//! Validation modules

pub mod fields;

pub use fields::{normalize_member_ids, parse_uuid_field, require_non_empty};
