//! Request field validation shared by the services and the HTTP handlers.
//!
//! All failures are `AppError::InvalidInput` and are raised before any
//! persistence call is made.

use std::collections::BTreeSet;

use uuid::Uuid;

use crate::error::AppError;

/// Trim `value` and reject it when nothing is left.
pub fn require_non_empty<'a>(value: &'a str, message: &str) -> Result<&'a str, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::InvalidInput(message.to_string()));
    }
    Ok(trimmed)
}

/// Parse a required identifier field.
///
/// Empty input reports `"<field> is required"`, anything else that is not a
/// UUID reports `"<field> must be a valid UUID"`.
pub fn parse_uuid_field(value: &str, field: &str) -> Result<Uuid, AppError> {
    let trimmed = require_non_empty(value, &format!("{} is required", field))?;
    Uuid::parse_str(trimmed)
        .map_err(|_| AppError::InvalidInput(format!("{} must be a valid UUID", field)))
}

/// Normalize a requested member list into a deduplicated set of ids.
///
/// Blank entries are dropped and `requester` is always included. The result
/// is sorted so inserts touch rows in a stable order.
pub fn normalize_member_ids(users: &[String], requester: Uuid) -> Result<Vec<Uuid>, AppError> {
    let mut ids = BTreeSet::new();
    ids.insert(requester);

    for user in users {
        let user = user.trim();
        if user.is_empty() {
            continue;
        }
        let id = Uuid::parse_str(user)
            .map_err(|_| AppError::InvalidInput("users must contain valid UUIDs".to_string()))?;
        ids.insert(id);
    }

    Ok(ids.into_iter().collect())
}
