use serde_json::json;
use uuid::Uuid;

/// Identity of the caller for the lifetime of one request.
///
/// Every persistence operation receives the scope explicitly; the gateway
/// forwards `claims` to the database so row-level policies see the same
/// identity the token asserted.
#[derive(Debug, Clone, PartialEq)]
pub struct CallerScope {
    pub user_id: Uuid,
    pub claims: serde_json::Value,
}

impl CallerScope {
    pub fn new(user_id: Uuid, claims: serde_json::Value) -> Self {
        Self { user_id, claims }
    }

    /// Scope with the minimal claim set (`sub` and the `authenticated` role).
    pub fn for_user(user_id: Uuid) -> Self {
        Self {
            user_id,
            claims: json!({ "sub": user_id, "role": "authenticated" }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_user_sets_subject_claim() {
        let user_id = Uuid::new_v4();
        let scope = CallerScope::for_user(user_id);
        assert_eq!(scope.claims["sub"], user_id.to_string());
        assert_eq!(scope.claims["role"], "authenticated");
    }
}
