//! HS256 access token verification
//!
//! Tokens are issued by the identity provider and signed with a shared
//! secret. `sub` carries the user id; the full claim set is kept so it can be
//! forwarded to the database for row-level policies.

use huddle_core::AppError;
use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use serde_json::Value;
use uuid::Uuid;

use super::models::AuthenticatedUser;

pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(secret: &str, audience: Option<&str>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        match audience {
            Some(aud) => validation.set_audience(&[aud]),
            None => validation.validate_aud = false,
        }

        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Verify signature and expiry, then resolve the caller.
    pub fn verify(&self, token: &str) -> Result<AuthenticatedUser, AppError> {
        let data = decode::<Value>(token, &self.key, &self.validation).map_err(|e| {
            let reason = match e.kind() {
                ErrorKind::ExpiredSignature => "Token expired",
                ErrorKind::InvalidAudience => "Invalid token audience",
                ErrorKind::InvalidSignature => "Invalid token signature",
                _ => "Invalid token",
            };
            tracing::debug!(error = %e, "Token verification failed");
            AppError::Unauthorized(reason.to_string())
        })?;

        let claims = data.claims;
        let user_id = claims
            .get("sub")
            .and_then(Value::as_str)
            .and_then(|sub| Uuid::parse_str(sub).ok())
            .ok_or_else(|| AppError::Unauthorized("Token subject is not a user id".to_string()))?;
        let email = claims
            .get("email")
            .and_then(Value::as_str)
            .map(str::to_string);

        Ok(AuthenticatedUser {
            user_id,
            email,
            claims,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;
    use std::time::{SystemTime, UNIX_EPOCH};

    const SECRET: &str = "unit-test-secret-with-at-least-32-chars";

    fn now() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs() as i64
    }

    fn sign(claims: Value, secret: &str) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_valid_token() {
        let user_id = Uuid::new_v4();
        let token = sign(
            json!({ "sub": user_id, "exp": now() + 600, "aud": "authenticated", "email": "a@example.com" }),
            SECRET,
        );

        let user = TokenVerifier::new(SECRET, None).verify(&token).unwrap();
        assert_eq!(user.user_id, user_id);
        assert_eq!(user.email.as_deref(), Some("a@example.com"));
        assert_eq!(user.claims["aud"], "authenticated");
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = sign(
            json!({ "sub": Uuid::new_v4(), "exp": now() + 600 }),
            "another-secret-with-at-least-32-characters",
        );
        let err = TokenVerifier::new(SECRET, None).verify(&token).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn test_expired_token_rejected() {
        let token = sign(json!({ "sub": Uuid::new_v4(), "exp": now() - 3600 }), SECRET);
        let err = TokenVerifier::new(SECRET, None).verify(&token).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(ref m) if m == "Token expired"));
    }

    #[test]
    fn test_audience_enforced_when_configured() {
        let token = sign(
            json!({ "sub": Uuid::new_v4(), "exp": now() + 600, "aud": "other" }),
            SECRET,
        );
        let verifier = TokenVerifier::new(SECRET, Some("authenticated"));
        assert!(verifier.verify(&token).is_err());
    }

    #[test]
    fn test_non_uuid_subject_rejected() {
        let token = sign(json!({ "sub": "service-account", "exp": now() + 600 }), SECRET);
        assert!(TokenVerifier::new(SECRET, None).verify(&token).is_err());
    }
}
