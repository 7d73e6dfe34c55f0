use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Value};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Test signing secret (must match setup_test_app).
pub const TEST_JWT_SECRET: &str = "test-jwt-secret-at-least-32-characters-long";

fn now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock before epoch")
        .as_secs() as i64
}

pub fn sign(claims: Value, secret: &str) -> String {
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("Failed to sign test token")
}

/// Token as the identity provider would issue it for `user_id`.
pub fn mint_token(user_id: Uuid) -> String {
    sign(
        json!({
            "sub": user_id,
            "exp": now() + 3600,
            "aud": "authenticated",
            "role": "authenticated",
            "email": format!("{}@example.com", user_id.simple()),
        }),
        TEST_JWT_SECRET,
    )
}

pub fn expired_token(user_id: Uuid) -> String {
    sign(
        json!({ "sub": user_id, "exp": now() - 3600, "role": "authenticated" }),
        TEST_JWT_SECRET,
    )
}

pub fn token_signed_with(user_id: Uuid, secret: &str) -> String {
    sign(
        json!({ "sub": user_id, "exp": now() + 3600, "role": "authenticated" }),
        secret,
    )
}
