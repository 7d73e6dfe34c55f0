//! Session and message API integration tests.
//!
//! Run with: `cargo test -p huddle-api --test sessions_test`

mod helpers;

use helpers::{setup_test_app, setup_test_app_with, TestApp};
use huddle_core::models::MembershipRole;
use serde_json::{json, Value};
use std::collections::HashSet;
use uuid::Uuid;

async fn create_organization(app: &TestApp, owner: Uuid) -> Uuid {
    let response = app
        .client()
        .post("/organization")
        .add_header("Authorization", app.bearer(owner))
        .json(&json!({ "name": "Cleanup Crew", "description": "volunteers" }))
        .await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    body["id"].as_str().unwrap().parse().unwrap()
}

async fn create_session(app: &TestApp, caller: Uuid, org_id: Uuid, users: &[Uuid]) -> Uuid {
    let response = app
        .client()
        .post("/sessions")
        .add_header("Authorization", app.bearer(caller))
        .json(&json!({ "organizationId": org_id, "users": users, "title": "Planning" }))
        .await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    body["id"].as_str().unwrap().parse().unwrap()
}

#[tokio::test]
async fn test_end_to_end_organization_session_message() {
    let app = setup_test_app().await;
    let user_a = Uuid::new_v4();
    let user_b = Uuid::new_v4();
    app.store.add_profile(user_a, Some("Ada Lovelace"));

    let org_id = create_organization(&app, user_a).await;
    let owner = app
        .store
        .memberships_of(org_id)
        .into_iter()
        .find(|m| m.user_id == user_a)
        .unwrap();
    assert_eq!(owner.role, MembershipRole::Owner);

    let response = app
        .client()
        .post("/sessions")
        .add_header("Authorization", app.bearer(user_a))
        .json(&json!({ "organizationId": org_id, "users": [user_b], "title": "Planning" }))
        .await;
    assert_eq!(response.status_code(), 200);
    let session: Value = response.json();
    assert_eq!(session["organization_id"], org_id.to_string());
    assert_eq!(session["title"], "Planning");
    let session_id: Uuid = session["id"].as_str().unwrap().parse().unwrap();
    assert_eq!(
        app.store.session_member_ids(session_id),
        HashSet::from([user_a, user_b])
    );

    let response = app
        .client()
        .post("/sessions/message")
        .add_header("Authorization", app.bearer(user_a))
        .json(&json!({ "sessionId": session_id, "content": "Let's meet Saturday" }))
        .await;
    assert_eq!(response.status_code(), 200);
    let message: Value = response.json();
    assert_eq!(message["message"], "Let's meet Saturday");
    assert_eq!(message["user_id"], user_a.to_string());

    let response = app
        .client()
        .get(&format!("/sessions/{}", session_id))
        .add_header("Authorization", app.bearer(user_b))
        .await;
    assert_eq!(response.status_code(), 200);
    let messages: Vec<Value> = response.json();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["message"], "Let's meet Saturday");
    assert_eq!(messages[0]["profile_full_name"], "Ada Lovelace");

    assert_eq!(
        app.store
            .session(session_id)
            .unwrap()
            .last_message_sent
            .as_deref(),
        Some("Let's meet Saturday")
    );
}

#[tokio::test]
async fn test_create_session_dedupes_members_and_includes_caller() {
    let app = setup_test_app().await;
    let caller = Uuid::new_v4();
    let other = Uuid::new_v4();
    let org_id = create_organization(&app, caller).await;

    let response = app
        .client()
        .post("/sessions")
        .add_header("Authorization", app.bearer(caller))
        .json(&json!({
            "organizationId": org_id,
            "users": [other.to_string(), other.to_string(), caller.to_string(), ""],
            "title": "Planning"
        }))
        .await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    let session_id: Uuid = body["id"].as_str().unwrap().parse().unwrap();

    assert_eq!(
        app.store.session_member_ids(session_id),
        HashSet::from([caller, other])
    );
}

#[tokio::test]
async fn test_create_session_validation() {
    let app = setup_test_app().await;
    let caller = Uuid::new_v4();
    let org_id = create_organization(&app, caller).await;

    let cases = [
        (json!({ "users": [], "title": "Planning" }), "organizationId is required"),
        (json!({ "organizationId": org_id, "users": [], "title": "  " }), "title is required"),
        (
            json!({ "organizationId": org_id, "users": ["nope"], "title": "Planning" }),
            "users must contain valid UUIDs",
        ),
    ];

    for (body, expected) in cases {
        let response = app
            .client()
            .post("/sessions")
            .add_header("Authorization", app.bearer(caller))
            .json(&body)
            .await;
        assert_eq!(response.status_code(), 400);
        let error: Value = response.json();
        assert_eq!(error["error"], expected);
    }

    assert_eq!(app.store.session_count(), 0);
}

#[tokio::test]
async fn test_create_session_failure_persists_nothing() {
    let app = setup_test_app().await;
    let caller = Uuid::new_v4();
    let broken = Uuid::new_v4();
    let org_id = create_organization(&app, caller).await;
    app.store.fail_session_member(broken);

    let response = app
        .client()
        .post("/sessions")
        .add_header("Authorization", app.bearer(caller))
        .json(&json!({ "organizationId": org_id, "users": [broken], "title": "Planning" }))
        .await;

    assert_eq!(response.status_code(), 500);
    assert_eq!(app.store.session_count(), 0);
}

#[tokio::test]
async fn test_list_sessions_for_caller() {
    let app = setup_test_app().await;
    let user_a = Uuid::new_v4();
    let user_b = Uuid::new_v4();
    let org_id = create_organization(&app, user_a).await;
    let session_id = create_session(&app, user_a, org_id, &[user_b]).await;
    create_session(&app, user_a, org_id, &[]).await;

    let response = app
        .client()
        .get("/sessions")
        .add_header("Authorization", app.bearer(user_b))
        .await;

    assert_eq!(response.status_code(), 200);
    let sessions: Vec<Value> = response.json();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0]["user_id"], user_b.to_string());
    assert_eq!(sessions[0]["message_session"]["id"], session_id.to_string());
    assert_eq!(sessions[0]["message_session"]["title"], "Planning");
    assert!(sessions[0].get("role").is_none());
}

#[tokio::test]
async fn test_message_requires_membership() {
    let app = setup_test_app().await;
    let owner = Uuid::new_v4();
    let outsider = Uuid::new_v4();
    let org_id = create_organization(&app, owner).await;
    let session_id = create_session(&app, owner, org_id, &[]).await;

    let response = app
        .client()
        .post("/sessions/message")
        .add_header("Authorization", app.bearer(outsider))
        .json(&json!({ "sessionId": session_id, "content": "hello" }))
        .await;

    assert_eq!(response.status_code(), 403);
    let body: Value = response.json();
    assert_eq!(body["error"], "Not a member of this session");
    assert_eq!(app.store.message_count(), 0);
}

#[tokio::test]
async fn test_message_membership_check_can_be_disabled() {
    let app = setup_test_app_with(false).await;
    let owner = Uuid::new_v4();
    let outsider = Uuid::new_v4();
    let org_id = create_organization(&app, owner).await;
    let session_id = create_session(&app, owner, org_id, &[]).await;

    let response = app
        .client()
        .post("/sessions/message")
        .add_header("Authorization", app.bearer(outsider))
        .json(&json!({ "sessionId": session_id, "content": "hello" }))
        .await;

    assert_eq!(response.status_code(), 200);
    assert_eq!(app.store.message_count(), 1);
}

#[tokio::test]
async fn test_outsider_cannot_read_session_messages() {
    // posting is open here, reading still is not
    let app = setup_test_app_with(false).await;
    let owner = Uuid::new_v4();
    let outsider = Uuid::new_v4();
    let org_id = create_organization(&app, owner).await;
    let session_id = create_session(&app, owner, org_id, &[]).await;

    app.client()
        .post("/sessions/message")
        .add_header("Authorization", app.bearer(owner))
        .json(&json!({ "sessionId": session_id, "content": "secret" }))
        .await
        .assert_status_ok();

    let response = app
        .client()
        .get(&format!("/sessions/{}", session_id))
        .add_header("Authorization", app.bearer(outsider))
        .await;

    assert_eq!(response.status_code(), 403);
    let body: Value = response.json();
    assert_eq!(body["error"], "Not a member of this session");
    assert!(!response.text().contains("secret"));
}

#[tokio::test]
async fn test_message_validation() {
    let app = setup_test_app().await;
    let caller = Uuid::new_v4();
    let org_id = create_organization(&app, caller).await;
    let session_id = create_session(&app, caller, org_id, &[]).await;

    let empty = app
        .client()
        .post("/sessions/message")
        .add_header("Authorization", app.bearer(caller))
        .json(&json!({ "sessionId": session_id, "content": "   " }))
        .await;
    assert_eq!(empty.status_code(), 400);
    let body: Value = empty.json();
    assert_eq!(body["error"], "content is required");

    let bad_id = app
        .client()
        .post("/sessions/message")
        .add_header("Authorization", app.bearer(caller))
        .json(&json!({ "sessionId": "abc", "content": "hello" }))
        .await;
    assert_eq!(bad_id.status_code(), 400);

    assert_eq!(app.store.message_count(), 0);
}

#[tokio::test]
async fn test_messages_are_listed_oldest_first() {
    let app = setup_test_app().await;
    let caller = Uuid::new_v4();
    let org_id = create_organization(&app, caller).await;
    let session_id = create_session(&app, caller, org_id, &[]).await;

    for content in ["first", "second", "third"] {
        app.client()
            .post("/sessions/message")
            .add_header("Authorization", app.bearer(caller))
            .json(&json!({ "sessionId": session_id, "content": content }))
            .await
            .assert_status_ok();
    }

    let response = app
        .client()
        .get(&format!("/sessions/{}", session_id))
        .add_header("Authorization", app.bearer(caller))
        .await;
    let messages: Vec<Value> = response.json();
    let bodies: Vec<&str> = messages
        .iter()
        .map(|m| m["message"].as_str().unwrap())
        .collect();
    assert_eq!(bodies, ["first", "second", "third"]);
    assert_eq!(
        app.store
            .session(session_id)
            .unwrap()
            .last_message_sent
            .as_deref(),
        Some("third")
    );
}

#[tokio::test]
async fn test_add_session_members_reports_new_ids_only() {
    let app = setup_test_app().await;
    let owner = Uuid::new_v4();
    let existing = Uuid::new_v4();
    let newcomer = Uuid::new_v4();
    let org_id = create_organization(&app, owner).await;
    let session_id = create_session(&app, owner, org_id, &[existing]).await;

    let response = app
        .client()
        .post(&format!("/sessions/{}/members", session_id))
        .add_header("Authorization", app.bearer(owner))
        .json(&json!({ "users": [existing, newcomer] }))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["session_id"], session_id.to_string());
    assert_eq!(body["added"], json!([newcomer.to_string()]));
    assert_eq!(
        app.store.session_member_ids(session_id),
        HashSet::from([owner, existing, newcomer])
    );
}

#[tokio::test]
async fn test_add_session_members_requires_membership() {
    let app = setup_test_app().await;
    let owner = Uuid::new_v4();
    let outsider = Uuid::new_v4();
    let org_id = create_organization(&app, owner).await;
    let session_id = create_session(&app, owner, org_id, &[]).await;

    let response = app
        .client()
        .post(&format!("/sessions/{}/members", session_id))
        .add_header("Authorization", app.bearer(outsider))
        .json(&json!({ "users": [Uuid::new_v4()] }))
        .await;

    assert_eq!(response.status_code(), 403);
    assert_eq!(app.store.session_member_ids(session_id), HashSet::from([owner]));
}
