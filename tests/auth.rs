//! API key authentication & scope enforcement.

mod common;

use axum::http::StatusCode;
use common::{app, VALID_ADMIN_ID};
use serde_json::json;

// ===========================================================================
// Credential presence & shape
// ===========================================================================

#[tokio::test]
async fn missing_authorization_header() {
    let app = app().await;

    let resp = app
        .post_json("/reports", json!({ "playername": "x" }), None)
        .await;

    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert_eq!(resp.error_message(), "missing credentials");
}

#[tokio::test]
async fn garbage_token_is_rejected() {
    let app = app().await;

    let resp = app
        .post_json("/reports", json!({ "playername": "x" }), Some("not-a-token"))
        .await;

    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert_eq!(resp.error_message(), "invalid token");
}

#[tokio::test]
async fn token_for_unknown_community() {
    let app = app().await;

    // Mints fine; the subject simply does not exist.
    let key = app.master_key("zzzzzz=");

    let resp = app
        .post_json(
            "/rules",
            json!({ "shortdesc": "x", "longdesc": "y" }),
            Some(&key),
        )
        .await;

    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert_eq!(resp.error_message(), "community not found");
}

// ===========================================================================
// Scope enforcement
// ===========================================================================

#[tokio::test]
async fn private_key_cannot_reach_master_routes() {
    let app = app().await;
    let community = app.create_community("auth_scope").await;

    let resp = app
        .post_json(
            "/rules",
            json!({ "shortdesc": "no spam", "longdesc": "do not spam" }),
            Some(&community.api_key),
        )
        .await;

    assert_eq!(resp.status, StatusCode::FORBIDDEN);
    assert_eq!(resp.error_message(), "master scope required");
}

#[tokio::test]
async fn master_key_reaches_master_routes() {
    let app = app().await;
    let community = app.create_community("auth_master").await;
    let master = app.master_key(&community.id);

    let resp = app
        .post_json(
            "/rules",
            json!({ "shortdesc": "no griefing", "longdesc": "do not grief" }),
            Some(&master),
        )
        .await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.json()["id"].as_str().unwrap().len(), 7);
}

// ===========================================================================
// Token revocation via tokenInvalidBefore
// ===========================================================================

#[tokio::test]
async fn rotating_the_cutoff_revokes_issued_tokens() {
    let app = app().await;
    let community = app.create_community("auth_revoked").await;

    // The key still verifies cryptographically; only the cutoff changed.
    sqlx::query(
        "UPDATE communities \
         SET token_invalid_before = now() + interval '1 hour' \
         WHERE id = $1",
    )
    .bind(&community.id)
    .execute(app.state.db.pool())
    .await
    .expect("failed to rotate cutoff");

    let resp = app
        .post_json(
            "/reports",
            json!({
                "playername": "Alice",
                "brokenRuleId": "abc1234",
                "adminId": VALID_ADMIN_ID,
            }),
            Some(&community.api_key),
        )
        .await;

    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert_eq!(resp.error_message(), "token revoked");
}
