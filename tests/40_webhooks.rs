mod common;

use std::sync::Arc;

use anyhow::Result;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use common::{TestApp, SESSION_SECRET};
use serde_json::json;
use tower::ServiceExt;

use daybook_api::auth::SessionVerifier;
use daybook_api::config::{AppConfig, SessionConfig};
use daybook_api::database::{MemoryStore, Store, UserStore};
use daybook_api::{app, AppState};

#[tokio::test]
async fn created_user_can_write_goals() -> Result<()> {
    let app = TestApp::new();

    let res = app.webhook("user.created", "u_1").await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["success"], true);
    assert_eq!(res.body["outcome"], "created");

    let goal = app
        .post("/api/goals", "u_1", json!({"title": "Learn Rust", "targetDate": "2030-01-01"}))
        .await?;
    assert_eq!(goal.status, StatusCode::CREATED);
    Ok(())
}

#[tokio::test]
async fn deleted_user_loses_everything() -> Result<()> {
    let app = TestApp::with_users(&["u_1", "u_2"]).await?;
    app.post("/api/journal", "u_1", json!({"content": "day one"})).await?;
    app.post("/api/goals", "u_1", json!({"title": "Run", "targetDate": "2030-01-01"})).await?;
    app.post("/api/journal", "u_2", json!({"content": "unrelated"})).await?;

    let res = app.webhook("user.deleted", "u_1").await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["outcome"], "deleted");

    assert_eq!(app.get("/api/journal", "u_1").await?.body, json!([]));
    assert_eq!(app.get("/api/goals", "u_1").await?.body, json!([]));
    assert_eq!(app.get("/api/journal", "u_2").await?.body.as_array().unwrap().len(), 1);

    // Re-created account starts empty
    assert!(app.store.insert_user("u_1").await?);
    assert_eq!(app.get("/api/journal", "u_1").await?.body, json!([]));
    Ok(())
}

#[tokio::test]
async fn duplicate_create_and_unknown_delete_are_acknowledged() -> Result<()> {
    let app = TestApp::with_users(&["u_1"]).await?;

    let res = app.webhook("user.created", "u_1").await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["outcome"], "already_exists");

    let res = app.webhook("user.deleted", "nobody").await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["outcome"], "not_found");
    Ok(())
}

#[tokio::test]
async fn other_event_types_are_ignored() -> Result<()> {
    let app = TestApp::new();

    let res = app.webhook("user.updated", "u_9").await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["event"], "user.updated");
    assert_eq!(res.body["outcome"], "ignored");

    // No user row appeared
    let res = app.post("/api/journal", "u_9", json!({"content": "x"})).await?;
    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
    Ok(())
}

#[tokio::test]
async fn bad_signatures_are_rejected_without_side_effects() -> Result<()> {
    let app = TestApp::new();
    let body = json!({"type": "user.created", "data": {"id": "intruder"}}).to_string();
    let timestamp = chrono::Utc::now().timestamp().to_string();

    let forged = Request::builder()
        .method(Method::POST)
        .uri("/api/webhooks")
        .header("svix-id", "msg_forged")
        .header("svix-timestamp", timestamp.as_str())
        .header("svix-signature", "v1,Zm9yZ2VkLXNpZ25hdHVyZQ==")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.clone()))?;
    let res = app.send(forged).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["error"], "Error processing webhook");

    let unsigned = Request::builder()
        .method(Method::POST)
        .uri("/api/webhooks")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))?;
    assert_eq!(app.send(unsigned).await?.status, StatusCode::BAD_REQUEST);

    assert!(app.store.insert_user("intruder").await?, "forged event must not create a user");
    Ok(())
}

#[tokio::test]
async fn signed_non_json_body_is_rejected() -> Result<()> {
    let app = TestApp::new();
    let res = app.raw_webhook(b"definitely not json".to_vec()).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn missing_signing_secret_rejects_all_webhooks() -> Result<()> {
    let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
    let sessions = SessionVerifier::from_config(&SessionConfig {
        jwt_secret: Some(SESSION_SECRET.to_string()),
        ..SessionConfig::default()
    })?;
    let router = app(
        AppState::new(store, sessions, None),
        &AppConfig::development().security,
    );

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/webhooks")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"type":"user.created","data":{"id":"u_1"}}"#))?;
    let response = router.oneshot(request).await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    Ok(())
}
