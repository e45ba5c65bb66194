mod common;

use anyhow::Result;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use common::TestApp;

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    let app = TestApp::new();
    let res = app.call(Method::GET, "/health", None, None).await?;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn root_describes_service() -> Result<()> {
    let app = TestApp::new();
    let res = app.call(Method::GET, "/", None, None).await?;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["name"], "Daybook API");
    assert!(res.body["endpoints"]["journal"].is_string());
    Ok(())
}

#[tokio::test]
async fn protected_routes_reject_missing_session() -> Result<()> {
    let app = TestApp::with_users(&["user_a"]).await?;

    for (method, path) in [
        (Method::GET, "/api/journal"),
        (Method::POST, "/api/journal"),
        (Method::PATCH, "/api/journal"),
        (Method::DELETE, "/api/journal"),
        (Method::GET, "/api/goals"),
        (Method::POST, "/api/goals"),
        (Method::PATCH, "/api/goals"),
        (Method::DELETE, "/api/goals"),
        (Method::GET, "/api/status-types"),
    ] {
        let res = app
            .call(method.clone(), path, None, Some(serde_json::json!({"content": "x", "id": 1})))
            .await?;
        assert_eq!(res.status, StatusCode::UNAUTHORIZED, "{} {}", method, path);
        assert_eq!(res.body["code"], "UNAUTHORIZED");
    }

    // Nothing was written despite valid-looking payloads
    assert!(app.get("/api/journal", "user_a").await?.body.as_array().unwrap().is_empty());
    Ok(())
}

#[tokio::test]
async fn invalid_tokens_are_rejected() -> Result<()> {
    let app = TestApp::with_users(&["user_a"]).await?;

    let forged = daybook_api::auth::issue_token(
        "some-other-secret",
        &daybook_api::auth::SessionClaims::new("user_a", 1),
    )?;
    for value in ["Bearer not-a-jwt".to_string(), format!("Bearer {}", forged), "Bearer ".to_string()] {
        let request = Request::builder()
            .method(Method::GET)
            .uri("/api/journal")
            .header(header::AUTHORIZATION, value)
            .body(Body::empty())?;
        assert_eq!(app.send(request).await?.status, StatusCode::UNAUTHORIZED);
    }
    Ok(())
}

#[tokio::test]
async fn session_cookie_authenticates() -> Result<()> {
    let app = TestApp::with_users(&["user_a"]).await?;

    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/journal")
        .header(header::COOKIE, format!("__session={}", TestApp::token("user_a")))
        .body(Body::empty())?;
    let res = app.send(request).await?;

    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body.is_array());
    Ok(())
}

#[tokio::test]
async fn status_types_are_listed() -> Result<()> {
    let app = TestApp::with_users(&["user_a"]).await?;
    let res = app.get("/api/status-types", "user_a").await?;

    assert_eq!(res.status, StatusCode::OK);
    let names: Vec<&str> = res
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["completed", "not started", "in progress"]);
    Ok(())
}

#[tokio::test]
async fn unknown_route_is_not_found_not_unauthorized() -> Result<()> {
    let app = TestApp::new();
    let res = app.call(Method::GET, "/api/nope", None, None).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    Ok(())
}
