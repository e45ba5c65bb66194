#![allow(dead_code)]

use std::sync::Arc;

use anyhow::Result;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use daybook_api::auth::{issue_token, SessionClaims, SessionVerifier};
use daybook_api::config::{AppConfig, SessionConfig};
use daybook_api::database::{MemoryStore, Store};
use daybook_api::webhooks::WebhookVerifier;
use daybook_api::{app, AppState};

pub const SESSION_SECRET: &str = "integration-session-secret";
// base64("daybook-integration-key")
pub const WEBHOOK_SECRET: &str = "whsec_ZGF5Ym9vay1pbnRlZ3JhdGlvbi1rZXk=";

/// In-process server backed by a fresh `MemoryStore`
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    webhooks: WebhookVerifier,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestApp {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let sessions = SessionVerifier::from_config(&SessionConfig {
            jwt_secret: Some(SESSION_SECRET.to_string()),
            ..SessionConfig::default()
        })
        .expect("session verifier");
        let webhooks = WebhookVerifier::new(WEBHOOK_SECRET, 300).expect("webhook verifier");

        let state = AppState::new(
            store.clone() as Arc<dyn Store>,
            sessions,
            Some(WebhookVerifier::new(WEBHOOK_SECRET, 300).expect("webhook verifier")),
        );
        let router = app(state, &AppConfig::development().security);

        Self {
            router,
            store,
            webhooks,
        }
    }

    /// Same as `new`, with users already synced
    pub async fn with_users(users: &[&str]) -> Result<Self> {
        let app = Self::new();
        for user in users {
            let res = app.webhook("user.created", user).await?;
            anyhow::ensure!(res.status == StatusCode::OK, "seeding {} failed: {:?}", user, res.body);
        }
        Ok(app)
    }

    pub fn token(user_id: &str) -> String {
        issue_token(SESSION_SECRET, &SessionClaims::new(user_id, 1)).expect("token")
    }

    pub async fn send(&self, request: Request<Body>) -> Result<TestResponse> {
        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        Ok(TestResponse { status, body })
    }

    /// JSON request to `path`, authenticated as `user` when given
    pub async fn call(
        &self,
        method: Method,
        path: &str,
        user: Option<&str>,
        body: Option<Value>,
    ) -> Result<TestResponse> {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(user) = user {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", Self::token(user)));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))?,
            None => builder.body(Body::empty())?,
        };
        self.send(request).await
    }

    pub async fn get(&self, path: &str, user: &str) -> Result<TestResponse> {
        self.call(Method::GET, path, Some(user), None).await
    }

    pub async fn post(&self, path: &str, user: &str, body: Value) -> Result<TestResponse> {
        self.call(Method::POST, path, Some(user), Some(body)).await
    }

    pub async fn patch(&self, path: &str, user: &str, body: Value) -> Result<TestResponse> {
        self.call(Method::PATCH, path, Some(user), Some(body)).await
    }

    pub async fn delete(&self, path: &str, user: &str, body: Value) -> Result<TestResponse> {
        self.call(Method::DELETE, path, Some(user), Some(body)).await
    }

    /// Signed webhook carrying `{type, data: {id}}`
    pub async fn webhook(&self, event_type: &str, user_id: &str) -> Result<TestResponse> {
        let body = serde_json::json!({
            "object": "event",
            "type": event_type,
            "data": { "id": user_id },
        })
        .to_string();
        self.raw_webhook(body.into_bytes()).await
    }

    pub async fn raw_webhook(&self, body: Vec<u8>) -> Result<TestResponse> {
        let timestamp = chrono::Utc::now().timestamp();
        let headers = self.webhooks.signed_headers("msg_test", timestamp, &body)?;

        let mut builder = Request::builder().method(Method::POST).uri("/api/webhooks");
        for (name, value) in headers.iter() {
            builder = builder.header(name, value);
        }
        let request = builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))?;
        self.send(request).await
    }
}
