use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET / - service description
pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "name": "Daybook API",
        "version": version,
        "description": "Private journal and goals API",
        "endpoints": {
            "home": "/ (public)",
            "health": "/health (public)",
            "webhooks": "/api/webhooks (signed by identity provider)",
            "journal": "/api/journal (session)",
            "goals": "/api/goals (session)",
            "status_types": "/api/status-types (session)",
        }
    }))
}

/// GET /health - store connectivity
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "timestamp": now,
                    "database": "unavailable"
                })),
            )
        }
    }
}
