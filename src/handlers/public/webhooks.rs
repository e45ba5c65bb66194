use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    response::Json,
};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::services::user_sync;
use crate::state::AppState;
use crate::webhooks::{UserEvent, WebhookError};

/// POST /api/webhooks - identity-provider user lifecycle events
///
/// The raw body is verified before it is parsed. Any outcome other than a
/// verification or store failure is acknowledged with 200 so the provider
/// stops retrying, including events this service does not care about.
pub async fn receive(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let verifier = state.webhooks.as_ref().ok_or(WebhookError::NotConfigured)?;
    verifier.verify(&headers, &body)?;

    let event = UserEvent::parse(&body)?;
    let outcome = user_sync::apply_event(state.store.as_ref(), &event)
        .await
        .map_err(WebhookError::from)?;

    Ok(Json(json!({
        "success": true,
        "event": event.event_type(),
        "outcome": outcome,
    })))
}
