use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::auth::AuthError;
use crate::error::ApiError;
use crate::state::AppState;

/// Cookie the identity provider stores the session token in
pub const SESSION_COOKIE: &str = "__session";

/// Authenticated caller, inserted into request extensions by the session layer
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: String,
    pub session_id: Option<String>,
}

/// Rejects the request with 401 unless it carries a valid session token.
/// Runs before any handler so the store is never touched for anonymous calls.
pub async fn session_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_session_token(request.headers()).ok_or(AuthError::MissingToken)?;
    let claims = state.sessions.verify(token)?;

    tracing::debug!("Session accepted for user {}", claims.sub);
    request.extensions_mut().insert(AuthUser {
        user_id: claims.sub,
        session_id: claims.sid,
    });

    Ok(next.run(request).await)
}

/// Bearer header first, then the session cookie
fn extract_session_token(headers: &HeaderMap) -> Option<&str> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());
    if bearer.is_some() {
        return bearer;
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value)
}
