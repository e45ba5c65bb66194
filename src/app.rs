use axum::{
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::SecurityConfig;
use crate::handlers::{protected, public};
use crate::middleware::session_auth_middleware;
use crate::state::AppState;

/// Full router: public routes plus the session-gated API
pub fn app(state: AppState, security: &SecurityConfig) -> Router {
    let router = Router::new()
        .merge(public_routes())
        .merge(protected_routes(state.clone()))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if security.enable_cors {
        router.layer(cors_layer(&security.cors_origins))
    } else {
        router
    }
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(public::system::root))
        .route("/health", get(public::system::health))
        // Signed by the identity provider; must stay outside the session layer
        .route("/api/webhooks", post(public::webhooks::receive))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    use protected::{goals, journal, status_types};

    Router::new()
        .route(
            "/api/journal",
            get(journal::list)
                .post(journal::create)
                .patch(journal::update)
                .delete(journal::delete),
        )
        .route(
            "/api/goals",
            get(goals::list)
                .post(goals::create)
                .patch(goals::update)
                .delete(goals::delete),
        )
        .route("/api/status-types", get(status_types::list))
        // route_layer so unknown paths still 404 instead of 401
        .route_layer(from_fn_with_state(state, session_auth_middleware))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}
