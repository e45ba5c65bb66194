// Every handler in this tier runs behind `session_auth_middleware` and
// receives the caller as `Extension<AuthUser>`. Ownership always comes from
// that extension, never from the request body.
pub mod goals;
pub mod journal;
pub mod status_types;
pub mod utils;
