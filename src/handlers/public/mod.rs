// Reachable without a session. The webhook endpoint authenticates the
// sender by signature instead.
pub mod system;
pub mod webhooks;
