//! Identity-provider webhook intake: signature verification and narrowing of
//! the event payload to the user lifecycle events this service projects.

pub mod event;
pub mod signature;

use thiserror::Error;

use crate::database::StoreError;

pub use event::UserEvent;
pub use signature::WebhookVerifier;

#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("webhook signing secret is not configured")]
    NotConfigured,

    #[error("webhook signing secret is not valid base64")]
    InvalidSecret,

    #[error("missing or unreadable header: {0}")]
    MissingHeader(&'static str),

    #[error("webhook timestamp is not a unix timestamp")]
    InvalidTimestamp,

    #[error("webhook timestamp outside tolerance")]
    TimestampOutOfTolerance,

    #[error("no matching webhook signature")]
    SignatureMismatch,

    #[error("webhook body is not JSON: {0}")]
    InvalidPayload(String),

    #[error("webhook store operation failed: {0}")]
    Store(#[from] StoreError),
}
