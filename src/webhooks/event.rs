use serde::Deserialize;
use serde_json::Value;

use super::WebhookError;

pub const USER_CREATED: &str = "user.created";
pub const USER_DELETED: &str = "user.deleted";

/// A verified webhook narrowed to what the user sync cares about
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserEvent {
    Created { user_id: String },
    Deleted { user_id: String },
    /// Any other event type, or a user event whose `data.id` is missing
    Ignored { event_type: String },
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    event_type: String,
    #[serde(default)]
    data: Value,
}

impl UserEvent {
    /// Parse a raw (already verified) body. Only non-JSON input is an error;
    /// JSON that does not fit a user event becomes `Ignored`.
    pub fn parse(body: &[u8]) -> Result<Self, WebhookError> {
        let value: Value =
            serde_json::from_slice(body).map_err(|e| WebhookError::InvalidPayload(e.to_string()))?;

        let Ok(envelope) = serde_json::from_value::<Envelope>(value) else {
            return Ok(UserEvent::Ignored {
                event_type: "unknown".to_string(),
            });
        };

        let user_id = envelope
            .data
            .get("id")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .map(str::to_string);

        Ok(match (envelope.event_type.as_str(), user_id) {
            (USER_CREATED, Some(user_id)) => UserEvent::Created { user_id },
            (USER_DELETED, Some(user_id)) => UserEvent::Deleted { user_id },
            _ => UserEvent::Ignored {
                event_type: envelope.event_type,
            },
        })
    }

    pub fn event_type(&self) -> &str {
        match self {
            UserEvent::Created { .. } => USER_CREATED,
            UserEvent::Deleted { .. } => USER_DELETED,
            UserEvent::Ignored { event_type } => event_type,
        }
    }
}
