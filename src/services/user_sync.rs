use serde::Serialize;
use tracing::info;

use crate::database::{StoreError, UserStore};
use crate::webhooks::UserEvent;

/// What applying a lifecycle event did to the local `users` table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncOutcome {
    Created,
    AlreadyExists,
    Deleted,
    NotFound,
    Ignored,
}

/// Project one identity-provider event into the store.
///
/// Duplicate creates and deletes of unknown users succeed as no-ops so the
/// provider never retries them. Owned journal entries and goals go away with
/// the user through the store's cascading foreign keys.
pub async fn apply_event<S>(store: &S, event: &UserEvent) -> Result<SyncOutcome, StoreError>
where
    S: UserStore + ?Sized,
{
    let outcome = match event {
        UserEvent::Created { user_id } => {
            if store.insert_user(user_id).await? {
                info!("User created: {}", user_id);
                SyncOutcome::Created
            } else {
                info!("User already exists, ignoring duplicate create: {}", user_id);
                SyncOutcome::AlreadyExists
            }
        }
        UserEvent::Deleted { user_id } => {
            if store.delete_user(user_id).await? {
                info!("User deleted: {}", user_id);
                SyncOutcome::Deleted
            } else {
                info!("User not found, nothing to delete: {}", user_id);
                SyncOutcome::NotFound
            }
        }
        UserEvent::Ignored { event_type } => {
            info!("Ignoring webhook event: {}", event_type);
            SyncOutcome::Ignored
        }
    };
    Ok(outcome)
}
