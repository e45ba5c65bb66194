use axum::extract::{Extension, State};
use serde::Deserialize;

use crate::api::ValidJson;
use crate::database::models::{JournalEntry, JournalEntryChanges, NewJournalEntry};
use crate::error::ApiError;
use crate::middleware::{response::Acknowledged, ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

use super::utils::{not_found_or_unauthorized, reject_empty, require_id, IdRequest};

const RESOURCE: &str = "Journal entry";
const CONTENT_REQUIRED: &str = "Content is required";

#[derive(Debug, Deserialize)]
pub struct CreateJournalEntryRequest {
    pub content: Option<String>,
}

impl CreateJournalEntryRequest {
    pub fn validate(self) -> Result<NewJournalEntry, ApiError> {
        match self.content {
            Some(content) if !content.is_empty() => Ok(NewJournalEntry { content }),
            _ => Err(ApiError::field_error("content", CONTENT_REQUIRED)),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateJournalEntryRequest {
    pub id: Option<i32>,
    pub content: Option<String>,
}

impl UpdateJournalEntryRequest {
    pub fn validate(self) -> Result<(i32, JournalEntryChanges), ApiError> {
        let id = require_id(self.id, RESOURCE)?;
        reject_empty(&self.content, "content", CONTENT_REQUIRED)?;
        Ok((id, JournalEntryChanges { content: self.content }))
    }
}

/// GET /api/journal - entries owned by the caller, newest first
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Vec<JournalEntry>> {
    let entries = state.store.list_entries(&user.user_id).await?;
    Ok(ApiResponse::success(entries))
}

/// POST /api/journal
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidJson(payload): ValidJson<CreateJournalEntryRequest>,
) -> ApiResult<JournalEntry> {
    let entry = payload.validate()?;
    let created = state.store.insert_entry(&user.user_id, entry).await?;
    tracing::debug!("Journal entry {} created for {}", created.id, user.user_id);
    Ok(ApiResponse::created(created))
}

/// PATCH /api/journal
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidJson(payload): ValidJson<UpdateJournalEntryRequest>,
) -> ApiResult<JournalEntry> {
    let (id, changes) = payload.validate()?;
    state
        .store
        .update_entry(&user.user_id, id, changes)
        .await?
        .map(ApiResponse::success)
        .ok_or_else(|| not_found_or_unauthorized(RESOURCE))
}

/// DELETE /api/journal
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidJson(payload): ValidJson<IdRequest>,
) -> ApiResult<Acknowledged> {
    let id = require_id(payload.id, RESOURCE)?;
    if state.store.delete_entry(&user.user_id, id).await? {
        Ok(ApiResponse::acknowledged())
    } else {
        Err(not_found_or_unauthorized(RESOURCE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_requires_non_empty_content() {
        let missing = CreateJournalEntryRequest { content: None };
        assert!(missing.validate().is_err());

        let empty = CreateJournalEntryRequest { content: Some(String::new()) };
        assert!(empty.validate().is_err());

        let ok = CreateJournalEntryRequest { content: Some("hello".into()) };
        assert_eq!(ok.validate().unwrap().content, "hello");
    }

    #[test]
    fn update_requires_id_and_allows_missing_content() {
        let no_id = UpdateJournalEntryRequest { id: None, content: Some("x".into()) };
        assert_eq!(no_id.validate().unwrap_err().message(), "Journal entry ID is required");

        let (id, changes) = UpdateJournalEntryRequest { id: Some(7), content: None }
            .validate()
            .unwrap();
        assert_eq!(id, 7);
        assert_eq!(changes.content, None);
    }
}
