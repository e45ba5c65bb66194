use axum::extract::{Extension, State};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::api::{nullable::deserialize_nullable, ValidJson};
use crate::database::models::{Goal, GoalChanges, NewGoal, DEFAULT_STATUS_ID};
use crate::error::ApiError;
use crate::middleware::{response::Acknowledged, ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

use super::utils::{not_found_or_unauthorized, reject_empty, require_id, IdRequest};

const RESOURCE: &str = "Goal";
const TITLE_AND_DATE_REQUIRED: &str = "Title and target date are required";

/// `targetDate` must be a `YYYY-MM-DD` string; anything else fails
/// deserialization and never reaches the store.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGoalRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub target_date: Option<NaiveDate>,
    pub status_id: Option<i32>,
}

impl CreateGoalRequest {
    pub fn validate(self) -> Result<NewGoal, ApiError> {
        let title = self
            .title
            .filter(|title| !title.is_empty())
            .ok_or_else(|| ApiError::field_error("title", TITLE_AND_DATE_REQUIRED))?;
        let target_date = self
            .target_date
            .ok_or_else(|| ApiError::field_error("targetDate", TITLE_AND_DATE_REQUIRED))?;

        Ok(NewGoal {
            title,
            description: self.description,
            target_date,
            status_id: self.status_id.unwrap_or(DEFAULT_STATUS_ID),
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGoalRequest {
    pub id: Option<i32>,
    pub title: Option<String>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    pub description: Option<Option<String>>,
    pub target_date: Option<NaiveDate>,
    pub status_id: Option<i32>,
}

impl UpdateGoalRequest {
    pub fn validate(self) -> Result<(i32, GoalChanges), ApiError> {
        let id = require_id(self.id, RESOURCE)?;
        reject_empty(&self.title, "title", "Title cannot be empty")?;

        Ok((
            id,
            GoalChanges {
                title: self.title,
                description: self.description,
                target_date: self.target_date,
                status_id: self.status_id,
            },
        ))
    }
}

/// GET /api/goals - goals owned by the caller, newest first
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Vec<Goal>> {
    let goals = state.store.list_goals(&user.user_id).await?;
    Ok(ApiResponse::success(goals))
}

/// POST /api/goals
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidJson(payload): ValidJson<CreateGoalRequest>,
) -> ApiResult<Goal> {
    let goal = payload.validate()?;
    let created = state.store.insert_goal(&user.user_id, goal).await?;
    tracing::debug!("Goal {} created for {}", created.id, user.user_id);
    Ok(ApiResponse::created(created))
}

/// PATCH /api/goals
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidJson(payload): ValidJson<UpdateGoalRequest>,
) -> ApiResult<Goal> {
    let (id, changes) = payload.validate()?;
    state
        .store
        .update_goal(&user.user_id, id, changes)
        .await?
        .map(ApiResponse::success)
        .ok_or_else(|| not_found_or_unauthorized(RESOURCE))
}

/// DELETE /api/goals
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidJson(payload): ValidJson<IdRequest>,
) -> ApiResult<Acknowledged> {
    let id = require_id(payload.id, RESOURCE)?;
    if state.store.delete_goal(&user.user_id, id).await? {
        Ok(ApiResponse::acknowledged())
    } else {
        Err(not_found_or_unauthorized(RESOURCE))
    }
}
