use axum::extract::State;

use crate::database::models::StatusType;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET /api/status-types - reference list for goal status pickers
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<StatusType>> {
    let statuses = state.store.list_status_types().await?;
    Ok(ApiResponse::success(statuses))
}
