use serde::Deserialize;

use crate::error::ApiError;

/// Body of a DELETE: just the record id
#[derive(Debug, Deserialize)]
pub struct IdRequest {
    pub id: Option<i32>,
}

/// Missing id is a 400 naming the resource
pub fn require_id(id: Option<i32>, resource: &str) -> Result<i32, ApiError> {
    id.ok_or_else(|| ApiError::field_error("id", format!("{} ID is required", resource)))
}

/// Present-but-empty strings are rejected; absent is left to the caller
pub fn reject_empty(value: &Option<String>, field: &str, message: &str) -> Result<(), ApiError> {
    match value {
        Some(s) if s.is_empty() => Err(ApiError::field_error(field, message)),
        _ => Ok(()),
    }
}

/// Same 404 whether the id does not exist or belongs to someone else
pub fn not_found_or_unauthorized(resource: &str) -> ApiError {
    ApiError::not_found(format!("{} not found or not authorized", resource))
}
