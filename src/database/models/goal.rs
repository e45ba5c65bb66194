use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Status assigned to goals created without an explicit `statusId`.
pub const DEFAULT_STATUS_ID: i32 = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub target_date: NaiveDate,
    pub status_id: i32,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGoal {
    pub title: String,
    pub description: Option<String>,
    pub target_date: NaiveDate,
    pub status_id: i32,
}

/// Partial goal update.
///
/// `description` is doubly optional: the outer `None` keeps the stored value,
/// `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoalChanges {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub target_date: Option<NaiveDate>,
    pub status_id: Option<i32>,
}
