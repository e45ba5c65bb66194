use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    pub id: i32,
    pub user_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated input for a new entry. The owner is supplied separately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewJournalEntry {
    pub content: String,
}

/// Mutable fields of an entry; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JournalEntryChanges {
    pub content: Option<String>,
}
