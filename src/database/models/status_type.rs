use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct StatusType {
    pub id: i32,
    pub name: String,
}

/// Reference rows seeded by the initial migration, in id order.
pub const SEEDED_STATUS_TYPES: [(i32, &str); 3] =
    [(1, "completed"), (2, "not started"), (3, "in progress")];

impl StatusType {
    pub fn seeded() -> Vec<StatusType> {
        SEEDED_STATUS_TYPES
            .iter()
            .map(|(id, name)| StatusType {
                id: *id,
                name: (*name).to_string(),
            })
            .collect()
    }
}
