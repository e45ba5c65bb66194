use async_trait::async_trait;
use thiserror::Error;

use super::models::{
    Goal, GoalChanges, JournalEntry, JournalEntryChanges, NewGoal, NewJournalEntry, StatusType,
};

/// Errors raised by any store backend
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Foreign key violation: {0}")]
    ForeignKey(String),

    #[error("Unique violation: {0}")]
    Conflict(String),

    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Sqlx(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            let constraint = db_err.constraint().unwrap_or("unknown").to_string();
            match db_err.code().as_deref() {
                Some("23503") => return StoreError::ForeignKey(constraint),
                Some("23505") => return StoreError::Conflict(constraint),
                _ => {}
            }
        }
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                StoreError::Unavailable(err.to_string())
            }
            other => StoreError::Sqlx(other),
        }
    }
}

/// Projection of identity-provider users.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts the user; returns `false` when a row with that id already existed.
    async fn insert_user(&self, id: &str) -> Result<bool, StoreError>;

    /// Deletes the user and, through cascading foreign keys, everything it
    /// owns. Returns `false` when no row matched.
    async fn delete_user(&self, id: &str) -> Result<bool, StoreError>;
}

/// Journal entries scoped to their owner. Every method takes the owner's id
/// and never touches rows belonging to anyone else.
#[async_trait]
pub trait JournalStore: Send + Sync {
    /// Newest first.
    async fn list_entries(&self, owner: &str) -> Result<Vec<JournalEntry>, StoreError>;

    async fn insert_entry(
        &self,
        owner: &str,
        entry: NewJournalEntry,
    ) -> Result<JournalEntry, StoreError>;

    /// Applies `changes` in one conditional write matching both id and owner.
    /// `Ok(None)` covers both a missing id and an id owned by someone else.
    async fn update_entry(
        &self,
        owner: &str,
        id: i32,
        changes: JournalEntryChanges,
    ) -> Result<Option<JournalEntry>, StoreError>;

    async fn delete_entry(&self, owner: &str, id: i32) -> Result<bool, StoreError>;
}

/// Goals scoped to their owner, plus the status lookup table.
#[async_trait]
pub trait GoalStore: Send + Sync {
    async fn list_goals(&self, owner: &str) -> Result<Vec<Goal>, StoreError>;

    async fn insert_goal(&self, owner: &str, goal: NewGoal) -> Result<Goal, StoreError>;

    async fn update_goal(
        &self,
        owner: &str,
        id: i32,
        changes: GoalChanges,
    ) -> Result<Option<Goal>, StoreError>;

    async fn delete_goal(&self, owner: &str, id: i32) -> Result<bool, StoreError>;

    async fn list_status_types(&self) -> Result<Vec<StatusType>, StoreError>;
}

/// Everything the HTTP layer needs from a backend.
#[async_trait]
pub trait Store: UserStore + JournalStore + GoalStore {
    /// Cheap connectivity probe for `/health`.
    async fn ping(&self) -> Result<(), StoreError>;
}
