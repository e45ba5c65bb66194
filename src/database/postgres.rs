use async_trait::async_trait;
use sqlx::PgPool;

use super::models::{
    Goal, GoalChanges, JournalEntry, JournalEntryChanges, NewGoal, NewJournalEntry, StatusType,
};
use super::store::{GoalStore, JournalStore, Store, StoreError, UserStore};

const JOURNAL_COLUMNS: &str = "id, user_id, content, created_at, updated_at";
const GOAL_COLUMNS: &str =
    "id, title, description, target_date, status_id, user_id, created_at, updated_at";

// now() is fixed per transaction, so bump past the stored value to keep
// updated_at strictly increasing across rapid writes.
const TOUCH_UPDATED_AT: &str = "updated_at = GREATEST(now(), updated_at + interval '1 microsecond')";

/// PostgreSQL-backed store. Ownership and existence are always checked in the
/// same statement that reads or writes the row.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn insert_user(&self, id: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("INSERT INTO users (id) VALUES ($1) ON CONFLICT (id) DO NOTHING")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn delete_user(&self, id: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl JournalStore for PgStore {
    async fn list_entries(&self, owner: &str) -> Result<Vec<JournalEntry>, StoreError> {
        let sql = format!(
            "SELECT {JOURNAL_COLUMNS} FROM journal_entries WHERE user_id = $1 ORDER BY created_at DESC, id DESC"
        );
        let entries = sqlx::query_as::<_, JournalEntry>(&sql)
            .bind(owner)
            .fetch_all(&self.pool)
            .await?;
        Ok(entries)
    }

    async fn insert_entry(
        &self,
        owner: &str,
        entry: NewJournalEntry,
    ) -> Result<JournalEntry, StoreError> {
        let sql = format!(
            "INSERT INTO journal_entries (user_id, content) VALUES ($1, $2) RETURNING {JOURNAL_COLUMNS}"
        );
        let created = sqlx::query_as::<_, JournalEntry>(&sql)
            .bind(owner)
            .bind(entry.content)
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    async fn update_entry(
        &self,
        owner: &str,
        id: i32,
        changes: JournalEntryChanges,
    ) -> Result<Option<JournalEntry>, StoreError> {
        let sql = format!(
            "UPDATE journal_entries \
             SET content = COALESCE($3::text, content), {TOUCH_UPDATED_AT} \
             WHERE id = $1 AND user_id = $2 \
             RETURNING {JOURNAL_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, JournalEntry>(&sql)
            .bind(id)
            .bind(owner)
            .bind(changes.content)
            .fetch_optional(&self.pool)
            .await?;
        Ok(updated)
    }

    async fn delete_entry(&self, owner: &str, id: i32) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM journal_entries WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl GoalStore for PgStore {
    async fn list_goals(&self, owner: &str) -> Result<Vec<Goal>, StoreError> {
        let sql = format!(
            "SELECT {GOAL_COLUMNS} FROM goals WHERE user_id = $1 ORDER BY created_at DESC, id DESC"
        );
        let goals = sqlx::query_as::<_, Goal>(&sql)
            .bind(owner)
            .fetch_all(&self.pool)
            .await?;
        Ok(goals)
    }

    async fn insert_goal(&self, owner: &str, goal: NewGoal) -> Result<Goal, StoreError> {
        let sql = format!(
            "INSERT INTO goals (user_id, title, description, target_date, status_id) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {GOAL_COLUMNS}"
        );
        let created = sqlx::query_as::<_, Goal>(&sql)
            .bind(owner)
            .bind(goal.title)
            .bind(goal.description)
            .bind(goal.target_date)
            .bind(goal.status_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    async fn update_goal(
        &self,
        owner: &str,
        id: i32,
        changes: GoalChanges,
    ) -> Result<Option<Goal>, StoreError> {
        let (set_description, description) = match changes.description {
            Some(value) => (true, value),
            None => (false, None),
        };
        let sql = format!(
            "UPDATE goals SET \
               title = COALESCE($3::text, title), \
               description = CASE WHEN $4::boolean THEN $5::text ELSE description END, \
               target_date = COALESCE($6::date, target_date), \
               status_id = COALESCE($7::integer, status_id), \
               {TOUCH_UPDATED_AT} \
             WHERE id = $1 AND user_id = $2 \
             RETURNING {GOAL_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Goal>(&sql)
            .bind(id)
            .bind(owner)
            .bind(changes.title)
            .bind(set_description)
            .bind(description)
            .bind(changes.target_date)
            .bind(changes.status_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(updated)
    }

    async fn delete_goal(&self, owner: &str, id: i32) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM goals WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_status_types(&self) -> Result<Vec<StatusType>, StoreError> {
        let statuses = sqlx::query_as::<_, StatusType>("SELECT id, name FROM status_types ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(statuses)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
