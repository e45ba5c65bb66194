use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

use super::models::{
    Goal, GoalChanges, JournalEntry, JournalEntryChanges, NewGoal, NewJournalEntry, StatusType,
    User,
};
use super::store::{GoalStore, JournalStore, Store, StoreError, UserStore};

/// In-process store with the same referential rules as the PostgreSQL schema:
/// owners must exist, goal statuses must exist, and deleting a user cascades
/// to its entries and goals. Each operation runs under a single write lock,
/// which makes the owner+id predicate atomic with the write it guards.
pub struct MemoryStore {
    state: RwLock<State>,
}

#[derive(Default)]
struct State {
    users: HashMap<String, User>,
    entries: BTreeMap<i32, JournalEntry>,
    goals: BTreeMap<i32, Goal>,
    status_types: Vec<StatusType>,
    next_entry_id: i32,
    next_goal_id: i32,
    last_timestamp: Option<DateTime<Utc>>,
}

impl State {
    /// Strictly increasing clock so ordering and update checks never tie.
    fn tick(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let now = match self.last_timestamp {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_timestamp = Some(now);
        now
    }

    fn require_user(&self, owner: &str, constraint: &str) -> Result<(), StoreError> {
        if self.users.contains_key(owner) {
            Ok(())
        } else {
            Err(StoreError::ForeignKey(constraint.to_string()))
        }
    }

    fn require_status(&self, status_id: i32) -> Result<(), StoreError> {
        if self.status_types.iter().any(|s| s.id == status_id) {
            Ok(())
        } else {
            Err(StoreError::ForeignKey("goals_status_id_fkey".to_string()))
        }
    }
}

impl MemoryStore {
    /// Empty store seeded with the standard status types.
    pub fn new() -> Self {
        let state = State {
            status_types: StatusType::seeded(),
            next_entry_id: 1,
            next_goal_id: 1,
            ..State::default()
        };
        Self {
            state: RwLock::new(state),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, id: &str) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        if state.users.contains_key(id) {
            return Ok(false);
        }
        let now = state.tick();
        state.users.insert(
            id.to_string(),
            User {
                id: id.to_string(),
                created_at: now,
                updated_at: now,
            },
        );
        Ok(true)
    }

    async fn delete_user(&self, id: &str) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        if state.users.remove(id).is_none() {
            return Ok(false);
        }
        state.entries.retain(|_, entry| entry.user_id != id);
        state.goals.retain(|_, goal| goal.user_id != id);
        Ok(true)
    }
}

#[async_trait]
impl JournalStore for MemoryStore {
    async fn list_entries(&self, owner: &str) -> Result<Vec<JournalEntry>, StoreError> {
        let state = self.state.read().await;
        let mut entries: Vec<JournalEntry> = state
            .entries
            .values()
            .filter(|entry| entry.user_id == owner)
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(entries)
    }

    async fn insert_entry(
        &self,
        owner: &str,
        entry: NewJournalEntry,
    ) -> Result<JournalEntry, StoreError> {
        let mut state = self.state.write().await;
        state.require_user(owner, "journal_entries_user_id_fkey")?;

        let id = state.next_entry_id;
        state.next_entry_id += 1;
        let now = state.tick();
        let created = JournalEntry {
            id,
            user_id: owner.to_string(),
            content: entry.content,
            created_at: now,
            updated_at: now,
        };
        state.entries.insert(id, created.clone());
        Ok(created)
    }

    async fn update_entry(
        &self,
        owner: &str,
        id: i32,
        changes: JournalEntryChanges,
    ) -> Result<Option<JournalEntry>, StoreError> {
        let mut state = self.state.write().await;
        let now = state.tick();
        let Some(entry) = state
            .entries
            .get_mut(&id)
            .filter(|entry| entry.user_id == owner)
        else {
            return Ok(None);
        };

        if let Some(content) = changes.content {
            entry.content = content;
        }
        entry.updated_at = now;
        Ok(Some(entry.clone()))
    }

    async fn delete_entry(&self, owner: &str, id: i32) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        let owned = state
            .entries
            .get(&id)
            .is_some_and(|entry| entry.user_id == owner);
        if owned {
            state.entries.remove(&id);
        }
        Ok(owned)
    }
}

#[async_trait]
impl GoalStore for MemoryStore {
    async fn list_goals(&self, owner: &str) -> Result<Vec<Goal>, StoreError> {
        let state = self.state.read().await;
        let mut goals: Vec<Goal> = state
            .goals
            .values()
            .filter(|goal| goal.user_id == owner)
            .cloned()
            .collect();
        goals.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(goals)
    }

    async fn insert_goal(&self, owner: &str, goal: NewGoal) -> Result<Goal, StoreError> {
        let mut state = self.state.write().await;
        state.require_user(owner, "goals_user_id_fkey")?;
        state.require_status(goal.status_id)?;

        let id = state.next_goal_id;
        state.next_goal_id += 1;
        let now = state.tick();
        let created = Goal {
            id,
            title: goal.title,
            description: goal.description,
            target_date: goal.target_date,
            status_id: goal.status_id,
            user_id: owner.to_string(),
            created_at: now,
            updated_at: now,
        };
        state.goals.insert(id, created.clone());
        Ok(created)
    }

    async fn update_goal(
        &self,
        owner: &str,
        id: i32,
        changes: GoalChanges,
    ) -> Result<Option<Goal>, StoreError> {
        let mut state = self.state.write().await;
        let owned = state
            .goals
            .get(&id)
            .is_some_and(|goal| goal.user_id == owner);
        if !owned {
            return Ok(None);
        }
        if let Some(status_id) = changes.status_id {
            state.require_status(status_id)?;
        }

        let now = state.tick();
        let Some(goal) = state.goals.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(title) = changes.title {
            goal.title = title;
        }
        if let Some(description) = changes.description {
            goal.description = description;
        }
        if let Some(target_date) = changes.target_date {
            goal.target_date = target_date;
        }
        if let Some(status_id) = changes.status_id {
            goal.status_id = status_id;
        }
        goal.updated_at = now;
        Ok(Some(goal.clone()))
    }

    async fn delete_goal(&self, owner: &str, id: i32) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        let owned = state
            .goals
            .get(&id)
            .is_some_and(|goal| goal.user_id == owner);
        if owned {
            state.goals.remove(&id);
        }
        Ok(owned)
    }

    async fn list_status_types(&self) -> Result<Vec<StatusType>, StoreError> {
        let state = self.state.read().await;
        Ok(state.status_types.clone())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
