pub mod goal;
pub mod journal_entry;
pub mod status_type;
pub mod user;

pub use goal::{Goal, GoalChanges, NewGoal, DEFAULT_STATUS_ID};
pub use journal_entry::{JournalEntry, JournalEntryChanges, NewJournalEntry};
pub use status_type::StatusType;
pub use user::User;
