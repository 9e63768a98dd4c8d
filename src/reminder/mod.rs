pub mod recurrence;
pub mod reminder_models;
pub mod reminder_repository;

pub use recurrence::{is_due, Recurrence, DUE_WINDOW_MS};
pub use reminder_models::{Channel, Reminder, ReminderRow};
pub use reminder_repository::{InMemoryReminderRepository, ReminderRepository, ReminderStore};
