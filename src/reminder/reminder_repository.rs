use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::{Mutex, PoisonError};

use super::reminder_models::{Channel, Reminder, ReminderRow};
use crate::error::StoreError;

#[async_trait]
pub trait ReminderStore: Send + Sync {
    /// Enabled reminders, restricted to `channel` when given.
    async fn list_enabled_reminders(
        &self,
        channel: Option<Channel>,
    ) -> Result<Vec<Reminder>, StoreError>;
}

#[derive(Clone)]
pub struct ReminderRepository {
    pool: PgPool,
}

impl ReminderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReminderStore for ReminderRepository {
    async fn list_enabled_reminders(
        &self,
        channel: Option<Channel>,
    ) -> Result<Vec<Reminder>, StoreError> {
        let rows = sqlx::query_as::<_, ReminderRow>(
            "SELECT id, user_id, entity, rrule, time_of_day, channel, enabled
             FROM reminders
             WHERE enabled = true
             AND ($1::text IS NULL OR lower(channel) = $1)",
        )
        .bind(channel.map(|c| c.as_str()))
        .fetch_all(&self.pool)
        .await?;

        let reminders = rows
            .into_iter()
            .filter_map(|row| {
                let id = row.id;
                match Reminder::try_from(row) {
                    Ok(reminder) => Some(reminder),
                    Err(e) => {
                        tracing::warn!("Skipping reminder {}: {}", id, e);
                        None
                    }
                }
            })
            .collect();

        Ok(reminders)
    }
}

/// Reminder store backed by a vector, for tests and local runs.
#[derive(Default)]
pub struct InMemoryReminderRepository {
    reminders: Mutex<Vec<Reminder>>,
}

impl InMemoryReminderRepository {
    pub fn new(reminders: Vec<Reminder>) -> Self {
        Self {
            reminders: Mutex::new(reminders),
        }
    }

    pub fn insert(&self, reminder: Reminder) {
        self.reminders
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(reminder);
    }
}

#[async_trait]
impl ReminderStore for InMemoryReminderRepository {
    async fn list_enabled_reminders(
        &self,
        channel: Option<Channel>,
    ) -> Result<Vec<Reminder>, StoreError> {
        let reminders = self.reminders.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(reminders
            .iter()
            .filter(|r| r.enabled)
            .filter(|r| channel.is_none() || r.channel == channel)
            .cloned()
            .collect())
    }
}
