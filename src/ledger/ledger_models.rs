use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::reminder::{Channel, Reminder};

/// Proof that a reminder was claimed for one delivery window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendLogEntry {
    pub dedupe_key: String,
    pub user_id: Uuid,
    pub reminder_id: Uuid,
    pub channel: Channel,
    pub created_at: DateTime<Utc>,
}

impl SendLogEntry {
    pub fn new(
        dedupe_key: String,
        reminder: &Reminder,
        channel: Channel,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            dedupe_key,
            user_id: reminder.user_id,
            reminder_id: reminder.id,
            channel,
            created_at,
        }
    }
}
