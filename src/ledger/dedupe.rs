use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Idempotency key for a reminder within the clock hour containing `now`,
/// e.g. `<reminder id>-2024-05-01T09`.
pub fn dedupe_key(reminder_id: Uuid, now: DateTime<Utc>) -> String {
    format!("{}-{}", reminder_id, now.format("%Y-%m-%dT%H"))
}
