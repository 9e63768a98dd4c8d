use async_trait::async_trait;
use dashmap::{mapref::entry::Entry, DashMap};
use sqlx::PgPool;

use super::ledger_models::SendLogEntry;
use crate::error::LedgerError;

/// Append-only record of dispatched (reminder, window) pairs.
///
/// `exists` is advisory only. `record` is an atomic insert-if-absent and is
/// the authoritative idempotency check: it must return
/// [`LedgerError::Conflict`] when the key is already present, even when two
/// writers race.
#[async_trait]
pub trait SendLedger: Send + Sync {
    async fn exists(&self, dedupe_key: &str) -> Result<bool, LedgerError>;

    async fn record(&self, entry: &SendLogEntry) -> Result<(), LedgerError>;
}

#[derive(Clone)]
pub struct SendLedgerRepository {
    pool: PgPool,
}

impl SendLedgerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SendLedger for SendLedgerRepository {
    async fn exists(&self, dedupe_key: &str) -> Result<bool, LedgerError> {
        let found: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM send_log WHERE dedupe_key = $1)")
                .bind(dedupe_key)
                .fetch_one(&self.pool)
                .await?;

        Ok(found)
    }

    async fn record(&self, entry: &SendLogEntry) -> Result<(), LedgerError> {
        let result = sqlx::query(
            "INSERT INTO send_log (dedupe_key, user_id, reminder_id, channel, created_at)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (dedupe_key) DO NOTHING",
        )
        .bind(&entry.dedupe_key)
        .bind(entry.user_id)
        .bind(entry.reminder_id)
        .bind(entry.channel.as_str())
        .bind(entry.created_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(LedgerError::Conflict(entry.dedupe_key.clone()));
        }

        Ok(())
    }
}

/// Ledger keyed by dedupe key; the map entry lock gives insert-if-absent.
#[derive(Default)]
pub struct InMemorySendLedger {
    entries: DashMap<String, SendLogEntry>,
}

impl InMemorySendLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<SendLogEntry> {
        self.entries.iter().map(|e| e.value().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl SendLedger for InMemorySendLedger {
    async fn exists(&self, dedupe_key: &str) -> Result<bool, LedgerError> {
        Ok(self.entries.contains_key(dedupe_key))
    }

    async fn record(&self, entry: &SendLogEntry) -> Result<(), LedgerError> {
        match self.entries.entry(entry.dedupe_key.clone()) {
            Entry::Occupied(_) => Err(LedgerError::Conflict(entry.dedupe_key.clone())),
            Entry::Vacant(vacant) => {
                vacant.insert(entry.clone());
                Ok(())
            }
        }
    }
}
