use chrono::{DateTime, Utc};
use futures::{stream, StreamExt};
use std::{collections::BTreeSet, sync::Arc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    channel::{EmailSender, PushSender},
    error::{DispatchError, LedgerError, SendError},
    ledger::{dedupe_key, SendLedger, SendLogEntry},
    recipient::{DeliveryTarget, RecipientDirectory, RecipientResolver},
    reminder::{is_due, Channel, Reminder, ReminderStore},
    state::DispatchSettings,
};

/// What happened to one due reminder in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderOutcome {
    /// At least one target accepted the message.
    Sent,
    /// The window was already claimed, by an earlier or concurrent run.
    AlreadySent,
    NoRecipients,
    /// Claimed, but every target failed.
    Failed,
    /// Recipient lookup or ledger access failed; nothing was sent.
    Skipped,
}

/// Per-run tally. Only `sent` is exposed to callers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunReport {
    pub loaded: usize,
    pub due: usize,
    pub sent: usize,
    pub already_sent: usize,
    pub no_recipients: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl RunReport {
    fn tally(&mut self, outcome: ReminderOutcome) {
        match outcome {
            ReminderOutcome::Sent => self.sent += 1,
            ReminderOutcome::AlreadySent => self.already_sent += 1,
            ReminderOutcome::NoRecipients => self.no_recipients += 1,
            ReminderOutcome::Failed => self.failed += 1,
            ReminderOutcome::Skipped => self.skipped += 1,
        }
    }
}

/// The run loop: load, filter by due window, resolve, claim, deliver.
pub struct ReminderDispatcher {
    reminders: Arc<dyn ReminderStore>,
    resolver: RecipientResolver,
    ledger: Arc<dyn SendLedger>,
    email: EmailSender,
    push: Option<PushSender>,
    settings: DispatchSettings,
}

impl ReminderDispatcher {
    pub fn new(
        reminders: Arc<dyn ReminderStore>,
        resolver: RecipientResolver,
        ledger: Arc<dyn SendLedger>,
        email: EmailSender,
        push: Option<PushSender>,
        settings: DispatchSettings,
    ) -> Self {
        Self {
            reminders,
            resolver,
            ledger,
            email,
            push,
            settings,
        }
    }

    pub async fn run_email_reminders(&self, now: DateTime<Utc>) -> Result<RunReport, DispatchError> {
        self.run(Channel::Email, now).await
    }

    pub async fn run_push_reminders(&self, now: DateTime<Utc>) -> Result<RunReport, DispatchError> {
        if self.push.is_none() {
            return Err(DispatchError::ChannelNotConfigured(Channel::Push));
        }
        self.run(Channel::Push, now).await
    }

    async fn run(&self, channel: Channel, now: DateTime<Utc>) -> Result<RunReport, DispatchError> {
        let filter = match channel {
            Channel::Push => Some(Channel::Push),
            Channel::Email => None,
        };
        let reminders = self.reminders.list_enabled_reminders(filter).await?;

        let mut report = RunReport {
            loaded: reminders.len(),
            ..RunReport::default()
        };

        let due: Vec<Reminder> = reminders
            .into_iter()
            .filter(|r| r.is_handled_by(channel))
            .filter(|r| is_due(r, now))
            .collect();
        report.due = due.len();
        info!(
            "Starting {} reminder run: {} loaded, {} due",
            channel, report.loaded, report.due
        );

        if due.is_empty() {
            return Ok(report);
        }

        let user_ids: Vec<Uuid> = due
            .iter()
            .map(|r| r.user_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let directory = match channel {
            Channel::Email => self.resolver.resolve_emails(&user_ids).await,
            Channel::Push => self.resolver.resolve_push_targets(&user_ids).await,
        };

        let directory = &directory;
        let outcomes: Vec<ReminderOutcome> = stream::iter(due)
            .map(|reminder| async move { self.process(&reminder, directory, channel, now).await })
            .buffer_unordered(self.settings.concurrency)
            .collect()
            .await;

        for outcome in outcomes {
            report.tally(outcome);
        }

        info!(
            "Finished {} reminder run: sent={} due={} already_sent={} no_recipients={} failed={} skipped={}",
            channel,
            report.sent,
            report.due,
            report.already_sent,
            report.no_recipients,
            report.failed,
            report.skipped
        );

        Ok(report)
    }

    async fn process(
        &self,
        reminder: &Reminder,
        directory: &RecipientDirectory,
        channel: Channel,
        now: DateTime<Utc>,
    ) -> ReminderOutcome {
        let targets = match directory.targets_for(reminder.user_id) {
            Ok(targets) => targets,
            Err(e) => {
                warn!("Skipping reminder {}: {}", reminder.id, e);
                return ReminderOutcome::Skipped;
            }
        };
        if targets.is_empty() {
            debug!(
                "No {} recipients for reminder {} (user {})",
                channel, reminder.id, reminder.user_id
            );
            return ReminderOutcome::NoRecipients;
        }

        let key = dedupe_key(reminder.id, now);
        match self.ledger.exists(&key).await {
            Ok(true) => {
                debug!("Reminder {} already sent for {}", reminder.id, key);
                return ReminderOutcome::AlreadySent;
            }
            Ok(false) => {}
            Err(e) => {
                warn!("Skipping reminder {}: {}", reminder.id, e);
                return ReminderOutcome::Skipped;
            }
        }

        // The insert is the real claim; `exists` above can race.
        let entry = SendLogEntry::new(key, reminder, channel, now);
        match self.ledger.record(&entry).await {
            Ok(()) => {}
            Err(LedgerError::Conflict(key)) => {
                debug!("Reminder {} claimed concurrently for {}", reminder.id, key);
                return ReminderOutcome::AlreadySent;
            }
            Err(e @ LedgerError::Unavailable(_)) => {
                warn!("Skipping reminder {}: {}", reminder.id, e);
                return ReminderOutcome::Skipped;
            }
        }

        let mut delivered = 0;
        for target in targets {
            match self.deliver(target, reminder).await {
                Ok(()) => delivered += 1,
                Err(e) => warn!(
                    channel = %channel,
                    reminder_id = %reminder.id,
                    user_id = %reminder.user_id,
                    kind = e.kind(),
                    "Delivery failed: {}",
                    e
                ),
            }
        }

        if delivered > 0 {
            info!(
                "Sent {} reminder {} to {}/{} target(s)",
                channel,
                reminder.id,
                delivered,
                targets.len()
            );
            ReminderOutcome::Sent
        } else {
            ReminderOutcome::Failed
        }
    }

    async fn deliver(&self, target: &DeliveryTarget, reminder: &Reminder) -> Result<(), SendError> {
        let send = async {
            match target {
                DeliveryTarget::Email {
                    address,
                    display_name,
                } => {
                    self.email
                        .send(address, display_name.as_deref(), reminder)
                        .await
                }
                DeliveryTarget::Push(push_target) => match &self.push {
                    Some(push) => push.send(push_target, reminder).await,
                    None => Err(SendError::Unavailable(
                        "push channel is not configured".to_string(),
                    )),
                },
            }
        };

        match tokio::time::timeout(self.settings.send_timeout, send).await {
            Ok(result) => result,
            Err(_) => Err(SendError::Unavailable(format!(
                "send timed out after {:?}",
                self.settings.send_timeout
            ))),
        }
    }
}
