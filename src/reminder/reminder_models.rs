use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

use super::recurrence::Recurrence;

/// Delivery medium of a reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Email,
    Push,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Email => "email",
            Channel::Push => "push",
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "email" => Ok(Channel::Email),
            "push" => Ok(Channel::Push),
            other => Err(format!("unknown channel '{}'", other)),
        }
    }
}

/// A recurring notification configuration, read-only for the dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub struct Reminder {
    pub id: Uuid,
    pub user_id: Uuid,
    pub entity: String,
    /// `None` when the row carries no recurrence descriptor.
    pub recurrence: Option<Recurrence>,
    /// Wall-clock `HH:MM[:SS]`; only the minute is used.
    pub time_of_day: Option<String>,
    /// `None` means no channel restriction.
    pub channel: Option<Channel>,
    pub enabled: bool,
}

impl Reminder {
    /// Whether a run for `channel` should pick this reminder up.
    ///
    /// Unrestricted reminders are delivered by email only, which keeps the
    /// email and push runs working on disjoint sets.
    pub fn is_handled_by(&self, channel: Channel) -> bool {
        match (self.channel, channel) {
            (None, Channel::Email) => true,
            (None, Channel::Push) => false,
            (Some(own), run) => own == run,
        }
    }
}

/// Raw `reminders` table row.
#[derive(Debug, Clone, FromRow)]
pub struct ReminderRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub entity: String,
    pub rrule: Option<String>,
    pub time_of_day: Option<String>,
    pub channel: Option<String>,
    pub enabled: bool,
}

impl TryFrom<ReminderRow> for Reminder {
    type Error = String;

    fn try_from(row: ReminderRow) -> Result<Self, Self::Error> {
        let channel = match row.channel.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(raw.parse::<Channel>()?),
        };

        Ok(Reminder {
            id: row.id,
            user_id: row.user_id,
            entity: row.entity,
            recurrence: row.rrule.as_deref().map(Recurrence::parse),
            time_of_day: row.time_of_day,
            channel,
            enabled: row.enabled,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(channel: Option<&str>) -> ReminderRow {
        ReminderRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            entity: "habit".to_string(),
            rrule: Some("FREQ=DAILY;BYHOUR=9".to_string()),
            time_of_day: Some("09:30".to_string()),
            channel: channel.map(str::to_string),
            enabled: true,
        }
    }

    #[test]
    fn test_channel_display() {
        assert_eq!(Channel::Email.to_string(), "email");
        assert_eq!(Channel::Push.to_string(), "push");
    }

    #[test]
    fn test_row_conversion_parses_channel_and_recurrence() {
        let reminder = Reminder::try_from(row(Some("Push"))).unwrap();
        assert_eq!(reminder.channel, Some(Channel::Push));
        assert_eq!(reminder.recurrence, Some(Recurrence::DailyAt { hour: 9 }));
    }

    #[test]
    fn test_empty_channel_is_unrestricted() {
        assert_eq!(Reminder::try_from(row(Some(""))).unwrap().channel, None);
        assert_eq!(Reminder::try_from(row(None)).unwrap().channel, None);
    }

    #[test]
    fn test_unknown_channel_is_rejected() {
        assert!(Reminder::try_from(row(Some("sms"))).is_err());
    }

    #[test]
    fn test_channel_selection() {
        let mut reminder = Reminder::try_from(row(None)).unwrap();
        assert!(reminder.is_handled_by(Channel::Email));
        assert!(!reminder.is_handled_by(Channel::Push));

        reminder.channel = Some(Channel::Push);
        assert!(!reminder.is_handled_by(Channel::Email));
        assert!(reminder.is_handled_by(Channel::Push));
    }
}
