//! Due-window evaluation for the daily-at-hour recurrence subset.
//!
//! Descriptors are RRULE-shaped strings such as `FREQ=DAILY;BYHOUR=9`. Only a
//! single `BYHOUR` value (optionally with `FREQ=DAILY`) is understood; any
//! other shape parses to [`Recurrence::Unsupported`] and is never due.

use chrono::{DateTime, NaiveTime, Timelike, Utc};
use thiserror::Error;

use super::reminder_models::Reminder;

/// Half-width of the due window around the configured time.
pub const DUE_WINDOW_MS: i64 = 10 * 60 * 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recurrence {
    DailyAt { hour: u32 },
    Unsupported(String),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RecurrenceError {
    #[error("Invalid time of day: {0}")]
    InvalidTimeOfDay(String),
}

impl Recurrence {
    pub fn parse(descriptor: &str) -> Self {
        let unsupported = || Recurrence::Unsupported(descriptor.to_string());
        let body = descriptor.trim();
        let body = body
            .strip_prefix("RRULE:")
            .or_else(|| body.strip_prefix("rrule:"))
            .unwrap_or(body);

        let mut hour = None;
        for part in body.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            let Some((key, value)) = part.split_once('=') else {
                return unsupported();
            };
            match key.trim().to_ascii_uppercase().as_str() {
                "FREQ" if value.trim().eq_ignore_ascii_case("DAILY") => {}
                "BYHOUR" if hour.is_none() => match value.trim().parse::<u32>() {
                    Ok(h) if h < 24 => hour = Some(h),
                    _ => return unsupported(),
                },
                _ => return unsupported(),
            }
        }

        match hour {
            Some(hour) => Recurrence::DailyAt { hour },
            None => unsupported(),
        }
    }
}

/// Minute component of an `HH:MM[:SS]` string.
pub fn parse_minute(time_of_day: &str) -> Result<u32, RecurrenceError> {
    let trimmed = time_of_day.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"))
        .map(|t| t.minute())
        .map_err(|_| RecurrenceError::InvalidTimeOfDay(time_of_day.to_string()))
}

/// Whether `now` lies strictly within [`DUE_WINDOW_MS`] of the reminder's
/// time on the same calendar day. Never looks across midnight.
pub fn is_due(reminder: &Reminder, now: DateTime<Utc>) -> bool {
    if !reminder.enabled {
        return false;
    }
    let Some(Recurrence::DailyAt { hour }) = reminder.recurrence else {
        return false;
    };
    let minute = match reminder.time_of_day.as_deref() {
        None => 0,
        Some(raw) => match parse_minute(raw) {
            Ok(minute) => minute,
            Err(_) => return false,
        },
    };
    let Some(candidate) = now.date_naive().and_hms_opt(hour, minute, 0) else {
        return false;
    };

    let diff = candidate.and_utc().signed_duration_since(now);
    diff.num_milliseconds().abs() < DUE_WINDOW_MS
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use uuid::Uuid;

    fn reminder(rrule: Option<&str>, time_of_day: Option<&str>) -> Reminder {
        Reminder {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            entity: "habit".to_string(),
            recurrence: rrule.map(Recurrence::parse),
            time_of_day: time_of_day.map(str::to_string),
            channel: None,
            enabled: true,
        }
    }

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, h, m, s).unwrap()
    }

    #[test]
    fn test_parse_daily_hour() {
        assert_eq!(Recurrence::parse("FREQ=DAILY;BYHOUR=9"), Recurrence::DailyAt { hour: 9 });
        assert_eq!(Recurrence::parse("RRULE:FREQ=DAILY;BYHOUR=23"), Recurrence::DailyAt { hour: 23 });
        assert_eq!(Recurrence::parse("BYHOUR=0"), Recurrence::DailyAt { hour: 0 });
    }

    #[test]
    fn test_parse_rejects_other_shapes() {
        for descriptor in [
            "",
            "FREQ=DAILY",
            "FREQ=DAILY;BYHOUR=",
            "FREQ=DAILY;BYHOUR=nine",
            "FREQ=DAILY;BYHOUR=24",
            "FREQ=DAILY;BYHOUR=9,18",
            "FREQ=WEEKLY;BYHOUR=9",
            "FREQ=DAILY;BYHOUR=9;BYDAY=MO",
            "FREQ=DAILY;BYHOUR=9;BYHOUR=10",
        ] {
            assert!(
                matches!(Recurrence::parse(descriptor), Recurrence::Unsupported(_)),
                "{descriptor} should be unsupported"
            );
        }
    }

    #[test]
    fn test_parse_minute() {
        assert_eq!(parse_minute("09:45"), Ok(45));
        assert_eq!(parse_minute("09:45:30"), Ok(45));
        assert!(parse_minute("9h45").is_err());
        assert!(parse_minute("25:00").is_err());
    }

    #[test]
    fn test_missing_recurrence_is_never_due() {
        let r = reminder(None, Some("09:00"));
        for hour in 0..24 {
            assert!(!is_due(&r, at(hour, 0, 0)));
        }
    }

    #[test]
    fn test_unsupported_or_malformed_is_never_due() {
        assert!(!is_due(&reminder(Some("FREQ=DAILY;BYHOUR=x"), None), at(9, 0, 0)));
        assert!(!is_due(&reminder(Some("FREQ=DAILY;BYHOUR=9"), Some("garbage")), at(9, 0, 0)));
    }

    #[test]
    fn test_disabled_is_never_due() {
        let mut r = reminder(Some("FREQ=DAILY;BYHOUR=9"), None);
        r.enabled = false;
        assert!(!is_due(&r, at(9, 0, 0)));
    }

    #[test]
    fn test_window_is_exclusive_on_both_sides() {
        let r = reminder(Some("FREQ=DAILY;BYHOUR=9"), Some("09:30"));
        let target = at(9, 30, 0);
        let almost = Duration::milliseconds(DUE_WINDOW_MS - 1);
        let exactly = Duration::milliseconds(DUE_WINDOW_MS);

        assert!(is_due(&r, target));
        assert!(is_due(&r, target + almost));
        assert!(is_due(&r, target - almost));
        assert!(!is_due(&r, target + exactly));
        assert!(!is_due(&r, target - exactly));
        assert!(!is_due(&r, target + Duration::hours(1)));
    }

    #[test]
    fn test_minute_defaults_to_zero() {
        let r = reminder(Some("FREQ=DAILY;BYHOUR=7"), None);
        assert!(is_due(&r, at(7, 9, 59)));
        assert!(is_due(&r, at(6, 50, 1)));
        assert!(!is_due(&r, at(7, 10, 0)));
    }

    #[test]
    fn test_every_hour_and_minute_combination() {
        for hour in 0..24 {
            for minute in (0..60).step_by(7) {
                let time = format!("{:02}:{:02}", hour, minute);
                let r = reminder(Some(&format!("FREQ=DAILY;BYHOUR={}", hour)), Some(&time));
                let target = at(hour, minute, 0);
                assert!(is_due(&r, target), "{time} at target");
                assert!(!is_due(&r, target + Duration::minutes(10)), "{time} +10min");
            }
        }
    }

    #[test]
    fn test_does_not_wrap_across_midnight() {
        let r = reminder(Some("FREQ=DAILY;BYHOUR=23"), Some("23:59"));
        let next_day = Utc.with_ymd_and_hms(2024, 5, 2, 0, 4, 0).unwrap();
        assert!(!is_due(&r, next_day));
        assert!(is_due(&r, at(23, 55, 0)));
    }
}
