use std::{sync::Arc, time::Duration};

use crate::{dispatch::ReminderDispatcher, error::ConfigError};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub dispatcher: Arc<ReminderDispatcher>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    /// Bearer secret the scheduler must present; `None` leaves runs open.
    pub cron_secret: Option<String>,
    /// Cron expression for in-process runs; `None` when set to `off`.
    pub reminder_cron: Option<String>,
    pub email: EmailConfig,
    pub vapid: Option<VapidConfig>,
    pub dispatch: DispatchSettings,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EmailConfig {
    pub api_url: String,
    pub api_key: String,
    pub from: String,
    pub app_url: String,
}

/// Web Push credentials, built once per process.
#[derive(Clone, Debug, PartialEq)]
pub struct VapidConfig {
    /// Checked against `private_key` when the push transport is built.
    pub public_key: String,
    pub private_key: String,
    /// Contact identity, e.g. `mailto:ops@example.com`.
    pub subject: String,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DispatchSettings {
    /// Upper bound on reminders processed at once.
    pub concurrency: usize,
    pub send_timeout: Duration,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            concurrency: 8,
            send_timeout: Duration::from_secs(10),
        }
    }
}

const DEFAULT_EMAIL_API_URL: &str = "https://api.resend.com/emails";
const DEFAULT_REMINDER_CRON: &str = "0 */5 * * * *";

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from any variable source; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let require = |name: &'static str| get(name).ok_or(ConfigError::Missing(name));

        let port = match get("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| ConfigError::Invalid { name: "PORT", value: raw })?,
            None => 3000,
        };

        let reminder_cron = match get("REMINDER_CRON") {
            Some(raw) if raw.trim().eq_ignore_ascii_case("off") => None,
            Some(raw) => Some(raw),
            None => Some(DEFAULT_REMINDER_CRON.to_string()),
        };

        let vapid = match (
            get("VAPID_PUBLIC_KEY"),
            get("VAPID_PRIVATE_KEY"),
            get("VAPID_SUBJECT"),
        ) {
            (Some(public_key), Some(private_key), Some(subject)) => Some(VapidConfig {
                public_key,
                private_key,
                subject,
            }),
            (None, None, None) => None,
            (None, _, _) => return Err(ConfigError::Missing("VAPID_PUBLIC_KEY")),
            (_, None, _) => return Err(ConfigError::Missing("VAPID_PRIVATE_KEY")),
            (_, _, None) => return Err(ConfigError::Missing("VAPID_SUBJECT")),
        };

        let defaults = DispatchSettings::default();
        let concurrency = match get("DISPATCH_CONCURRENCY") {
            Some(raw) => match raw.parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => return Err(ConfigError::Invalid { name: "DISPATCH_CONCURRENCY", value: raw }),
            },
            None => defaults.concurrency,
        };
        let send_timeout = match get("SEND_TIMEOUT_SECS") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => return Err(ConfigError::Invalid { name: "SEND_TIMEOUT_SECS", value: raw }),
            },
            None => defaults.send_timeout,
        };

        Ok(Self {
            database_url: require("DATABASE_URL")?,
            host: get("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port,
            cron_secret: get("CRON_SECRET"),
            reminder_cron,
            email: EmailConfig {
                api_url: get("EMAIL_API_URL").unwrap_or_else(|| DEFAULT_EMAIL_API_URL.to_string()),
                api_key: require("EMAIL_API_KEY")?,
                from: require("EMAIL_FROM")?,
                app_url: get("APP_URL").unwrap_or_else(|| "http://localhost:5173".to_string()),
            },
            vapid,
            dispatch: DispatchSettings {
                concurrency,
                send_timeout,
            },
        })
    }
}
