use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

use crate::{error::SendError, reminder::Reminder, state::EmailConfig};

/// One transactional email, as accepted by the provider API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[async_trait]
pub trait EmailTransport: Send + Sync {
    async fn send(&self, email: &OutboundEmail) -> Result<(), SendError>;
}

/// Resend-compatible HTTP email API.
#[derive(Clone)]
pub struct HttpEmailTransport {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    timeout: Duration,
}

impl HttpEmailTransport {
    pub fn new(config: &EmailConfig, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            timeout,
        }
    }
}

#[async_trait]
impl EmailTransport for HttpEmailTransport {
    async fn send(&self, email: &OutboundEmail) -> Result<(), SendError> {
        let resp = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(email)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }

        let body = resp.text().await.unwrap_or_default();
        if status.is_client_error() {
            Err(SendError::Rejected(format!("email API {}: {}", status, body)))
        } else {
            Err(SendError::Unavailable(format!("email API {}: {}", status, body)))
        }
    }
}

/// Renders reminder emails and hands them to the transport.
#[derive(Clone)]
pub struct EmailSender {
    transport: std::sync::Arc<dyn EmailTransport>,
    from: String,
    app_url: String,
}

impl EmailSender {
    pub fn new(
        transport: std::sync::Arc<dyn EmailTransport>,
        from: impl Into<String>,
        app_url: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            from: from.into(),
            app_url: app_url.into(),
        }
    }

    pub fn compose(
        &self,
        to: &str,
        display_name: Option<&str>,
        reminder: &Reminder,
    ) -> OutboundEmail {
        let entity = escape_html(&reminder.entity);
        let greeting = match display_name {
            Some(name) if !name.trim().is_empty() => format!("Hi {},", escape_html(name.trim())),
            _ => "Hi,".to_string(),
        };
        let link = format!("{}{}", self.app_url.trim_end_matches('/'), reminder_route(reminder));

        OutboundEmail {
            from: self.from.clone(),
            to: to.to_string(),
            subject: format!("Reminder: time for your {}", reminder.entity),
            html: format!(
                "<p>{}</p>\
                 <p>This is your reminder to check in on your {}.</p>\
                 <p><a href=\"{}\">Open your {}</a></p>",
                greeting, entity, link, entity
            ),
        }
    }

    pub async fn send(
        &self,
        to: &str,
        display_name: Option<&str>,
        reminder: &Reminder,
    ) -> Result<(), SendError> {
        let email = self.compose(to, display_name, reminder);
        self.transport.send(&email).await
    }
}

/// Client-side route for a reminder, shared by email links and push data.
pub fn reminder_route(reminder: &Reminder) -> String {
    let entity: String = reminder
        .entity
        .trim()
        .to_ascii_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    format!("/{}s?reminder={}", entity, reminder.id)
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
