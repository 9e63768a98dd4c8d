use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD as BASE64_URL, Engine as _};
use serde::Serialize;
use std::{sync::Arc, time::Duration};
use web_push::{
    ContentEncoding, SubscriptionInfo, VapidSignatureBuilder, WebPushError, WebPushMessageBuilder,
};

use super::email_sender::reminder_route;
use crate::{
    error::{ConfigError, SendError},
    push_subscription::PushTarget,
    reminder::Reminder,
    state::VapidConfig,
};

/// Push services may drop undelivered reminders after an hour.
const PUSH_TTL_SECS: u32 = 60 * 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PushPayload {
    pub title: String,
    pub body: String,
    pub data: PushData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PushData {
    pub url: String,
    pub reminder_id: String,
}

#[async_trait]
pub trait PushTransport: Send + Sync {
    async fn send(&self, target: &PushTarget, payload: &[u8]) -> Result<(), SendError>;
}

/// Web Push delivery: `web-push` encrypts and signs, `reqwest` posts.
#[derive(Clone)]
pub struct WebPushTransport {
    client: reqwest::Client,
    vapid: VapidConfig,
    timeout: Duration,
}

impl WebPushTransport {
    /// Fails when the private key does not parse or does not derive the
    /// configured public key, which browsers subscribed with.
    pub fn new(vapid: VapidConfig, timeout: Duration) -> Result<Self, ConfigError> {
        let signer =
            VapidSignatureBuilder::from_base64_no_sub(&vapid.private_key, web_push::URL_SAFE_NO_PAD)
                .map_err(|_| ConfigError::Invalid {
                    name: "VAPID_PRIVATE_KEY",
                    value: "<unparseable key>".to_string(),
                })?;

        let invalid_public = || ConfigError::Invalid {
            name: "VAPID_PUBLIC_KEY",
            value: vapid.public_key.clone(),
        };
        let public_key = BASE64_URL
            .decode(vapid.public_key.trim().trim_end_matches('='))
            .map_err(|_| invalid_public())?;
        if signer.get_public_key() != public_key {
            return Err(invalid_public());
        }

        Ok(Self {
            client: reqwest::Client::new(),
            vapid,
            timeout,
        })
    }
}

fn rejected(err: WebPushError) -> SendError {
    SendError::Rejected(err.to_string())
}

#[async_trait]
impl PushTransport for WebPushTransport {
    async fn send(&self, target: &PushTarget, payload: &[u8]) -> Result<(), SendError> {
        // Only the built message may live across the await.
        let message = {
            let subscription = SubscriptionInfo::new(
                target.endpoint.clone(),
                target.p256dh.clone(),
                target.auth.clone(),
            );

            let mut signature = VapidSignatureBuilder::from_base64(
                &self.vapid.private_key,
                web_push::URL_SAFE_NO_PAD,
                &subscription,
            )
            .map_err(rejected)?;
            signature.add_claim("sub", self.vapid.subject.as_str());
            let signature = signature.build().map_err(rejected)?;

            let mut builder = WebPushMessageBuilder::new(&subscription);
            builder.set_ttl(PUSH_TTL_SECS);
            builder.set_payload(ContentEncoding::Aes128Gcm, payload);
            builder.set_vapid_signature(signature);
            builder.build().map_err(rejected)?
        };

        let mut request = self
            .client
            .post(&target.endpoint)
            .header("TTL", message.ttl.to_string())
            .timeout(self.timeout);
        if let Some(encrypted) = message.payload {
            request = request
                .header("Content-Encoding", "aes128gcm")
                .header("Content-Type", "application/octet-stream");
            for (name, value) in encrypted.crypto_headers {
                request = request.header(name, value);
            }
            request = request.body(encrypted.content);
        }

        let resp = request.send().await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }

        let body = resp.text().await.unwrap_or_default();
        match status.as_u16() {
            404 | 410 => Err(SendError::Gone(format!("push service {}", status))),
            400..=499 => Err(SendError::Rejected(format!("push service {}: {}", status, body))),
            _ => Err(SendError::Unavailable(format!("push service {}: {}", status, body))),
        }
    }
}

/// Builds reminder payloads and hands them to the transport, one
/// subscription per call.
#[derive(Clone)]
pub struct PushSender {
    transport: Arc<dyn PushTransport>,
}

impl PushSender {
    pub fn new(transport: Arc<dyn PushTransport>) -> Self {
        Self { transport }
    }

    pub fn payload(reminder: &Reminder) -> PushPayload {
        PushPayload {
            title: format!("Time for your {}", reminder.entity),
            body: format!("Don't forget to check in on your {} today.", reminder.entity),
            data: PushData {
                url: reminder_route(reminder),
                reminder_id: reminder.id.to_string(),
            },
        }
    }

    pub async fn send(&self, target: &PushTarget, reminder: &Reminder) -> Result<(), SendError> {
        let payload = serde_json::to_vec(&Self::payload(reminder))
            .map_err(|e| SendError::Rejected(format!("unserializable payload: {}", e)))?;
        self.transport.send(target, &payload).await
    }
}
