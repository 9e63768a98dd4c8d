use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A registered Web Push endpoint for a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct PushSubscription {
    pub id: Uuid,
    pub user_id: Uuid,
    pub endpoint: String,
    /// Client public key (P-256 ECDH, base64url).
    pub p256dh: String,
    /// Client auth secret (base64url).
    pub auth: String,
    pub created_at: DateTime<Utc>,
}

/// The delivery-relevant part of a subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushTarget {
    pub subscription_id: Uuid,
    pub endpoint: String,
    pub p256dh: String,
    pub auth: String,
}

impl From<PushSubscription> for PushTarget {
    fn from(sub: PushSubscription) -> Self {
        PushTarget {
            subscription_id: sub.id,
            endpoint: sub.endpoint,
            p256dh: sub.p256dh,
            auth: sub.auth,
        }
    }
}
