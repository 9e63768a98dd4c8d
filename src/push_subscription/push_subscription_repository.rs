use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::{Mutex, PoisonError};
use uuid::Uuid;

use super::push_subscription_models::PushSubscription;
use crate::error::StoreError;

#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    async fn get_push_subscriptions(
        &self,
        user_ids: &[Uuid],
    ) -> Result<Vec<PushSubscription>, StoreError>;
}

#[derive(Clone)]
pub struct SubscriptionRepository {
    pool: PgPool,
}

impl SubscriptionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubscriptionStore for SubscriptionRepository {
    async fn get_push_subscriptions(
        &self,
        user_ids: &[Uuid],
    ) -> Result<Vec<PushSubscription>, StoreError> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }

        let subscriptions = sqlx::query_as::<_, PushSubscription>(
            "SELECT id, user_id, endpoint, p256dh, auth, created_at
             FROM push_subscriptions
             WHERE user_id = ANY($1)
             ORDER BY created_at",
        )
        .bind(user_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(subscriptions)
    }
}

#[derive(Default)]
pub struct InMemorySubscriptionRepository {
    subscriptions: Mutex<Vec<PushSubscription>>,
}

impl InMemorySubscriptionRepository {
    pub fn new(subscriptions: Vec<PushSubscription>) -> Self {
        Self {
            subscriptions: Mutex::new(subscriptions),
        }
    }
}

#[async_trait]
impl SubscriptionStore for InMemorySubscriptionRepository {
    async fn get_push_subscriptions(
        &self,
        user_ids: &[Uuid],
    ) -> Result<Vec<PushSubscription>, StoreError> {
        let subscriptions = self
            .subscriptions
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Ok(subscriptions
            .iter()
            .filter(|s| user_ids.contains(&s.user_id))
            .cloned()
            .collect())
    }
}
