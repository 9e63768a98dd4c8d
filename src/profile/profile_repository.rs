use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::{Mutex, PoisonError};
use uuid::Uuid;

use super::profile_models::Profile;
use crate::error::StoreError;

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get_profiles(&self, user_ids: &[Uuid]) -> Result<Vec<Profile>, StoreError>;
}

#[derive(Clone)]
pub struct ProfileRepository {
    pool: PgPool,
}

impl ProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileStore for ProfileRepository {
    async fn get_profiles(&self, user_ids: &[Uuid]) -> Result<Vec<Profile>, StoreError> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }

        let profiles = sqlx::query_as::<_, Profile>(
            "SELECT user_id, email, display_name FROM profiles WHERE user_id = ANY($1)",
        )
        .bind(user_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(profiles)
    }
}

#[derive(Default)]
pub struct InMemoryProfileRepository {
    profiles: Mutex<Vec<Profile>>,
}

impl InMemoryProfileRepository {
    pub fn new(profiles: Vec<Profile>) -> Self {
        Self {
            profiles: Mutex::new(profiles),
        }
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileRepository {
    async fn get_profiles(&self, user_ids: &[Uuid]) -> Result<Vec<Profile>, StoreError> {
        let profiles = self.profiles.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(profiles
            .iter()
            .filter(|p| user_ids.contains(&p.user_id))
            .cloned()
            .collect())
    }
}
