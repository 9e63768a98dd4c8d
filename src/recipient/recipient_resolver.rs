use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    error::StoreError,
    profile::ProfileStore,
    push_subscription::{PushTarget, SubscriptionStore},
};

/// A concrete destination for one delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryTarget {
    Email {
        address: String,
        display_name: Option<String>,
    },
    Push(PushTarget),
}

/// Result of a batch resolution, looked up per user.
#[derive(Debug, Default)]
pub struct RecipientDirectory {
    targets: HashMap<Uuid, Vec<DeliveryTarget>>,
    failed: HashSet<Uuid>,
}

impl RecipientDirectory {
    /// Targets for `user_id`. An empty slice is a normal "nothing to
    /// deliver"; an error means that user's lookup failed.
    pub fn targets_for(&self, user_id: Uuid) -> Result<&[DeliveryTarget], StoreError> {
        if self.failed.contains(&user_id) {
            return Err(StoreError::Unavailable(format!(
                "recipient lookup failed for user {}",
                user_id
            )));
        }
        Ok(self.targets.get(&user_id).map(Vec::as_slice).unwrap_or(&[]))
    }

    #[cfg(test)]
    fn resolve_email(&self, user_id: Uuid) -> Result<Option<&str>, StoreError> {
        Ok(self.targets_for(user_id)?.iter().find_map(|t| match t {
            DeliveryTarget::Email { address, .. } => Some(address.as_str()),
            DeliveryTarget::Push(_) => None,
        }))
    }

    #[cfg(test)]
    fn resolve_push_targets(&self, user_id: Uuid) -> Result<Vec<&PushTarget>, StoreError> {
        Ok(self
            .targets_for(user_id)?
            .iter()
            .filter_map(|t| match t {
                DeliveryTarget::Push(target) => Some(target),
                DeliveryTarget::Email { .. } => None,
            })
            .collect())
    }

    fn push(&mut self, user_id: Uuid, target: DeliveryTarget) {
        self.targets.entry(user_id).or_default().push(target);
    }
}

/// Maps owning users to channel targets with one store call per batch.
///
/// If the batch call fails, each user is retried on its own so one bad
/// lookup only affects that user's reminders.
#[derive(Clone)]
pub struct RecipientResolver {
    profiles: Arc<dyn ProfileStore>,
    subscriptions: Arc<dyn SubscriptionStore>,
}

impl RecipientResolver {
    pub fn new(profiles: Arc<dyn ProfileStore>, subscriptions: Arc<dyn SubscriptionStore>) -> Self {
        Self {
            profiles,
            subscriptions,
        }
    }

    pub async fn resolve_emails(&self, user_ids: &[Uuid]) -> RecipientDirectory {
        let mut directory = RecipientDirectory::default();

        match self.profiles.get_profiles(user_ids).await {
            Ok(profiles) => {
                for profile in profiles {
                    add_profile(&mut directory, profile);
                }
            }
            Err(e) => {
                tracing::warn!("Batch profile lookup failed, resolving per user: {}", e);
                for user_id in user_ids {
                    match self.profiles.get_profiles(std::slice::from_ref(user_id)).await {
                        Ok(profiles) => {
                            for profile in profiles {
                                add_profile(&mut directory, profile);
                            }
                        }
                        Err(e) => {
                            tracing::warn!("Profile lookup failed for user {}: {}", user_id, e);
                            directory.failed.insert(*user_id);
                        }
                    }
                }
            }
        }

        directory
    }

    pub async fn resolve_push_targets(&self, user_ids: &[Uuid]) -> RecipientDirectory {
        let mut directory = RecipientDirectory::default();

        match self.subscriptions.get_push_subscriptions(user_ids).await {
            Ok(subscriptions) => {
                for sub in subscriptions {
                    directory.push(sub.user_id, DeliveryTarget::Push(sub.into()));
                }
            }
            Err(e) => {
                tracing::warn!("Batch subscription lookup failed, resolving per user: {}", e);
                for user_id in user_ids {
                    match self
                        .subscriptions
                        .get_push_subscriptions(std::slice::from_ref(user_id))
                        .await
                    {
                        Ok(subscriptions) => {
                            for sub in subscriptions {
                                directory.push(sub.user_id, DeliveryTarget::Push(sub.into()));
                            }
                        }
                        Err(e) => {
                            tracing::warn!(
                                "Subscription lookup failed for user {}: {}",
                                user_id,
                                e
                            );
                            directory.failed.insert(*user_id);
                        }
                    }
                }
            }
        }

        directory
    }
}

fn add_profile(directory: &mut RecipientDirectory, profile: crate::profile::Profile) {
    let Some(address) = profile.email_address().map(str::to_string) else {
        return;
    };
    directory.push(
        profile.user_id,
        DeliveryTarget::Email {
            address,
            display_name: profile.display_name,
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        profile::{InMemoryProfileRepository, Profile},
        push_subscription::{InMemorySubscriptionRepository, PushSubscription},
    };
    use async_trait::async_trait;
    use chrono::Utc;

    fn profile(user_id: Uuid, email: Option<&str>) -> Profile {
        Profile {
            user_id,
            email: email.map(str::to_string),
            display_name: None,
        }
    }

    fn subscription(user_id: Uuid, endpoint: &str) -> PushSubscription {
        PushSubscription {
            id: Uuid::new_v4(),
            user_id,
            endpoint: endpoint.to_string(),
            p256dh: "p256dh".to_string(),
            auth: "auth".to_string(),
            created_at: Utc::now(),
        }
    }

    /// Fails any batch containing the poisoned user.
    struct FlakyProfiles {
        inner: InMemoryProfileRepository,
        poisoned: Uuid,
    }

    #[async_trait]
    impl ProfileStore for FlakyProfiles {
        async fn get_profiles(&self, user_ids: &[Uuid]) -> Result<Vec<Profile>, StoreError> {
            if user_ids.contains(&self.poisoned) {
                return Err(StoreError::Unavailable("boom".into()));
            }
            self.inner.get_profiles(user_ids).await
        }
    }

    #[tokio::test]
    async fn test_resolves_emails_and_missing_profiles() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let resolver = RecipientResolver::new(
            Arc::new(InMemoryProfileRepository::new(vec![
                profile(a, Some("a@x.com")),
                profile(b, None),
            ])),
            Arc::new(InMemorySubscriptionRepository::default()),
        );

        let directory = resolver.resolve_emails(&[a, b, c]).await;
        assert_eq!(directory.resolve_email(a).unwrap(), Some("a@x.com"));
        assert_eq!(directory.resolve_email(b).unwrap(), None);
        assert_eq!(directory.resolve_email(c).unwrap(), None);
    }

    #[tokio::test]
    async fn test_resolves_all_push_targets_per_user() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let resolver = RecipientResolver::new(
            Arc::new(InMemoryProfileRepository::default()),
            Arc::new(InMemorySubscriptionRepository::new(vec![
                subscription(a, "https://push.example/1"),
                subscription(a, "https://push.example/2"),
            ])),
        );

        let directory = resolver.resolve_push_targets(&[a, b]).await;
        let targets = directory.resolve_push_targets(a).unwrap();
        assert_eq!(targets.len(), 2);
        assert_eq!(targets[0].endpoint, "https://push.example/1");
        assert!(directory.resolve_push_targets(b).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_lookup_failure_is_isolated_to_one_user() {
        let (good, bad) = (Uuid::new_v4(), Uuid::new_v4());
        let resolver = RecipientResolver::new(
            Arc::new(FlakyProfiles {
                inner: InMemoryProfileRepository::new(vec![profile(good, Some("g@x.com"))]),
                poisoned: bad,
            }),
            Arc::new(InMemorySubscriptionRepository::default()),
        );

        let directory = resolver.resolve_emails(&[good, bad]).await;
        assert_eq!(directory.resolve_email(good).unwrap(), Some("g@x.com"));
        assert!(directory.resolve_email(bad).is_err());
    }
}
