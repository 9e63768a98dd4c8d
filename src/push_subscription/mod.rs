pub mod push_subscription_models;
pub mod push_subscription_repository;

pub use push_subscription_models::{PushSubscription, PushTarget};
pub use push_subscription_repository::{
    InMemorySubscriptionRepository, SubscriptionRepository, SubscriptionStore,
};
