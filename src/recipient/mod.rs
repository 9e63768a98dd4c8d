pub mod recipient_resolver;

pub use recipient_resolver::{DeliveryTarget, RecipientDirectory, RecipientResolver};
