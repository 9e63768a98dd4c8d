use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Per-user contact data used by the email channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub user_id: Uuid,
    pub email: Option<String>,
    pub display_name: Option<String>,
}

impl Profile {
    /// The trimmed email address, if one is set.
    pub fn email_address(&self) -> Option<&str> {
        self.email
            .as_deref()
            .map(str::trim)
            .filter(|email| !email.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_email_is_absent() {
        let mut profile = Profile {
            user_id: Uuid::new_v4(),
            email: Some("  ".to_string()),
            display_name: None,
        };
        assert_eq!(profile.email_address(), None);

        profile.email = Some(" a@x.com ".to_string());
        assert_eq!(profile.email_address(), Some("a@x.com"));
    }
}
