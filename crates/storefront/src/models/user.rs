//! User domain types.

use chrono::{DateTime, Utc};

use mercato_core::UserId;

/// A storefront account (domain type).
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Login name.
    pub username: String,
    /// First name, may be empty.
    pub first_name: String,
    /// Last name, may be empty.
    pub last_name: String,
    /// Contact email, may be empty.
    pub email: String,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Display name used when drafting an order: "first last" when either
    /// name part is set, otherwise the username.
    #[must_use]
    pub fn full_name(&self) -> String {
        if self.first_name.is_empty() && self.last_name.is_empty() {
            self.username.clone()
        } else {
            format!("{} {}", self.first_name, self.last_name)
                .trim()
                .to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(first: &str, last: &str) -> User {
        User {
            id: UserId::new(1),
            username: "jdoe".to_string(),
            first_name: first.to_string(),
            last_name: last.to_string(),
            email: String::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_full_name_from_name_parts() {
        assert_eq!(user("Jane", "Doe").full_name(), "Jane Doe");
        assert_eq!(user("Jane", "").full_name(), "Jane");
        assert_eq!(user("", "Doe").full_name(), "Doe");
    }

    #[test]
    fn test_full_name_falls_back_to_username() {
        assert_eq!(user("", "").full_name(), "jdoe");
    }
}
