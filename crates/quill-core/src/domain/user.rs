use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User entity - an account that authors posts and comments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// The profile fields an account holder may change. Credentials are not
/// part of this set.
#[derive(Debug, Clone)]
pub struct ProfileUpdate {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl User {
    /// Create a new user with generated ID and creation timestamp.
    pub fn new(
        username: String,
        first_name: String,
        last_name: String,
        email: String,
        password_hash: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            username,
            first_name,
            last_name,
            email,
            password_hash,
            created_at: Utc::now(),
        }
    }

    /// Apply a profile update. Only username, first name, last name and
    /// email change; id, password hash and creation time are untouched.
    pub fn apply_profile(&mut self, update: ProfileUpdate) {
        self.username = update.username;
        self.first_name = update.first_name;
        self.last_name = update.last_name;
        self.email = update.email;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_update_leaves_credentials_alone() {
        let mut user = User::new(
            "ada".into(),
            "Ada".into(),
            "Lovelace".into(),
            "ada@example.com".into(),
            "hash".into(),
        );
        let id = user.id;
        let created_at = user.created_at;

        user.apply_profile(ProfileUpdate {
            username: "ada_l".into(),
            first_name: "Ada".into(),
            last_name: "King".into(),
            email: "ada@lovelace.dev".into(),
        });

        assert_eq!(user.username, "ada_l");
        assert_eq!(user.last_name, "King");
        assert_eq!(user.email, "ada@lovelace.dev");
        assert_eq!(user.id, id);
        assert_eq!(user.password_hash, "hash");
        assert_eq!(user.created_at, created_at);
    }
}
