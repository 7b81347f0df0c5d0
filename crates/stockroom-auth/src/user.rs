//! User types.

use crate::error::{AuthError, Result};
use crate::password::PasswordHasher;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use stockroom_commerce::ids::UserId;

/// User role for authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Shopper with a cart.
    #[default]
    Customer,
    /// Store staff with read access to stock figures.
    Staff,
    /// Store administrator.
    Admin,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Staff, Role::Customer];

    /// Get role as string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Staff => "staff",
            Role::Admin => "admin",
        }
    }

    /// Capitalized label for pages.
    pub fn label(&self) -> &'static str {
        match self {
            Role::Customer => "Customer",
            Role::Staff => "Staff",
            Role::Admin => "Admin",
        }
    }

    /// Check if this role has at least the given permission level.
    pub fn has_permission(&self, required: Role) -> bool {
        self.level() >= required.level()
    }

    /// Get permission level (higher = more permissions).
    pub fn level(&self) -> u8 {
        match self {
            Role::Customer => 0,
            Role::Staff => 1,
            Role::Admin => 2,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AuthError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "customer" => Ok(Role::Customer),
            "staff" => Ok(Role::Staff),
            "admin" => Ok(Role::Admin),
            other => Err(AuthError::Validation(format!("Unknown role: {}", other))),
        }
    }
}

/// A stored user row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserAccount {
    pub id: UserId,
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl UserAccount {
    /// Create an account around an already hashed password.
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>, role: Role) -> Self {
        Self {
            id: UserId::generate(),
            username: username.into(),
            password_hash: password_hash.into(),
            role,
            created_at: Utc::now(),
        }
    }

    /// The account without its password hash.
    pub fn public(&self) -> PublicUser {
        PublicUser {
            id: self.id.clone(),
            username: self.username.clone(),
            role: self.role,
            created_at: self.created_at,
        }
    }
}

/// User data safe to show on pages.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PublicUser {
    pub id: UserId,
    pub username: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Admin form for creating or editing a user.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserInput {
    pub username: String,
    /// Required on create; empty keeps the current password on update.
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub role: Role,
}

impl UserInput {
    pub fn new(username: impl Into<String>, password: impl Into<String>, role: Role) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            role,
        }
    }

    /// The new password, if one was given.
    pub fn new_password(&self) -> Option<&str> {
        Some(self.password.as_str()).filter(|p| !p.is_empty())
    }

    pub fn validate(&self, creating: bool) -> Result<()> {
        if self.username.trim().is_empty() {
            return Err(AuthError::Validation("Username is required".to_string()));
        }
        if creating && self.password.is_empty() {
            return Err(AuthError::Validation("Password is required".to_string()));
        }
        Ok(())
    }
}

/// Self-service sign-up form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Registration {
    pub username: String,
    pub password: String,
    #[serde(rename = "confirmPassword", alias = "confirm_password")]
    pub confirm_password: String,
}

/// Shortest accepted username.
pub const MIN_USERNAME_LEN: usize = 3;

impl Registration {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        confirm_password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            confirm_password: confirm_password.into(),
        }
    }

    /// Field rules, checked in the order the form shows them.
    pub fn validate(&self) -> Result<()> {
        let username = self.username.trim();
        if username.is_empty() || self.password.is_empty() || self.confirm_password.is_empty() {
            return Err(AuthError::Validation("All fields are required".to_string()));
        }
        if username.chars().count() < MIN_USERNAME_LEN {
            return Err(AuthError::Validation(format!(
                "Username must be at least {} characters",
                MIN_USERNAME_LEN
            )));
        }
        if !username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(AuthError::Validation(
                "Username may only contain letters, numbers and underscores".to_string(),
            ));
        }
        PasswordHasher::validate_password(&self.password)?;
        if self.password != self.confirm_password {
            return Err(AuthError::Validation("Passwords do not match".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_permissions() {
        assert!(Role::Admin.has_permission(Role::Customer));
        assert!(Role::Admin.has_permission(Role::Staff));
        assert!(Role::Admin.has_permission(Role::Admin));
        assert!(Role::Staff.has_permission(Role::Staff));
        assert!(!Role::Staff.has_permission(Role::Admin));
        assert!(!Role::Customer.has_permission(Role::Staff));
    }

    #[test]
    fn test_role_parse_and_serde() {
        assert_eq!("Admin".parse::<Role>().unwrap(), Role::Admin);
        assert!("owner".parse::<Role>().is_err());
        assert_eq!(serde_json::to_string(&Role::Staff).unwrap(), r#""staff""#);
    }

    #[test]
    fn test_public_user_hides_hash() {
        let account = UserAccount::new("ada", "$argon2id$secret", Role::Customer);
        let json = serde_json::to_value(account.public()).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["role"], "customer");
    }

    #[test]
    fn test_registration_rules() {
        assert!(Registration::new("ada_99", "secret", "secret").validate().is_ok());

        let cases = [
            Registration::new("", "secret", "secret"),
            Registration::new("ab", "secret", "secret"),
            Registration::new("ada lovelace", "secret", "secret"),
            Registration::new("ada", "short", "short"),
            Registration::new("ada", "secret", "secret2"),
        ];
        for case in cases {
            assert!(case.validate().is_err(), "{:?} should be rejected", case);
        }
    }

    #[test]
    fn test_user_input_password_optional_on_update() {
        let input = UserInput::new("ada", "", Role::Staff);
        assert!(input.validate(false).is_ok());
        assert!(input.validate(true).is_err());
        assert_eq!(input.new_password(), None);
    }
}
