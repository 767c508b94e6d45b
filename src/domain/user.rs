//! User domain entity and related types.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::config::{MAX_USERNAME_LENGTH, MIN_USERNAME_LENGTH};
use crate::errors::{AppError, AppResult};

static USERNAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("username pattern is valid"));

/// User domain entity.
///
/// Not serializable; responses and cache entries use [`UserResponse`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated username: 3 to 30 characters of letters, digits and underscores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Username(String);

impl Username {
    pub fn parse(raw: &str) -> AppResult<Self> {
        let trimmed = raw.trim();
        let len = trimmed.chars().count();

        if !(MIN_USERNAME_LENGTH..=MAX_USERNAME_LENGTH).contains(&len) {
            return Err(AppError::validation(format!(
                "Username must be between {} and {} characters",
                MIN_USERNAME_LENGTH, MAX_USERNAME_LENGTH
            )));
        }
        if !USERNAME_PATTERN.is_match(trimmed) {
            return Err(AppError::validation(
                "Username may only contain letters, numbers and underscores",
            ));
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Emails are compared case-insensitively, so they are stored lowercased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Fields needed to insert a user row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// Partial update applied by the repository; `None` leaves a column untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub is_active: Option<bool>,
}

impl UserChanges {
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.email.is_none()
            && self.password_hash.is_none()
            && self.is_active.is_none()
    }
}

/// User creation payload (signup and admin create)
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateUser {
    /// Letters, digits and underscores
    #[validate(length(min = 3, max = 30, message = "Username must be between 3 and 30 characters"))]
    #[schema(example = "jane_doe", min_length = 3, max_length = 30)]
    pub username: String,
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "jane@example.com")]
    pub email: String,
    #[validate(length(min = 8, max = 128, message = "Password must be between 8 and 128 characters"))]
    #[schema(example = "SecurePass123!", min_length = 8, max_length = 128)]
    pub password: String,
}

/// Partial user update
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateUser {
    #[validate(length(min = 3, max = 30, message = "Username must be between 3 and 30 characters"))]
    #[schema(example = "jane_doe")]
    pub username: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "jane@example.com")]
    pub email: Option<String>,
    #[validate(length(min = 8, max = 128, message = "Password must be between 8 and 128 characters"))]
    pub password: Option<String>,
    pub is_active: Option<bool>,
}

/// User response (safe to return to client)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,
    #[schema(example = "jane_doe")]
    pub username: String,
    #[schema(example = "jane@example.com")]
    pub email: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            is_active: user.is_active,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_accepts_valid() {
        let name = Username::parse("  jane_doe_42 ").unwrap();
        assert_eq!(name.as_str(), "jane_doe_42");
    }

    #[test]
    fn test_username_rejects_bad_characters() {
        assert!(Username::parse("jane-doe").is_err());
        assert!(Username::parse("jane doe").is_err());
        assert!(Username::parse("jané").is_err());
    }

    #[test]
    fn test_username_length_bounds() {
        assert!(Username::parse("ab").is_err());
        assert!(Username::parse("abc").is_ok());
        assert!(Username::parse(&"a".repeat(30)).is_ok());
        assert!(Username::parse(&"a".repeat(31)).is_err());
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email(" Jane@Example.COM "), "jane@example.com");
    }

    #[test]
    fn test_response_omits_hash() {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: "jane".into(),
            email: "jane@example.com".into(),
            password_hash: "$argon2id$secret".into(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_string(&UserResponse::from(user)).unwrap();
        assert!(!json.contains("argon2"));
        assert!(json.contains("\"username\":\"jane\""));
    }

    #[test]
    fn test_create_user_validation() {
        let bad = CreateUser {
            username: "jane".into(),
            email: "not-an-email".into(),
            password: "short".into(),
        };
        let errors = bad.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
        assert!(errors.field_errors().contains_key("password"));
    }

    #[test]
    fn test_user_changes_empty() {
        assert!(UserChanges::default().is_empty());
        let changes = UserChanges {
            is_active: Some(false),
            ..Default::default()
        };
        assert!(!changes.is_empty());
    }
}
