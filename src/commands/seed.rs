//! Seed command: create the initial user when `SEED_USER_*` variables are set.
//!
//! Running it twice is harmless; an existing user is left untouched.

use std::env;

use crate::config::Config;
use crate::domain::CreateUser;
use crate::errors::{AppError, AppResult};
use crate::infra::{Database, UserRepository, UserStore};
use crate::services::create_account;

const DEFAULT_SEED_USERNAME: &str = "admin";

/// Initial account read from the environment
#[derive(Clone, PartialEq, Eq)]
pub struct SeedUser {
    pub email: String,
    pub username: String,
    password: String,
}

impl std::fmt::Debug for SeedUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeedUser")
            .field("email", &self.email)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl SeedUser {
    /// `None` unless both `SEED_USER_EMAIL` and `SEED_USER_PASSWORD` are set.
    pub fn from_lookup<F>(lookup: F) -> Option<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Some(Self {
            email: non_empty("SEED_USER_EMAIL")?,
            password: non_empty("SEED_USER_PASSWORD")?,
            username: non_empty("SEED_USER_USERNAME")
                .unwrap_or_else(|| DEFAULT_SEED_USERNAME.to_string()),
        })
    }

    fn into_create(self) -> CreateUser {
        CreateUser {
            username: self.username,
            email: self.email,
            password: self.password,
        }
    }
}

pub async fn execute(config: Config) -> AppResult<()> {
    let Some(seed) = SeedUser::from_lookup(|key| env::var(key).ok()) else {
        tracing::info!("SEED_USER_EMAIL / SEED_USER_PASSWORD not set, nothing to seed");
        return Ok(());
    };

    let db = Database::connect(&config).await?;
    let repo = UserStore::new(db.connection().clone());

    seed_user(&repo, seed).await
}

async fn seed_user(repo: &dyn UserRepository, seed: SeedUser) -> AppResult<()> {
    let email = seed.email.clone();

    match create_account(repo, seed.into_create()).await {
        Ok(user) => {
            tracing::info!(user_id = %user.id, email = %user.email, "Seed user created");
            Ok(())
        }
        Err(AppError::Conflict(_)) => {
            tracing::info!(email = %email, "Seed user already exists, skipping");
            Ok(())
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::User;
    use crate::infra::MockUserRepository;
    use chrono::Utc;
    use uuid::Uuid;

    fn seed() -> SeedUser {
        SeedUser::from_lookup(|key| match key {
            "SEED_USER_EMAIL" => Some("Admin@Example.com".into()),
            "SEED_USER_PASSWORD" => Some("ChangeMe123!".into()),
            _ => None,
        })
        .unwrap()
    }

    #[test]
    fn test_seed_requires_email_and_password() {
        assert!(SeedUser::from_lookup(|_| None).is_none());
        assert!(SeedUser::from_lookup(|key| (key == "SEED_USER_EMAIL")
            .then(|| "a@example.com".to_string()))
        .is_none());
    }

    #[test]
    fn test_seed_defaults_username_and_hides_password() {
        let seed = seed();
        assert_eq!(seed.username, "admin");
        assert!(!format!("{:?}", seed).contains("ChangeMe123!"));
    }

    #[tokio::test]
    async fn test_existing_user_is_skipped() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email().returning(|email| {
            let now = Utc::now();
            Ok(Some(User {
                id: Uuid::new_v4(),
                username: "admin".into(),
                email: email.to_string(),
                password_hash: String::new(),
                is_active: true,
                created_at: now,
                updated_at: now,
            }))
        });
        repo.expect_create().never();

        assert!(seed_user(&repo, seed()).await.is_ok());
    }

    #[tokio::test]
    async fn test_new_user_is_created_with_normalized_email() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email().returning(|_| Ok(None));
        repo.expect_find_by_username().returning(|_| Ok(None));
        repo.expect_create()
            .withf(|new_user| new_user.email == "admin@example.com" && new_user.username == "admin")
            .times(1)
            .returning(|new_user| {
                let now = Utc::now();
                Ok(User {
                    id: Uuid::new_v4(),
                    username: new_user.username,
                    email: new_user.email,
                    password_hash: new_user.password_hash,
                    is_active: true,
                    created_at: now,
                    updated_at: now,
                })
            });

        assert!(seed_user(&repo, seed()).await.is_ok());
    }
}
