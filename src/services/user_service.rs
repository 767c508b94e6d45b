//! User service: CRUD over the user repository with a read-through cache.
//!
//! Results are [`UserResponse`] projections, so password hashes never leave
//! the repository layer or reach the cache.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{
    normalize_email, CreateUser, NewUser, Password, UpdateUser, User, UserChanges, UserResponse,
    Username,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::{Cache, UserQuery, UserRepository};

#[async_trait]
pub trait UserService: Send + Sync {
    async fn create_user(&self, input: CreateUser) -> AppResult<UserResponse>;

    /// Served from cache when possible.
    async fn get_user(&self, id: Uuid) -> AppResult<UserResponse>;

    async fn list_users(&self, query: &UserQuery) -> AppResult<(Vec<UserResponse>, u64)>;

    async fn update_user(&self, id: Uuid, input: UpdateUser) -> AppResult<UserResponse>;

    async fn delete_user(&self, id: Uuid) -> AppResult<()>;
}

/// Validate, check uniqueness, hash and insert. Shared by signup and admin create.
pub(crate) async fn create_account(repo: &dyn UserRepository, input: CreateUser) -> AppResult<User> {
    let username = Username::parse(&input.username)?;
    let email = normalize_email(&input.email);

    if repo.find_by_email(&email).await?.is_some() {
        return Err(AppError::conflict("Email"));
    }
    if repo.find_by_username(username.as_str()).await?.is_some() {
        return Err(AppError::conflict("Username"));
    }

    let password_hash = Password::new(&input.password)?.into_string();

    let user = repo
        .create(NewUser {
            username: username.into_inner(),
            email,
            password_hash,
        })
        .await?;

    tracing::info!(user_id = %user.id, "User created");
    Ok(user)
}

pub struct UserManager {
    repo: Arc<dyn UserRepository>,
    cache: Arc<Cache>,
}

impl UserManager {
    pub fn new(repo: Arc<dyn UserRepository>, cache: Arc<Cache>) -> Self {
        Self { repo, cache }
    }

    async fn invalidate(&self, id: &Uuid) {
        if let Err(e) = self.cache.invalidate_user(id).await {
            tracing::warn!(user_id = %id, error = %e, "Failed to invalidate cached user");
        }
    }

    /// Turn an update payload into column changes, rejecting values owned by another user.
    async fn resolve_changes(&self, id: Uuid, input: UpdateUser) -> AppResult<UserChanges> {
        let mut changes = UserChanges {
            is_active: input.is_active,
            ..Default::default()
        };

        if let Some(raw) = input.username {
            let username = Username::parse(&raw)?;
            if let Some(existing) = self.repo.find_by_username(username.as_str()).await? {
                if existing.id != id {
                    return Err(AppError::conflict("Username"));
                }
            }
            changes.username = Some(username.into_inner());
        }

        if let Some(raw) = input.email {
            let email = normalize_email(&raw);
            if let Some(existing) = self.repo.find_by_email(&email).await? {
                if existing.id != id {
                    return Err(AppError::conflict("Email"));
                }
            }
            changes.email = Some(email);
        }

        if let Some(password) = input.password {
            changes.password_hash = Some(Password::new(&password)?.into_string());
        }

        Ok(changes)
    }
}

#[async_trait]
impl UserService for UserManager {
    async fn create_user(&self, input: CreateUser) -> AppResult<UserResponse> {
        let user = create_account(self.repo.as_ref(), input).await?;
        Ok(UserResponse::from(user))
    }

    async fn get_user(&self, id: Uuid) -> AppResult<UserResponse> {
        if let Some(user) = self.cache.get_user(&id).await {
            tracing::debug!(user_id = %id, "User cache hit");
            return Ok(user);
        }

        let user = UserResponse::from(self.repo.find_by_id(id).await?.ok_or_not_found()?);

        if let Err(e) = self.cache.set_user(&user).await {
            tracing::warn!(user_id = %id, error = %e, "Failed to cache user");
        }

        Ok(user)
    }

    async fn list_users(&self, query: &UserQuery) -> AppResult<(Vec<UserResponse>, u64)> {
        let (users, total) = self.repo.list(query).await?;
        Ok((users.into_iter().map(UserResponse::from).collect(), total))
    }

    async fn update_user(&self, id: Uuid, input: UpdateUser) -> AppResult<UserResponse> {
        let changes = self.resolve_changes(id, input).await?;

        if changes.is_empty() {
            return self.get_user(id).await;
        }

        let user = self.repo.update(id, changes).await?;
        self.invalidate(&id).await;

        tracing::info!(user_id = %id, "User updated");
        Ok(UserResponse::from(user))
    }

    async fn delete_user(&self, id: Uuid) -> AppResult<()> {
        self.repo.delete(id).await?;
        self.invalidate(&id).await;

        tracing::info!(user_id = %id, "User deleted");
        Ok(())
    }
}
