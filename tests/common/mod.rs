//! Shared fixtures for integration tests: an in-memory cache backend, an
//! in-memory user repository and a router wired without PostgreSQL or Redis.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::Utc;
use sea_orm::DatabaseConnection;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use backend_template::config::Config;
use backend_template::domain::{NewUser, Password, User, UserChanges};
use backend_template::errors::{AppError, AppResult};
use backend_template::infra::{Cache, CacheBackend, Database, UserQuery, UserRepository};
use backend_template::jobs::{JobDispatcher, MockJobDispatcher};
use backend_template::services::Services;
use backend_template::types::{SortField, SortOrder};
use backend_template::{create_router, AppState};

pub const TEST_SECRET: &str = "integration-test-secret-key-32-chars-min";

pub fn test_config() -> Arc<Config> {
    let config = Config::from_lookup(|key| match key {
        "SECRET_KEY" => Some(TEST_SECRET.to_string()),
        "PROJECT_NAME" => Some("Test Backend".to_string()),
        _ => None,
    })
    .expect("test config is valid");
    Arc::new(config)
}

pub fn sample_user(username: &str, email: &str, password: &str) -> User {
    let now = Utc::now();
    User {
        id: Uuid::new_v4(),
        username: username.to_string(),
        email: email.to_string(),
        password_hash: Password::new(password).expect("valid password").into_string(),
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

// =============================================================================
// In-memory cache backend
// =============================================================================

#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, String>>,
    down: AtomicBool,
}

impl MemoryCache {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make every call fail as if Redis were unreachable.
    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    pub fn keys(&self) -> Vec<String> {
        self.entries.lock().unwrap().keys().cloned().collect()
    }

    fn check(&self) -> AppResult<()> {
        if self.down.load(Ordering::SeqCst) {
            return Err(AppError::Cache("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl CacheBackend for MemoryCache {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        self.check()?;
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    async fn get_with_ttl(&self, key: &str) -> AppResult<Option<(String, Option<u64>)>> {
        self.check()?;
        Ok(self.entries.lock().unwrap().get(key).map(|v| (v.clone(), None)))
    }

    async fn set(&self, key: &str, value: String, _ttl: Option<u64>) -> AppResult<()> {
        self.check()?;
        self.entries.lock().unwrap().insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.check()?;
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }

    async fn clear_namespace(&self, namespace: &str) -> AppResult<u64> {
        self.check()?;
        let prefix = format!("{}:", namespace);
        let mut entries = self.entries.lock().unwrap();
        let before = entries.len();
        entries.retain(|k, _| !k.starts_with(&prefix));
        Ok((before - entries.len()) as u64)
    }

    async fn ping(&self) -> AppResult<()> {
        self.check()
    }
}

// =============================================================================
// In-memory user repository
// =============================================================================

#[derive(Default)]
pub struct MemoryUserRepository {
    users: Mutex<Vec<User>>,
}

impl MemoryUserRepository {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn insert(&self, user: User) {
        self.users.lock().unwrap().push(user);
    }

    pub fn all(&self) -> Vec<User> {
        self.users.lock().unwrap().clone()
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn create(&self, new_user: NewUser) -> AppResult<User> {
        let mut users = self.users.lock().unwrap();
        if users
            .iter()
            .any(|u| u.email == new_user.email || u.username == new_user.username)
        {
            return Err(AppError::conflict("User"));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: new_user.username,
            email: new_user.email,
            password_hash: new_user.password_hash,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn update(&self, id: Uuid, changes: UserChanges) -> AppResult<User> {
        let mut users = self.users.lock().unwrap();
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(AppError::NotFound)?;

        if let Some(username) = changes.username {
            user.username = username;
        }
        if let Some(email) = changes.email {
            user.email = email;
        }
        if let Some(hash) = changes.password_hash {
            user.password_hash = hash;
        }
        if let Some(is_active) = changes.is_active {
            user.is_active = is_active;
        }
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let mut users = self.users.lock().unwrap();
        let before = users.len();
        users.retain(|u| u.id != id);
        if users.len() == before {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    async fn list(&self, query: &UserQuery) -> AppResult<(Vec<User>, u64)> {
        let mut users: Vec<User> = self.users.lock().unwrap().clone();

        if let Some(term) = query.search.as_deref().map(|t| t.trim().to_lowercase()) {
            if !term.is_empty() {
                users.retain(|u| {
                    u.email.to_lowercase().contains(&term)
                        || u.username.to_lowercase().contains(&term)
                });
            }
        }

        users.sort_by(|a, b| {
            let ordering = match query.sort_by {
                SortField::CreatedAt => a.created_at.cmp(&b.created_at),
                SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
                SortField::Email => a.email.cmp(&b.email),
                SortField::Username => a.username.cmp(&b.username),
            };
            match query.sort_order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });

        let total = users.len() as u64;
        let page = users
            .into_iter()
            .skip(query.pagination.offset() as usize)
            .take(query.pagination.limit() as usize)
            .collect();

        Ok((page, total))
    }
}

// =============================================================================
// Router harness
// =============================================================================

pub struct TestApp {
    pub router: Router,
    pub repo: Arc<MemoryUserRepository>,
    pub cache: Arc<MemoryCache>,
    pub config: Arc<Config>,
}

pub fn accepting_dispatcher() -> MockJobDispatcher {
    let mut jobs = MockJobDispatcher::new();
    jobs.expect_dispatch_email().returning(|_| Ok(()));
    jobs.expect_dispatch_hello().returning(|_| Ok(()));
    jobs
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_dispatcher(accepting_dispatcher())
    }

    pub fn with_dispatcher(jobs: MockJobDispatcher) -> Self {
        let config = test_config();
        let repo = MemoryUserRepository::new();
        let cache_backend = MemoryCache::new();

        let cache = Arc::new(Cache::new(cache_backend.clone(), "test", config.cache_ttl));
        let jobs: Arc<dyn JobDispatcher> = Arc::new(jobs);
        let services = Services::from_repository(repo.clone(), cache.clone(), jobs, config.clone());

        // No live database in tests; the health check reports it as unhealthy
        let database = Arc::new(Database::from_connection(DatabaseConnection::Disconnected));
        let state = AppState::new(config.clone(), &services, cache, database);

        Self {
            router: create_router(state),
            repo,
            cache: cache_backend,
            config,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        (status, json)
    }

    /// Register through the API and return an access token for the new account.
    pub async fn signup_and_login(&self, username: &str, email: &str) -> String {
        let password = "SecurePass123!";
        let (status, _) = self
            .request(
                Method::POST,
                "/v1/auth/signup",
                None,
                Some(serde_json::json!({
                    "username": username,
                    "email": email,
                    "password": password,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = self
            .request(
                Method::POST,
                "/v1/auth/login",
                None,
                Some(serde_json::json!({ "email": email, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        body["access_token"].as_str().unwrap().to_string()
    }
}
