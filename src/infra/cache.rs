//! Redis cache.
//!
//! [`CacheBackend`] is the raw string store; [`Cache`] adds key namespacing,
//! JSON encoding and the default expiry on top of it. Reads fail open: a
//! backend or decoding error is logged and reported as a miss.

use std::fmt::Display;
use std::sync::Arc;

use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands, Client};
use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

use crate::config::{Config, CACHE_NAMESPACE_USER};
use crate::domain::UserResponse;
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Keys fetched per SCAN round trip when clearing a namespace
const SCAN_BATCH_SIZE: usize = 500;

/// Raw key/value operations against the cache server.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait CacheBackend: Send + Sync {
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Value plus remaining lifetime in seconds (`None` when the key never expires).
    async fn get_with_ttl(&self, key: &str) -> AppResult<Option<(String, Option<u64>)>>;

    /// Store a value; `ttl` of `None` or zero stores without expiry.
    async fn set(&self, key: &str, value: String, ttl: Option<u64>) -> AppResult<()>;

    async fn delete(&self, key: &str) -> AppResult<()>;

    /// Delete every key under `namespace:`; returns how many were removed.
    async fn clear_namespace(&self, namespace: &str) -> AppResult<u64>;

    async fn ping(&self) -> AppResult<()>;
}

/// [`CacheBackend`] over a multiplexed Redis connection.
#[derive(Clone)]
pub struct RedisBackend {
    connection: ConnectionManager,
}

impl RedisBackend {
    pub async fn connect(url: &str) -> AppResult<Self> {
        let client = Client::open(url)?;
        let connection = ConnectionManager::new(client).await?;

        tracing::info!("Redis cache connected");
        Ok(Self { connection })
    }
}

#[async_trait]
impl CacheBackend for RedisBackend {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let mut conn = self.connection.clone();
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn get_with_ttl(&self, key: &str) -> AppResult<Option<(String, Option<u64>)>> {
        let mut conn = self.connection.clone();
        let (ttl, value): (i64, Option<String>) = redis::pipe()
            .atomic()
            .ttl(key)
            .get(key)
            .query_async(&mut conn)
            .await?;

        // TTL is -1 for keys without expiry and -2 for missing keys
        Ok(value.map(|v| (v, u64::try_from(ttl).ok())))
    }

    async fn set(&self, key: &str, value: String, ttl: Option<u64>) -> AppResult<()> {
        let mut conn = self.connection.clone();
        match ttl {
            Some(seconds) if seconds > 0 => conn.set_ex::<_, _, ()>(key, value, seconds).await?,
            _ => conn.set::<_, _, ()>(key, value).await?,
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let mut conn = self.connection.clone();
        let _: () = conn.del(key).await?;
        Ok(())
    }

    async fn clear_namespace(&self, namespace: &str) -> AppResult<u64> {
        let mut conn = self.connection.clone();
        let pattern = format!("{}:*", namespace);
        let mut cursor: u64 = 0;
        let mut removed: u64 = 0;

        loop {
            let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH_SIZE)
                .query_async(&mut conn)
                .await?;

            if !keys.is_empty() {
                let deleted: u64 = conn.del(&keys).await?;
                removed += deleted;
            }

            if next == 0 {
                break;
            }
            cursor = next;
        }

        Ok(removed)
    }

    async fn ping(&self) -> AppResult<()> {
        let mut conn = self.connection.clone();
        let reply: String = redis::cmd("PING").query_async(&mut conn).await?;
        if reply != "PONG" {
            return Err(AppError::Cache(format!("unexpected PING reply: {}", reply)));
        }
        Ok(())
    }
}

/// Namespaced JSON cache.
#[derive(Clone)]
pub struct Cache {
    backend: Arc<dyn CacheBackend>,
    prefix: String,
    default_ttl: u64,
}

impl Cache {
    pub fn new(backend: Arc<dyn CacheBackend>, prefix: impl Into<String>, default_ttl: u64) -> Self {
        Self {
            backend,
            prefix: prefix.into(),
            default_ttl,
        }
    }

    /// Connect to Redis using the configured URL, prefix and TTL.
    pub async fn connect(config: &Config) -> AppResult<Self> {
        let backend = RedisBackend::connect(&config.redis_url()).await?;
        Ok(Self::new(
            Arc::new(backend),
            config.cache_prefix.clone(),
            config.cache_ttl,
        ))
    }

    /// `prefix:namespace:id`
    pub fn key(&self, namespace: &str, id: impl Display) -> String {
        format!("{}:{}:{}", self.prefix, namespace, id)
    }

    pub fn default_ttl(&self) -> u64 {
        self.default_ttl
    }

    // =========================================================================
    // Generic Cache Operations
    // =========================================================================

    pub async fn get<T: DeserializeOwned>(&self, namespace: &str, id: impl Display) -> Option<T> {
        let key = self.key(namespace, id);
        match self.backend.get(&key).await {
            Ok(Some(json)) => decode(&key, &json),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Cache read failed, treating as miss");
                None
            }
        }
    }

    /// Cached value with its remaining lifetime in seconds.
    pub async fn get_with_ttl<T: DeserializeOwned>(
        &self,
        namespace: &str,
        id: impl Display,
    ) -> Option<(T, Option<u64>)> {
        let key = self.key(namespace, id);
        match self.backend.get_with_ttl(&key).await {
            Ok(Some((json, ttl))) => decode(&key, &json).map(|value| (value, ttl)),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Cache read failed, treating as miss");
                None
            }
        }
    }

    /// Store a value with the default TTL.
    pub async fn set<T: Serialize>(
        &self,
        namespace: &str,
        id: impl Display,
        value: &T,
    ) -> AppResult<()> {
        self.set_with_ttl(namespace, id, value, self.default_ttl).await
    }

    pub async fn set_with_ttl<T: Serialize>(
        &self,
        namespace: &str,
        id: impl Display,
        value: &T,
        ttl_seconds: u64,
    ) -> AppResult<()> {
        let json = serde_json::to_string(value)
            .map_err(|e| AppError::internal(format!("Cache serialization error: {}", e)))?;

        self.backend
            .set(&self.key(namespace, id), json, Some(ttl_seconds))
            .await
    }

    pub async fn delete(&self, namespace: &str, id: impl Display) -> AppResult<()> {
        self.backend.delete(&self.key(namespace, id)).await
    }

    /// Remove every entry in `namespace`.
    pub async fn clear_namespace(&self, namespace: &str) -> AppResult<u64> {
        let removed = self
            .backend
            .clear_namespace(&format!("{}:{}", self.prefix, namespace))
            .await?;
        tracing::debug!(namespace, removed, "Cache namespace cleared");
        Ok(removed)
    }

    pub async fn ping(&self) -> AppResult<()> {
        self.backend.ping().await
    }

    // =========================================================================
    // User Cache Operations
    // =========================================================================

    pub async fn get_user(&self, user_id: &Uuid) -> Option<UserResponse> {
        self.get(CACHE_NAMESPACE_USER, user_id).await
    }

    /// Only the public projection is cached; password hashes stay in PostgreSQL.
    pub async fn set_user(&self, user: &UserResponse) -> AppResult<()> {
        self.set(CACHE_NAMESPACE_USER, user.id, user).await
    }

    pub async fn invalidate_user(&self, user_id: &Uuid) -> AppResult<()> {
        self.delete(CACHE_NAMESPACE_USER, user_id).await
    }
}

fn decode<T: DeserializeOwned>(key: &str, json: &str) -> Option<T> {
    match serde_json::from_str(json) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(key = %key, error = %e, "Cached value could not be decoded");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::*;

    fn cache_with(backend: MockCacheBackend) -> Cache {
        Cache::new(Arc::new(backend), "test-cache", 60)
    }

    #[test]
    fn test_key_format() {
        let cache = cache_with(MockCacheBackend::new());
        assert_eq!(cache.key("user", 42), "test-cache:user:42");
    }

    #[tokio::test]
    async fn test_get_decodes_json() {
        let mut backend = MockCacheBackend::new();
        backend
            .expect_get()
            .with(eq("test-cache:ping:latest"))
            .returning(|_| Ok(Some(r#"{"ping":"pong!"}"#.to_string())));

        let value: Option<serde_json::Value> = cache_with(backend).get("ping", "latest").await;
        assert_eq!(value.unwrap()["ping"], "pong!");
    }

    #[tokio::test]
    async fn test_backend_error_is_a_miss() {
        let mut backend = MockCacheBackend::new();
        backend
            .expect_get()
            .returning(|_| Err(AppError::Cache("connection refused".into())));

        let value: Option<String> = cache_with(backend).get("user", 1).await;
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn test_corrupt_entry_is_a_miss() {
        let mut backend = MockCacheBackend::new();
        backend
            .expect_get()
            .returning(|_| Ok(Some("{not json".to_string())));

        let value: Option<UserResponse> = cache_with(backend).get_user(&Uuid::new_v4()).await;
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn test_set_uses_default_ttl() {
        let mut backend = MockCacheBackend::new();
        backend
            .expect_set()
            .withf(|key, value, ttl| key == "test-cache:n:1" && value == "[1,2]" && *ttl == Some(60))
            .times(1)
            .returning(|_, _, _| Ok(()));

        cache_with(backend).set("n", 1, &vec![1, 2]).await.unwrap();
    }

    #[tokio::test]
    async fn test_get_with_ttl_passes_remaining_lifetime() {
        let mut backend = MockCacheBackend::new();
        backend
            .expect_get_with_ttl()
            .returning(|_| Ok(Some(("7".to_string(), Some(12)))));

        let value: Option<(u32, Option<u64>)> = cache_with(backend).get_with_ttl("n", 1).await;
        assert_eq!(value, Some((7, Some(12))));
    }

    #[tokio::test]
    async fn test_clear_namespace_prefixes_namespace() {
        let mut backend = MockCacheBackend::new();
        backend
            .expect_clear_namespace()
            .with(eq("test-cache:user"))
            .times(1)
            .returning(|_| Ok(3));

        assert_eq!(cache_with(backend).clear_namespace("user").await.unwrap(), 3);
    }
}
