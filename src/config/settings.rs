//! Application settings loaded from environment variables.

use std::env;
use std::str::FromStr;

use sentry::types::Dsn;
use serde::{Deserialize, Serialize};

use super::constants::*;
use crate::errors::{AppError, AppResult};

/// Deployment environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Staging,
    Production,
}

impl FromStr for Environment {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" | "local" => Ok(Environment::Development),
            "staging" => Ok(Environment::Staging),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(AppError::Config(format!("unknown ENVIRONMENT '{}'", other))),
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Staging => write!(f, "staging"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// PostgreSQL connection parameters
#[derive(Clone)]
pub struct DatabaseSettings {
    pub user: String,
    password: String,
    pub host: String,
    pub port: u16,
    pub name: String,
    pub max_connections: u32,
    url_override: Option<String>,
}

impl DatabaseSettings {
    /// Connection URL; `DATABASE_URL` wins over the individual parts.
    pub fn url(&self) -> String {
        match &self.url_override {
            Some(url) => url.clone(),
            None => format!(
                "postgres://{}:{}@{}:{}/{}",
                self.user, self.password, self.host, self.port, self.name
            ),
        }
    }
}

/// Redis connection parameters
#[derive(Clone)]
pub struct RedisSettings {
    pub host: String,
    pub port: u16,
    pub db: u8,
    url_override: Option<String>,
}

impl RedisSettings {
    /// Connection URL; `REDIS_URL` wins over the individual parts.
    pub fn url(&self) -> String {
        match &self.url_override {
            Some(url) => url.clone(),
            None => format!("redis://{}:{}/{}", self.host, self.port, self.db),
        }
    }
}

/// Application configuration
#[derive(Clone)]
pub struct Config {
    pub project_name: String,
    pub environment: Environment,
    pub debug: bool,
    secret_key: String,
    pub access_token_expire_minutes: i64,
    pub refresh_token_expire_days: i64,
    pub database: DatabaseSettings,
    pub redis: RedisSettings,
    pub log_level: String,
    pub cache_ttl: u64,
    pub cache_prefix: String,
    pub server_host: String,
    pub server_port: u16,
    pub hello_task_interval_seconds: u64,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("project_name", &self.project_name)
            .field("environment", &self.environment)
            .field("debug", &self.debug)
            .field("secret_key", &"[REDACTED]")
            .field("access_token_expire_minutes", &self.access_token_expire_minutes)
            .field("refresh_token_expire_days", &self.refresh_token_expire_days)
            .field("database_url", &"[REDACTED]")
            .field("redis_url", &"[REDACTED]")
            .field("log_level", &self.log_level)
            .field("cache_ttl", &self.cache_ttl)
            .field("cache_prefix", &self.cache_prefix)
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .finish()
    }
}

impl Config {
    /// Load configuration from the process environment (and `.env` if present).
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// # Errors
    /// Fails when a value cannot be parsed, or when `SECRET_KEY` is missing in
    /// production or shorter than the minimum length.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match lookup("ENVIRONMENT") {
            Some(raw) => raw.parse()?,
            None => Environment::Development,
        };

        let secret_key = match lookup("SECRET_KEY") {
            Some(key) => key,
            None if environment == Environment::Production => {
                return Err(AppError::Config(
                    "SECRET_KEY must be set in production".to_string(),
                ));
            }
            None => {
                tracing::warn!("SECRET_KEY not set, using insecure default for development");
                DEV_SECRET_KEY.to_string()
            }
        };

        if secret_key.len() < MIN_SECRET_KEY_LENGTH {
            return Err(AppError::Config(format!(
                "SECRET_KEY must be at least {} characters long",
                MIN_SECRET_KEY_LENGTH
            )));
        }

        let database = DatabaseSettings {
            user: string_or(&lookup, "POSTGRES_USER", DEFAULT_POSTGRES_USER),
            password: string_or(&lookup, "POSTGRES_PASSWORD", DEFAULT_POSTGRES_PASSWORD),
            host: string_or(&lookup, "POSTGRES_HOST", DEFAULT_POSTGRES_HOST),
            port: parse_or(&lookup, "POSTGRES_PORT", DEFAULT_POSTGRES_PORT)?,
            name: string_or(&lookup, "POSTGRES_DB", DEFAULT_POSTGRES_DB),
            max_connections: parse_or(
                &lookup,
                "DATABASE_MAX_CONNECTIONS",
                DEFAULT_DATABASE_MAX_CONNECTIONS,
            )?,
            url_override: lookup("DATABASE_URL"),
        };

        let redis = RedisSettings {
            host: string_or(&lookup, "REDIS_HOST", DEFAULT_REDIS_HOST),
            port: parse_or(&lookup, "REDIS_PORT", DEFAULT_REDIS_PORT)?,
            db: parse_or(&lookup, "REDIS_DB", DEFAULT_REDIS_DB)?,
            url_override: lookup("REDIS_URL"),
        };

        Ok(Self {
            project_name: string_or(&lookup, "PROJECT_NAME", DEFAULT_PROJECT_NAME),
            environment,
            debug: parse_bool(&lookup, "DEBUG")?,
            secret_key,
            access_token_expire_minutes: parse_or(
                &lookup,
                "ACCESS_TOKEN_EXPIRE_MINUTES",
                DEFAULT_ACCESS_TOKEN_EXPIRE_MINUTES,
            )?,
            refresh_token_expire_days: parse_or(
                &lookup,
                "JWT_REFRESH_TOKEN_EXPIRE_DAYS",
                DEFAULT_REFRESH_TOKEN_EXPIRE_DAYS,
            )?,
            database,
            redis,
            log_level: string_or(&lookup, "LOG_LEVEL", DEFAULT_LOG_LEVEL),
            cache_ttl: parse_or(&lookup, "CACHE_TTL", DEFAULT_CACHE_TTL_SECONDS)?,
            cache_prefix: string_or(&lookup, "CACHE_PREFIX", DEFAULT_CACHE_PREFIX),
            server_host: string_or(&lookup, "SERVER_HOST", DEFAULT_SERVER_HOST),
            server_port: parse_or(&lookup, "SERVER_PORT", DEFAULT_SERVER_PORT)?,
            hello_task_interval_seconds: parse_or(
                &lookup,
                "HELLO_TASK_INTERVAL_SECONDS",
                DEFAULT_HELLO_TASK_INTERVAL_SECONDS,
            )?,
        })
    }

    /// Get secret key bytes for token signing/verification.
    pub fn secret_key_bytes(&self) -> &[u8] {
        self.secret_key.as_bytes()
    }

    /// Full PostgreSQL connection URL.
    pub fn database_url(&self) -> String {
        self.database.url()
    }

    /// Full Redis connection URL.
    pub fn redis_url(&self) -> String {
        self.redis.url()
    }

    /// Get the full server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

/// Sentry error reporting; disabled while `SENTRY_DSN` is empty.
///
/// Loaded apart from [`Config`] so reporting is up before anything else can fail.
#[derive(Debug, Clone)]
pub struct SentrySettings {
    pub dsn: Option<Dsn>,
    pub environment: Environment,
    pub traces_sample_rate: f32,
}

impl SentrySettings {
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let dsn = match lookup("SENTRY_DSN").filter(|v| !v.trim().is_empty()) {
            Some(raw) => Some(
                raw.trim()
                    .parse::<Dsn>()
                    .map_err(|e| AppError::Config(format!("SENTRY_DSN is invalid: {}", e)))?,
            ),
            None => None,
        };

        let environment = parse_or(&lookup, "ENVIRONMENT", Environment::Development)?;

        let traces_sample_rate = parse_or(
            &lookup,
            "SENTRY_TRACES_SAMPLE_RATE",
            DEFAULT_SENTRY_TRACES_SAMPLE_RATE,
        )?;
        if !(0.0..=1.0).contains(&traces_sample_rate) {
            return Err(AppError::Config(format!(
                "SENTRY_TRACES_SAMPLE_RATE must be between 0 and 1, got {}",
                traces_sample_rate
            )));
        }

        Ok(Self {
            dsn,
            environment,
            traces_sample_rate,
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.dsn.is_some()
    }
}

fn string_or<F>(lookup: &F, key: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> AppResult<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key).filter(|v| !v.trim().is_empty()) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Config(format!("{} has an invalid value '{}'", key, raw))),
        None => Ok(default),
    }
}

fn parse_bool<F>(lookup: &F, key: &str) -> AppResult<bool>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(false),
        Some(v) if v.is_empty() => Ok(false),
        Some(v) => match v.as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(AppError::Config(format!("{} must be a boolean, got '{}'", key, v))),
        },
    }
}
