//! Application-wide constants
//!
//! Centralized location for magic values and environment defaults.

// =============================================================================
// API
// =============================================================================

/// Versioned API prefix
pub const API_V1_PREFIX: &str = "/v1";

/// Default project name shown in docs and the root endpoint
pub const DEFAULT_PROJECT_NAME: &str = "backend-template";

// =============================================================================
// Pagination
// =============================================================================

/// Default number of items per page
pub const DEFAULT_PAGE_SIZE: u64 = 20;

/// Maximum allowed items per page to prevent excessive queries
pub const MAX_PAGE_SIZE: u64 = 100;

/// Default starting page number (1-indexed)
pub const DEFAULT_PAGE_NUMBER: u64 = 1;

/// Highest page number accepted; keeps `page * MAX_PAGE_SIZE` within a
/// PostgreSQL `BIGINT` offset
pub const MAX_PAGE_NUMBER: u64 = i64::MAX as u64 / MAX_PAGE_SIZE;

// =============================================================================
// Authentication & Security
// =============================================================================

/// Default access token lifetime in minutes
pub const DEFAULT_ACCESS_TOKEN_EXPIRE_MINUTES: i64 = 30;

/// Default refresh token lifetime in days
pub const DEFAULT_REFRESH_TOKEN_EXPIRE_DAYS: i64 = 7;

/// Minimum secret key length
pub const MIN_SECRET_KEY_LENGTH: usize = 32;

/// Used only outside production when SECRET_KEY is unset
pub const DEV_SECRET_KEY: &str = "dev-secret-key-minimum-32-chars!!";

/// Seconds per minute (for token expiration calculation)
pub const SECONDS_PER_MINUTE: i64 = 60;

/// Authorization header prefix for Bearer tokens
pub const BEARER_TOKEN_PREFIX: &str = "Bearer ";

/// JWT token type identifier
pub const TOKEN_TYPE_BEARER: &str = "Bearer";

// =============================================================================
// Server Configuration
// =============================================================================

/// Default server host address
pub const DEFAULT_SERVER_HOST: &str = "0.0.0.0";

/// Default server port
pub const DEFAULT_SERVER_PORT: u16 = 8000;

// =============================================================================
// Database
// =============================================================================

pub const DEFAULT_POSTGRES_USER: &str = "postgres";
pub const DEFAULT_POSTGRES_PASSWORD: &str = "postgres";
pub const DEFAULT_POSTGRES_HOST: &str = "localhost";
pub const DEFAULT_POSTGRES_PORT: u16 = 5432;
pub const DEFAULT_POSTGRES_DB: &str = "app";

/// Default connection pool size
pub const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 10;

// =============================================================================
// Cache (Redis)
// =============================================================================

pub const DEFAULT_REDIS_HOST: &str = "localhost";
pub const DEFAULT_REDIS_PORT: u16 = 6379;
pub const DEFAULT_REDIS_DB: u8 = 0;

/// Default cache expiry in seconds
pub const DEFAULT_CACHE_TTL_SECONDS: u64 = 60;

/// Namespace prepended to every cache key
pub const DEFAULT_CACHE_PREFIX: &str = "backend-cache";

/// Cache namespace for user records
pub const CACHE_NAMESPACE_USER: &str = "user";

// =============================================================================
// Logging
// =============================================================================

pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Share of transactions sent to Sentry when `SENTRY_TRACES_SAMPLE_RATE` is unset
pub const DEFAULT_SENTRY_TRACES_SAMPLE_RATE: f32 = 1.0;

// =============================================================================
// Background Jobs
// =============================================================================

/// Worker name for email jobs
pub const WORKER_NAME_EMAIL: &str = "email-worker";

/// Worker name for the periodic hello job
pub const WORKER_NAME_HELLO: &str = "hello-worker";

/// Default beat interval for the hello job (every third minute)
pub const DEFAULT_HELLO_TASK_INTERVAL_SECONDS: u64 = 180;

/// Connections reserved for the job queue pool
pub const JOB_QUEUE_MAX_CONNECTIONS: u32 = 5;

// =============================================================================
// Validation
// =============================================================================

pub const MIN_PASSWORD_LENGTH: u64 = 8;
pub const MAX_PASSWORD_LENGTH: u64 = 128;
pub const MIN_USERNAME_LENGTH: usize = 3;
pub const MAX_USERNAME_LENGTH: usize = 30;
