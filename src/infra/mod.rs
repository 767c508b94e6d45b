//! Infrastructure layer: PostgreSQL through SeaORM and the Redis cache.

pub mod cache;
pub mod db;
pub mod repositories;

pub use cache::{Cache, CacheBackend, RedisBackend};
pub use db::{Database, MigrationStatus, Migrator};
pub use repositories::{UserQuery, UserRepository, UserStore};

#[cfg(any(test, feature = "test-utils"))]
pub use cache::MockCacheBackend;
#[cfg(any(test, feature = "test-utils"))]
pub use repositories::MockUserRepository;
