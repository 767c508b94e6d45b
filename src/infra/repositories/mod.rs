//! Repository layer: data access behind mockable traits.

pub(crate) mod entities;
mod user_repository;

pub use user_repository::{UserQuery, UserRepository, UserStore};

#[cfg(any(test, feature = "test-utils"))]
pub use user_repository::MockUserRepository;
