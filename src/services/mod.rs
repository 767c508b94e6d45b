//! Application services: the use cases behind the HTTP handlers.
//!
//! Services depend on repository and infrastructure traits so tests can
//! swap in mocks.

mod auth_service;
pub mod container;
mod user_service;

pub use container::{ServiceContainer, Services};

pub use auth_service::{AuthService, Authenticator, Claims, TokenKind, TokenResponse};
pub use user_service::{UserManager, UserService};

pub(crate) use user_service::create_account;
