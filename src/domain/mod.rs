//! Domain layer: the user model and its value objects.
//!
//! Nothing here touches the database, Redis or HTTP.

pub mod password;
pub mod user;

pub use password::Password;
pub use user::{
    normalize_email, CreateUser, NewUser, UpdateUser, User, UserChanges, UserResponse, Username,
};
