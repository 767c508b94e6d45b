//! Backend template
//!
//! A starting point for HTTP backends: axum for the API, SeaORM and
//! sea-orm-migration for PostgreSQL, Redis for caching and apalis for
//! background jobs. The user model, health checks and example jobs are
//! meant to be replaced.
//!
//! # Layers
//!
//! - **api**: routes, handlers, extractors and middleware
//! - **services**: use cases behind the handlers
//! - **domain**: the user model and password hashing
//! - **infra**: database, migrations, repositories and cache
//! - **jobs**: background job payloads, handlers and dispatch
//! - **cli** / **commands**: the `backend-template` binary
//! - **telemetry**: log subscriber and optional Sentry reporting
//!
//! # CLI Usage
//!
//! ```bash
//! backend-template migrate up
//! backend-template serve --port 8000
//! backend-template jobs work
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod jobs;
pub mod services;
pub mod telemetry;
pub mod types;
pub mod utils;

pub use api::{create_router, AppState};
pub use config::Config;
pub use domain::{Password, User};
pub use errors::{AppError, AppResult};
pub use infra::{Cache, Database};
