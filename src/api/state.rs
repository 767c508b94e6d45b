//! Shared handler state.

use std::sync::Arc;

use crate::config::Config;
use crate::infra::{Cache, Database};
use crate::services::{AuthService, ServiceContainer, UserService};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub auth_service: Arc<dyn AuthService>,
    pub user_service: Arc<dyn UserService>,
    /// Used directly by the health check
    pub cache: Arc<Cache>,
    /// Used directly by the health check
    pub database: Arc<Database>,
}

impl AppState {
    pub fn new(
        config: Arc<Config>,
        services: &dyn ServiceContainer,
        cache: Arc<Cache>,
        database: Arc<Database>,
    ) -> Self {
        Self {
            config,
            auth_service: services.auth(),
            user_service: services.users(),
            cache,
            database,
        }
    }
}
