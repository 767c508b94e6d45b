//! Service container: builds the concrete services once and hands out trait objects.

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use super::{AuthService, Authenticator, UserManager, UserService};
use crate::config::Config;
use crate::infra::{Cache, UserRepository, UserStore};
use crate::jobs::JobDispatcher;

pub trait ServiceContainer: Send + Sync {
    fn auth(&self) -> Arc<dyn AuthService>;

    fn users(&self) -> Arc<dyn UserService>;
}

pub struct Services {
    auth_service: Arc<dyn AuthService>,
    user_service: Arc<dyn UserService>,
}

impl Services {
    pub fn new(auth_service: Arc<dyn AuthService>, user_service: Arc<dyn UserService>) -> Self {
        Self {
            auth_service,
            user_service,
        }
    }

    /// Wire services around one shared repository.
    pub fn from_repository(
        repo: Arc<dyn UserRepository>,
        cache: Arc<Cache>,
        jobs: Arc<dyn JobDispatcher>,
        config: Arc<Config>,
    ) -> Self {
        let auth_service = Arc::new(Authenticator::new(repo.clone(), jobs, config));
        let user_service = Arc::new(UserManager::new(repo, cache));

        Self::new(auth_service, user_service)
    }

    /// Wire services over a live database connection.
    pub fn from_connection(
        db: DatabaseConnection,
        cache: Arc<Cache>,
        jobs: Arc<dyn JobDispatcher>,
        config: Arc<Config>,
    ) -> Self {
        Self::from_repository(Arc::new(UserStore::new(db)), cache, jobs, config)
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth_service.clone()
    }

    fn users(&self) -> Arc<dyn UserService> {
        self.user_service.clone()
    }
}
