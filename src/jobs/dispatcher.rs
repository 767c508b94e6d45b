//! Enqueueing jobs from the API side.

use apalis::prelude::Storage;
use apalis_sql::postgres::PostgresStorage;
use apalis_sql::sqlx::postgres::{PgPool, PgPoolOptions};
use async_trait::async_trait;

use super::{EmailJob, HelloWorldJob};
use crate::config::{Config, JOB_QUEUE_MAX_CONNECTIONS};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Pushes jobs onto the queue for the worker process.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait JobDispatcher: Send + Sync {
    async fn dispatch_email(&self, job: EmailJob) -> AppResult<()>;

    async fn dispatch_hello(&self, job: HelloWorldJob) -> AppResult<()>;
}

/// apalis-sql PostgreSQL queue, one storage per job type.
#[derive(Clone)]
pub struct PostgresJobQueue {
    email: PostgresStorage<EmailJob>,
    hello: PostgresStorage<HelloWorldJob>,
}

impl PostgresJobQueue {
    /// Open a small dedicated pool and create the apalis tables if missing.
    pub async fn connect(config: &Config) -> AppResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(JOB_QUEUE_MAX_CONNECTIONS)
            .connect(&config.database_url())
            .await
            .map_err(|e| AppError::Queue(format!("Failed to connect job queue: {}", e)))?;

        PostgresStorage::setup(&pool)
            .await
            .map_err(|e| AppError::Queue(format!("Failed to setup job storage: {}", e)))?;

        Ok(Self::from_pool(pool))
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self {
            email: PostgresStorage::new(pool.clone()),
            hello: PostgresStorage::new(pool),
        }
    }

    pub fn email_storage(&self) -> PostgresStorage<EmailJob> {
        self.email.clone()
    }

    pub fn hello_storage(&self) -> PostgresStorage<HelloWorldJob> {
        self.hello.clone()
    }
}

#[async_trait]
impl JobDispatcher for PostgresJobQueue {
    async fn dispatch_email(&self, job: EmailJob) -> AppResult<()> {
        let mut storage = self.email.clone();
        storage
            .push(job)
            .await
            .map_err(|e| AppError::Queue(format!("Failed to enqueue email job: {}", e)))?;

        tracing::debug!("Email job enqueued");
        Ok(())
    }

    async fn dispatch_hello(&self, job: HelloWorldJob) -> AppResult<()> {
        let mut storage = self.hello.clone();
        storage
            .push(job)
            .await
            .map_err(|e| AppError::Queue(format!("Failed to enqueue hello job: {}", e)))?;

        tracing::debug!("Hello job enqueued");
        Ok(())
    }
}
