//! Periodic example job; the worker's beat loop enqueues one every few minutes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelloWorldJob {
    pub scheduled_at: DateTime<Utc>,
}

impl HelloWorldJob {
    pub fn now() -> Self {
        Self {
            scheduled_at: Utc::now(),
        }
    }
}

pub async fn hello_world_job_handler(job: HelloWorldJob) -> Result<(), AppError> {
    tracing::info!(scheduled_at = %job.scheduled_at, "Hello World");
    Ok(())
}
