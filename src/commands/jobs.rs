//! Jobs command: run the worker, or inspect and prune the queue.
//!
//! ```bash
//! backend-template jobs work    # email + hello workers and the periodic scheduler
//! backend-template jobs list    # counts by job type and status
//! backend-template jobs clear   # drop failed and killed jobs
//! ```

use std::sync::Arc;
use std::time::Duration;

use apalis::prelude::*;
use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection, Statement};

use crate::cli::args::{JobsAction, JobsArgs};
use crate::config::{Config, WORKER_NAME_EMAIL, WORKER_NAME_HELLO};
use crate::errors::{AppError, AppResult};
use crate::infra::Database;
use crate::jobs::{
    email_job_handler, hello_world_job_handler, HelloWorldJob, JobDispatcher, PostgresJobQueue,
};

pub async fn execute(args: JobsArgs, config: Config) -> AppResult<()> {
    match args.action {
        JobsAction::Work => run_worker(&config).await,
        JobsAction::List => list_jobs(&config).await,
        JobsAction::Clear => clear_failed_jobs(&config).await,
    }
}

/// Run both workers until Ctrl+C, enqueueing a `HelloWorldJob` on every beat.
async fn run_worker(config: &Config) -> AppResult<()> {
    tracing::info!("Connecting job queue...");
    let queue = PostgresJobQueue::connect(config).await?;

    let email_worker = WorkerBuilder::new(WORKER_NAME_EMAIL)
        .backend(queue.email_storage())
        .build_fn(email_job_handler);
    let hello_worker = WorkerBuilder::new(WORKER_NAME_HELLO)
        .backend(queue.hello_storage())
        .build_fn(hello_world_job_handler);

    let monitor = Monitor::new().register(email_worker).register(hello_worker);

    let beat = tokio::spawn(run_beat(
        Arc::new(queue),
        Duration::from_secs(config.hello_task_interval_seconds.max(1)),
    ));

    tracing::info!("Job worker started. Press Ctrl+C to stop.");

    let outcome = tokio::select! {
        result = monitor.run() => {
            result.map_err(|e| AppError::Queue(format!("Worker failed: {}", e)))
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received shutdown signal, stopping worker...");
            Ok(())
        }
    };

    beat.abort();
    tracing::info!("Job worker stopped.");
    outcome
}

/// Periodic scheduler; the first job is enqueued one full period after startup.
async fn run_beat(dispatcher: Arc<dyn JobDispatcher>, period: Duration) {
    let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);

    loop {
        ticker.tick().await;
        match dispatcher.dispatch_hello(HelloWorldJob::now()).await {
            Ok(()) => tracing::debug!("Scheduled hello job"),
            Err(e) => tracing::error!("Failed to schedule hello job: {}", e),
        }
    }
}

/// Counts per job type and status
#[derive(Debug, Clone, PartialEq, Eq)]
struct JobCount {
    job_type: String,
    status: String,
    count: i64,
}

async fn list_jobs(config: &Config) -> AppResult<()> {
    let db = Database::connect(config).await?;

    if !queue_initialized(db.connection()).await? {
        println!("Job queue not initialized. Run 'jobs work' or 'serve' once to create it.");
        return Ok(());
    }

    let rows = db
        .connection()
        .query_all(Statement::from_string(
            DatabaseBackend::Postgres,
            "SELECT job_type, status::text AS status, COUNT(*)::bigint AS count \
             FROM apalis.jobs GROUP BY job_type, status ORDER BY job_type, status",
        ))
        .await?;

    let counts: Vec<JobCount> = rows
        .into_iter()
        .filter_map(|row| {
            Some(JobCount {
                job_type: row.try_get("", "job_type").ok()?,
                status: row.try_get("", "status").ok()?,
                count: row.try_get("", "count").ok()?,
            })
        })
        .collect();

    print!("{}", render_counts(&counts));
    Ok(())
}

fn render_counts(counts: &[JobCount]) -> String {
    let mut out = String::from("\n=== Job Queue Status ===\n");
    if counts.is_empty() {
        out.push_str("Queue is empty.\n");
    }
    for c in counts {
        out.push_str(&format!("{:<40} {:<10} {}\n", c.job_type, c.status, c.count));
    }
    out.push_str("========================\n");
    out
}

async fn clear_failed_jobs(config: &Config) -> AppResult<()> {
    let db = Database::connect(config).await?;

    if !queue_initialized(db.connection()).await? {
        println!("Job queue not initialized. Nothing to clear.");
        return Ok(());
    }

    let result = db
        .connection()
        .execute(Statement::from_string(
            DatabaseBackend::Postgres,
            "DELETE FROM apalis.jobs WHERE status IN ('Failed', 'Killed')",
        ))
        .await?;

    println!("Cleared {} failed job(s) from the queue.", result.rows_affected());
    Ok(())
}

async fn queue_initialized(db: &DatabaseConnection) -> AppResult<bool> {
    let row = db
        .query_one(Statement::from_string(
            DatabaseBackend::Postgres,
            "SELECT EXISTS(SELECT 1 FROM information_schema.tables \
             WHERE table_schema = 'apalis' AND table_name = 'jobs') AS exists",
        ))
        .await?;

    Ok(row
        .and_then(|r| r.try_get::<bool>("", "exists").ok())
        .unwrap_or(false))
}
