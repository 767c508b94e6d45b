//! Serve command: wire the infrastructure and run the HTTP server.

use std::sync::Arc;

use crate::api::{create_router, AppState};
use crate::cli::args::ServeArgs;
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::infra::{Cache, Database};
use crate::jobs::{JobDispatcher, PostgresJobQueue};
use crate::services::Services;

pub async fn execute(args: ServeArgs, mut config: Config) -> AppResult<()> {
    tracing::info!(environment = %config.environment, "Starting server...");

    // Command-line flags win over SERVER_HOST / SERVER_PORT
    if let Some(host) = args.host {
        config.server_host = host;
    }
    if let Some(port) = args.port {
        config.server_port = port;
    }
    let config = Arc::new(config);

    let database = Arc::new(Database::connect(&config).await?);
    if args.migrate {
        tracing::info!("Applying pending migrations...");
        database.run_migrations().await?;
    }

    let cache = Arc::new(Cache::connect(&config).await?);
    let jobs: Arc<dyn JobDispatcher> = Arc::new(PostgresJobQueue::connect(&config).await?);

    let services = Services::from_connection(
        database.connection().clone(),
        cache.clone(),
        jobs,
        config.clone(),
    );
    let app = create_router(AppState::new(config.clone(), &services, cache, database));

    let addr = config.server_addr();

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind to {}: {}", addr, e)))?;

    tracing::info!("Server running on http://{}", addr);
    tracing::info!("API docs at http://{}/docs", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Received shutdown signal, draining connections...");
}
