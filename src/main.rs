//! `backend-template` binary: parses the CLI and dispatches to a command.

use std::process::ExitCode;

use clap::Parser;

use backend_template::{
    cli::{Cli, Commands},
    commands,
    config::{Config, SentrySettings},
    telemetry,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Load .env first so LOG_LEVEL and SENTRY_DSN are visible to the subscriber
    dotenvy::dotenv().ok();

    let sentry = match SentrySettings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };
    // Dropped on return, flushing pending Sentry events
    let _sentry = telemetry::init_sentry(&sentry);
    telemetry::init_tracing(cli.verbose, sentry.is_enabled());
    if sentry.is_enabled() {
        tracing::info!(environment = %sentry.environment, "Sentry error reporting enabled");
    }

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };
    tracing::debug!(?config, "Configuration loaded");

    let result = match cli.command {
        Commands::Serve(args) => commands::serve::execute(args, config).await,
        Commands::Migrate(args) => commands::migrate::execute(args, config).await,
        Commands::Jobs(args) => commands::jobs::execute(args, config).await,
        Commands::Seed => commands::seed::execute(config).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Command failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
