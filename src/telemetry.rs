//! Log subscriber and Sentry error reporting.

use sentry::{ClientInitGuard, ClientOptions};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{SentrySettings, DEFAULT_LOG_LEVEL};

/// Start the Sentry client. Keep the guard alive until exit so queued events flush.
pub fn init_sentry(settings: &SentrySettings) -> Option<ClientInitGuard> {
    client_options(settings).map(sentry::init)
}

fn client_options(settings: &SentrySettings) -> Option<ClientOptions> {
    let dsn = settings.dsn.clone()?;

    Some(ClientOptions {
        dsn: Some(dsn),
        release: sentry::release_name!(),
        environment: Some(settings.environment.to_string().into()),
        send_default_pii: true,
        traces_sample_rate: settings.traces_sample_rate,
        ..Default::default()
    })
}

/// `--verbose` forces debug; otherwise `RUST_LOG`, then `LOG_LEVEL`.
///
/// With Sentry enabled, error events are reported and lower levels become breadcrumbs.
pub fn init_tracing(verbose: bool, sentry_enabled: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            let level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string());
            EnvFilter::new(level)
        })
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_enabled.then(sentry_tracing::layer))
        .with(filter)
        .init();
}
