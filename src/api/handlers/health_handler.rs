//! Liveness and readiness endpoints.

use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::api::AppState;

/// Liveness probe payload
#[derive(Debug, Serialize, ToSchema)]
pub struct PingResponse {
    #[schema(example = "pong!")]
    pub ping: String,
}

/// Readiness report
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// `healthy` or `degraded`
    #[schema(example = "healthy")]
    pub status: String,
    pub services: ServiceHealth,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ServiceHealth {
    pub database: ServiceStatus,
    pub redis: ServiceStatus,
}

/// Per-dependency state. Failure details go to the log, never the body.
#[derive(Debug, Serialize, ToSchema)]
pub struct ServiceStatus {
    #[schema(example = "healthy")]
    pub status: String,
}

impl ServiceStatus {
    const HEALTHY: &'static str = "healthy";
    const UNHEALTHY: &'static str = "unhealthy";

    fn from_result<E: std::fmt::Display>(service: &str, result: Result<(), E>) -> Self {
        let status = match result {
            Ok(()) => Self::HEALTHY,
            Err(e) => {
                tracing::warn!(service, error = %e, "Health check failed");
                Self::UNHEALTHY
            }
        };
        Self {
            status: status.to_string(),
        }
    }

    fn is_healthy(&self) -> bool {
        self.status == Self::HEALTHY
    }
}

pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/ping", get(ping))
        .route("/health", get(health))
}

/// Liveness check
#[utoipa::path(
    get,
    path = "/v1/ping",
    tag = "Health",
    responses((status = 200, description = "Service is up", body = PingResponse))
)]
pub async fn ping() -> Json<PingResponse> {
    Json(PingResponse {
        ping: "pong!".to_string(),
    })
}

/// Readiness check against PostgreSQL and Redis
#[utoipa::path(
    get,
    path = "/v1/health",
    tag = "Health",
    responses(
        (status = 200, description = "All dependencies reachable", body = HealthResponse),
        (status = 503, description = "At least one dependency unreachable", body = HealthResponse)
    )
)]
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let (db, redis) = tokio::join!(state.database.ping(), state.cache.ping());

    let database = ServiceStatus::from_result("database", db);
    let redis = ServiceStatus::from_result("redis", redis);
    let all_healthy = database.is_healthy() && redis.is_healthy();

    if !all_healthy {
        tracing::warn!(
            database = %database.status,
            redis = %redis.status,
            "Health check degraded"
        );
    }

    let status_code = if all_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(HealthResponse {
            status: if all_healthy { "healthy" } else { "degraded" }.to_string(),
            services: ServiceHealth { database, redis },
        }),
    )
}
