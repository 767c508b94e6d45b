//! Application route configuration.

use axum::{extract::State, middleware, routing::get, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::handlers::{auth_routes, health_routes, user_routes};
use super::middleware::auth_middleware;
use super::openapi::ApiDoc;
use super::AppState;
use crate::config::API_V1_PREFIX;

/// Build the full router: public health and auth routes, token-protected
/// user routes, Swagger UI, CORS and request tracing.
pub fn create_router(state: AppState) -> Router {
    let v1 = Router::new()
        .merge(health_routes())
        .nest("/auth", auth_routes())
        .nest(
            "/users",
            user_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        );

    Router::new()
        .route("/", get(root))
        .nest(API_V1_PREFIX, v1)
        .merge(SwaggerUi::new("/docs").url("/v1/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn root(State(state): State<AppState>) -> String {
    format!("Welcome to {}", state.config.project_name)
}
