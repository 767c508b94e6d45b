//! OpenAPI document served at `/v1/openapi.json` and browsable at `/docs`.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{auth_handler, health_handler, user_handler};
use crate::domain::{CreateUser, UpdateUser, UserResponse};
use crate::services::TokenResponse;
use crate::types::{PaginatedUsers, PaginationMeta};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Backend Template",
        version = "0.1.0",
        description = "Starter backend: axum, SeaORM, Redis cache and apalis background jobs",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    paths(
        health_handler::ping,
        health_handler::health,
        auth_handler::signup,
        auth_handler::login,
        auth_handler::refresh,
        user_handler::list_users,
        user_handler::create_user,
        user_handler::get_current_user,
        user_handler::get_user,
        user_handler::update_user,
        user_handler::delete_user,
    ),
    components(
        schemas(
            health_handler::PingResponse,
            health_handler::HealthResponse,
            health_handler::ServiceHealth,
            health_handler::ServiceStatus,
            CreateUser,
            UpdateUser,
            UserResponse,
            PaginatedUsers,
            PaginationMeta,
            auth_handler::LoginRequest,
            auth_handler::RefreshRequest,
            TokenResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness and readiness"),
        (name = "Authentication", description = "Signup, login and token refresh"),
        (name = "Users", description = "Example user CRUD")
    )
)]
pub struct ApiDoc;

/// Registers the `bearer_auth` JWT scheme referenced by protected paths
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Access token from /v1/auth/login"))
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_all_paths() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();

        for expected in [
            "/v1/ping",
            "/v1/health",
            "/v1/auth/signup",
            "/v1/auth/login",
            "/v1/auth/refresh",
            "/v1/users",
            "/v1/users/me",
            "/v1/users/{id}",
        ] {
            assert!(
                paths.iter().any(|p| p.as_str() == expected),
                "missing {}",
                expected
            );
        }
    }
}
