//! User CRUD handlers. Every route here sits behind the bearer-token middleware.

use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::get,
    Extension, Router,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::{CreateUser, UpdateUser, UserResponse};
use crate::errors::AppResult;
use crate::infra::UserQuery;
use crate::types::{
    Created, NoContent, Paginated, PaginatedUsers, PaginationParams, SortField, SortOrder,
};

/// Query string for `GET /v1/users`
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserListParams {
    /// 1-indexed page number
    #[param(example = 1, minimum = 1)]
    pub page: Option<u64>,
    /// Items per page, capped at 100
    #[param(example = 20, maximum = 100)]
    pub per_page: Option<u64>,
    /// Case-insensitive match on email or username
    pub search: Option<String>,
    /// created_at, updated_at, email or username
    #[param(example = "created_at")]
    pub sort_by: Option<String>,
    /// asc or desc
    #[param(example = "desc")]
    pub sort_order: Option<String>,
}

impl UserListParams {
    pub fn into_query(self) -> UserQuery {
        UserQuery {
            pagination: PaginationParams::new(self.page, self.per_page),
            search: self.search,
            sort_by: SortField::parse(self.sort_by.as_deref()),
            sort_order: SortOrder::parse(self.sort_order.as_deref()),
        }
    }
}

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/me", get(get_current_user))
        .route(
            "/:id",
            get(get_user).patch(update_user).delete(delete_user),
        )
}

/// List users
#[utoipa::path(
    get,
    path = "/v1/users",
    tag = "Users",
    params(UserListParams),
    responses(
        (status = 200, description = "One page of users", body = PaginatedUsers),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_users(
    State(state): State<AppState>,
    Query(params): Query<UserListParams>,
) -> AppResult<Json<Paginated<UserResponse>>> {
    let query = params.into_query();
    let (users, total) = state.user_service.list_users(&query).await?;

    Ok(Json(Paginated::new(users, query.pagination, total)))
}

/// Create a user
#[utoipa::path(
    post,
    path = "/v1/users",
    tag = "Users",
    request_body = CreateUser,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Email or username already taken")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_user(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateUser>,
) -> AppResult<Created<UserResponse>> {
    let user = state.user_service.create_user(payload).await?;
    Ok(Created(user))
}

/// Profile of the authenticated caller
#[utoipa::path(
    get,
    path = "/v1/users/me",
    tag = "Users",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_current_user(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<UserResponse>> {
    let user = state.user_service.get_user(current_user.id).await?;
    Ok(Json(user))
}

/// Fetch one user
#[utoipa::path(
    get,
    path = "/v1/users/{id}",
    tag = "Users",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<UserResponse>> {
    let user = state.user_service.get_user(id).await?;
    Ok(Json(user))
}

/// Partially update a user
#[utoipa::path(
    patch,
    path = "/v1/users/{id}",
    tag = "Users",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = UpdateUser,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 404, description = "User not found"),
        (status = 409, description = "Email or username already taken")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateUser>,
) -> AppResult<Json<UserResponse>> {
    let user = state.user_service.update_user(id, payload).await?;
    Ok(Json(user))
}

/// Delete a user
#[utoipa::path(
    delete,
    path = "/v1/users/{id}",
    tag = "Users",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<NoContent> {
    state.user_service.delete_user(id).await?;
    Ok(NoContent)
}
