use axum::{
    Json,
    extract::{Path, State},
};
use tracing::instrument;

use gatehouse_auth::UserId;
use gatehouse_core::AppError;

use crate::middleware::auth::AuthUser;
use crate::middleware::role::RequireAdmin;
use crate::modules::auth::controller::ErrorResponse;
use crate::state::AppState;

use super::model::{CurrentUserResponse, UserResponse};
use super::service::UserService;

/// The authenticated caller
#[utoipa::path(
    get,
    path = "/api/users/me",
    responses(
        (status = 200, description = "Current user", body = CurrentUserResponse),
        (status = 401, description = "Unauthorized - missing or invalid token", body = ErrorResponse),
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Users"
)]
#[instrument(skip_all)]
pub async fn get_me(AuthUser(ctx): AuthUser) -> Json<CurrentUserResponse> {
    Json(UserService::current_user(&ctx))
}

/// List all users (ADMIN)
#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "List of users", body = Vec<UserResponse>),
        (status = 401, description = "Unauthorized - missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Forbidden - ADMIN role required", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Users"
)]
#[instrument(skip_all)]
pub async fn get_users(State(state): State<AppState>) -> Result<Json<Vec<UserResponse>>, AppError> {
    let users = UserService::get_users(&state).await?;
    Ok(Json(users))
}

/// Get a user by ID (ADMIN)
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User details", body = UserResponse),
        (status = 401, description = "Unauthorized - missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Forbidden - ADMIN role required", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Users"
)]
#[instrument(skip(state, _admin))]
pub async fn get_user(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<UserId>,
) -> Result<Json<UserResponse>, AppError> {
    let user = UserService::get_user(&state, id).await?;
    Ok(Json(user))
}

/// Get a user's profile (ADMIN, MINISTRY or the user themselves)
#[utoipa::path(
    get,
    path = "/api/users/{id}/profile",
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User profile", body = UserResponse),
        (status = 401, description = "Unauthorized - missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Forbidden - not staff and not the owner", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Users"
)]
#[instrument(skip(state, auth_user))]
pub async fn get_profile(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<UserId>,
) -> Result<Json<UserResponse>, AppError> {
    let user = UserService::get_profile(&state, &auth_user.0, id).await?;
    Ok(Json(user))
}
