use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Serialize;
use tracing::instrument;
use utoipa::ToSchema;

use gatehouse_core::AppError;

use crate::modules::users::model::UserResponse;
use crate::state::AppState;
use crate::validator::ValidatedJson;

use super::model::{
    LoginRequest, LoginResponse, MessageResponse, PasswordResetLinkRequest, RegisterRequest,
    ResetPasswordRequest,
};
use super::service::AuthService;

#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    /// Machine-readable failure kind, e.g. `token_expired`
    pub kind: Option<String>,
}

/// Login and receive a bearer token
#[utoipa::path(
    post,
    path = "/api/users/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 400, description = "Bad request - validation error", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip_all)]
pub async fn login_user(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let response = AuthService::login(&state, dto).await?;
    Ok(Json(response))
}

/// Register a new student account
#[utoipa::path(
    post,
    path = "/api/users/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered successfully", body = UserResponse),
        (status = 400, description = "Bad request - validation error or username taken", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip_all)]
pub async fn register_user(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let user = AuthService::register(&state, dto).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Set a new password for an account
#[utoipa::path(
    post,
    path = "/api/users/reset-password",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password updated", body = MessageResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 400, description = "Bad request - validation error", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip_all)]
pub async fn reset_password(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    AuthService::reset_password(&state, dto).await?;
    Ok(Json(MessageResponse {
        message: "Password updated successfully!".to_string(),
    }))
}

/// Request a password reset link
#[utoipa::path(
    post,
    path = "/api/users/reset-password-request",
    request_body = PasswordResetLinkRequest,
    responses(
        (status = 200, description = "Reset link sent if the account exists", body = MessageResponse),
        (status = 400, description = "Bad request - validation error", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip_all)]
pub async fn request_password_reset(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<PasswordResetLinkRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    AuthService::request_password_reset(&state, &dto.username).await?;
    Ok(Json(MessageResponse {
        message: "If an account exists with that username, a password reset link has been sent."
            .to_string(),
    }))
}
