use axum::{Router, routing::post};

use crate::state::AppState;

use super::controller::{login_user, register_user, request_password_reset, reset_password};

pub fn init_auth_router() -> Router<AppState> {
    Router::new()
        .route("/api/users/login", post(login_user))
        .route("/api/users/register", post(register_user))
        .route("/api/users/reset-password", post(reset_password))
        .route(
            "/api/users/reset-password-request",
            post(request_password_reset),
        )
}
