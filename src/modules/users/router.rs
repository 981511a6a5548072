use axum::{Router, middleware, routing::get};

use crate::middleware::role::enforce;
use crate::middleware::rules;
use crate::state::AppState;

use super::controller::{get_me, get_profile, get_user, get_users};

pub fn init_users_router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/users",
            get(get_users).route_layer(middleware::from_fn_with_state(rules::USERS_LIST, enforce)),
        )
        .route(
            "/api/users/me",
            get(get_me).route_layer(middleware::from_fn_with_state(rules::USERS_ME, enforce)),
        )
        .route("/api/users/{id}", get(get_user))
        .route("/api/users/{id}/profile", get(get_profile))
}
