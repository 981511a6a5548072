use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use gatehouse_auth::Role;

use crate::modules::auth::controller::ErrorResponse;
use crate::modules::auth::model::{
    LoginRequest, LoginResponse, MessageResponse, PasswordResetLinkRequest, RegisterRequest,
    ResetPasswordRequest,
};
use crate::modules::users::model::{CurrentUserResponse, UserResponse};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::auth::controller::login_user,
        crate::modules::auth::controller::register_user,
        crate::modules::auth::controller::reset_password,
        crate::modules::auth::controller::request_password_reset,
        crate::modules::users::controller::get_me,
        crate::modules::users::controller::get_users,
        crate::modules::users::controller::get_user,
        crate::modules::users::controller::get_profile,
    ),
    components(
        schemas(
            Role,
            UserResponse,
            CurrentUserResponse,
            LoginRequest,
            LoginResponse,
            RegisterRequest,
            ResetPasswordRequest,
            PasswordResetLinkRequest,
            MessageResponse,
            ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Login, registration and password reset"),
        (name = "Users", description = "User lookup endpoints")
    ),
    info(
        title = "Gatehouse API",
        version = "0.1.0",
        description = "Bearer-token authentication and role-based authorization for the admissions portal.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

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
                        .build(),
                ),
            )
        }
    }
}
