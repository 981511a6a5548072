//! Enforcement of [`AuthorizationRule`]s.
//!
//! Two ways to guard a route, both backed by [`check`]:
//!
//! 1. Layer-based, with [`enforce`] as a `route_layer`
//! 2. Extractor-based, with types generated by [`require_role!`]

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use gatehouse_auth::{AuthenticatedContext, AuthorizationRule};
use gatehouse_core::AppError;
use gatehouse_observability::track_authorization_check;

use crate::middleware::rules;

/// Evaluates `rule` for the caller and records the outcome.
pub fn check(rule: &AuthorizationRule, ctx: Option<&AuthenticatedContext>) -> Result<(), AppError> {
    let decision = rule.decide(ctx);
    track_authorization_check(decision.is_allowed(), rule.operation);

    if !decision.is_allowed() {
        warn!(
            operation = rule.operation,
            user_id = ctx.map(|c| c.user_id()),
            decision = ?decision,
            "Authorization denied"
        );
    }

    decision.into_result().map_err(AppError::from)
}

/// Route layer enforcing the rule held in its state.
///
/// ```ignore
/// Router::new()
///     .route("/api/users", get(list_users))
///     .route_layer(middleware::from_fn_with_state(rules::USERS_LIST, enforce))
/// ```
pub async fn enforce(
    State(rule): State<AuthorizationRule>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    check(&rule, req.extensions().get::<AuthenticatedContext>())?;
    Ok(next.run(req).await)
}

/// Generates an extractor that yields the caller only when `$rule` allows
/// them.
#[macro_export]
macro_rules! require_role {
    ($name:ident, $rule:expr) => {
        #[derive(Debug, Clone)]
        pub struct $name(pub $crate::middleware::auth::AuthUser);

        impl<S> axum::extract::FromRequestParts<S> for $name
        where
            S: Send + Sync,
        {
            type Rejection = $crate::gatehouse_core::AppError;

            async fn from_request_parts(
                parts: &mut axum::http::request::Parts,
                state: &S,
            ) -> Result<Self, Self::Rejection> {
                let ctx = parts
                    .extensions
                    .get::<$crate::gatehouse_auth::AuthenticatedContext>();
                $crate::middleware::role::check(&$rule, ctx)?;

                let auth_user = <$crate::middleware::auth::AuthUser as axum::extract::FromRequestParts<
                    S,
                >>::from_request_parts(parts, state)
                .await?;
                Ok($name(auth_user))
            }
        }
    };
}

require_role!(RequireAdmin, rules::USERS_GET);
