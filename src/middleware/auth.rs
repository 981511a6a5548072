use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use gatehouse_auth::{AuthError, AuthenticatedContext, Authentication, is_public};
use gatehouse_core::AppError;
use gatehouse_observability::track_auth_rejected;

use crate::state::AppState;

/// Authentication layer applied to the whole router.
///
/// A rejection is terminal: the error response is written here and nothing
/// downstream runs.
pub async fn authenticate(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let existing = req.extensions().get::<AuthenticatedContext>().cloned();

    let outcome = state
        .authenticator
        .authenticate(req.headers(), existing.as_ref())
        .await;

    match outcome {
        Ok(Authentication::Authenticated(ctx)) => {
            req.extensions_mut().insert(ctx);
            next.run(req).await
        }
        Ok(Authentication::Anonymous) if is_public(req.method(), req.uri().path()) => {
            next.run(req).await
        }
        Ok(Authentication::Anonymous) => {
            debug!(method = %req.method(), path = %req.uri().path(), "Anonymous request to protected operation");
            reject(AuthError::Unauthenticated)
        }
        Err(err) => reject(err),
    }
}

fn reject(err: AuthError) -> Response {
    track_auth_rejected(err.kind());
    AppError::from(err).into_response()
}

/// Extractor for the caller established by [`authenticate`].
#[derive(Debug, Clone)]
pub struct AuthUser(pub AuthenticatedContext);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedContext>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| AuthError::Unauthenticated.into())
    }
}
