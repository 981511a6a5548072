//! The per-request authentication decision.
//!
//! ```text
//! NoToken -> TokenPresent -> {Decoded | DecodeFailed}
//!         -> {IdentityResolved | IdentityMissing}
//!         -> {Validated | ValidationFailed} -> Authenticated | Rejected
//! ```
//!
//! [`Authenticator::authenticate`] walks these states for one request. It
//! never writes to the credential store and never retries a failed lookup.

use std::sync::Arc;

use axum::http::{HeaderMap, header};
use chrono::{DateTime, Utc};
use tracing::{debug, error, warn};

use crate::codec::TokenCodec;
use crate::context::AuthenticatedContext;
use crate::error::AuthError;
use crate::resolver::CredentialResolver;

const BEARER_PREFIX: &str = "Bearer ";

/// Outcome of a request that was not rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum Authentication {
    /// No bearer credentials were offered.
    Anonymous,
    Authenticated(AuthenticatedContext),
}

/// Returns the token part of an `Authorization: Bearer <token>` header.
///
/// Any other scheme, or a header that is not valid ASCII, counts as absent.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix(BEARER_PREFIX))
}

#[derive(Debug, Clone)]
pub struct Authenticator {
    codec: Arc<TokenCodec>,
    resolver: CredentialResolver,
}

impl Authenticator {
    pub fn new(codec: Arc<TokenCodec>, resolver: CredentialResolver) -> Self {
        Self { codec, resolver }
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    pub fn resolver(&self) -> &CredentialResolver {
        &self.resolver
    }

    pub async fn authenticate(
        &self,
        headers: &HeaderMap,
        existing: Option<&AuthenticatedContext>,
    ) -> Result<Authentication, AuthError> {
        self.authenticate_at(headers, existing, Utc::now()).await
    }

    /// Runs the authentication state machine with `now` as the clock.
    ///
    /// When `existing` is set the token is still decoded, but the identity is
    /// not looked up again and the existing context is returned unchanged.
    pub async fn authenticate_at(
        &self,
        headers: &HeaderMap,
        existing: Option<&AuthenticatedContext>,
        now: DateTime<Utc>,
    ) -> Result<Authentication, AuthError> {
        let Some(token) = bearer_token(headers) else {
            return Ok(Authentication::Anonymous);
        };

        let claims = self.codec.decode_at(token, now).map_err(|e| {
            warn!(kind = e.kind(), "Rejected bearer token");
            AuthError::Token(e)
        })?;

        if let Some(ctx) = existing {
            if ctx.login_name() != claims.sub {
                warn!(
                    subject = %claims.sub,
                    user_id = ctx.user_id(),
                    "Token subject does not match the attached context"
                );
                return Err(AuthError::ValidationFailed);
            }
            return Ok(Authentication::Authenticated(ctx.clone()));
        }

        let identity = match self.resolver.find_by_login_name(&claims.sub).await {
            Ok(Some(identity)) => identity,
            Ok(None) => {
                warn!(subject = %claims.sub, "Token subject does not resolve to an identity");
                return Err(AuthError::IdentityNotFound);
            }
            Err(e) => {
                error!(subject = %claims.sub, error = %e, "Credential store lookup failed");
                return Err(AuthError::IdentityNotFound);
            }
        };

        // Issued authorities must still match the stored record.
        if identity.login_name != claims.sub
            || identity.id != claims.user_id
            || identity.authorities() != claims.authorities()
            || claims.is_expired_at(now)
        {
            warn!(
                subject = %claims.sub,
                user_id = identity.id,
                "Token does not match the resolved identity"
            );
            return Err(AuthError::ValidationFailed);
        }

        debug!(user_id = identity.id, role = %identity.role, "Request authenticated");

        Ok(Authentication::Authenticated(AuthenticatedContext::new(
            identity,
            claims.expires_at(),
        )))
    }
}
