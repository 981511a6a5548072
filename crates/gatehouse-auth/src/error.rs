//! Failure taxonomy for token handling and request authentication.
//!
//! Every decode failure keeps its own variant so logs and audit trails can
//! separate an expired session from a forged token. All of them still map to
//! `401 Unauthorized`; only [`AuthError::Forbidden`] maps to `403`.

use anyhow::anyhow;
use axum::http::StatusCode;
use gatehouse_core::AppError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("JWT token is expired.")]
    Expired,

    #[error("Invalid JWT token format.")]
    Malformed,

    #[error("Unsupported JWT token.")]
    UnsupportedFormat,

    #[error("Invalid JWT signature.")]
    BadSignature,

    #[error("JWT claims string is empty or null.")]
    EmptyOrNull,

    #[error("token processing failed: {0}")]
    Internal(String),
}

impl TokenError {
    pub fn kind(&self) -> &'static str {
        match self {
            TokenError::Expired => "token_expired",
            TokenError::Malformed => "token_malformed",
            TokenError::UnsupportedFormat => "token_unsupported_format",
            TokenError::BadSignature => "token_bad_signature",
            TokenError::EmptyOrNull => "token_empty",
            TokenError::Internal(_) => "internal_error",
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CredentialStoreError {
    #[error("credential store unavailable: {0}")]
    Unavailable(String),

    #[error("corrupt credential record: {0}")]
    CorruptRecord(String),

    #[error("login name already taken: {0}")]
    DuplicateLoginName(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Authentication is required to access this resource.")]
    Unauthenticated,

    #[error(transparent)]
    Token(#[from] TokenError),

    // Same message as ValidationFailed so a vanished account looks like any
    // other rejected token.
    #[error("Invalid or expired JWT token.")]
    IdentityNotFound,

    #[error("Invalid or expired JWT token.")]
    ValidationFailed,

    #[error("Access denied. {0}")]
    Forbidden(String),

    #[error("authentication failed unexpectedly: {0}")]
    Internal(String),
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::Forbidden(_) => StatusCode::FORBIDDEN,
            AuthError::Token(TokenError::Internal(_)) | AuthError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AuthError::Unauthenticated => "unauthenticated",
            AuthError::Token(err) => err.kind(),
            AuthError::IdentityNotFound | AuthError::ValidationFailed => "invalid_token",
            AuthError::Forbidden(_) => "forbidden",
            AuthError::Internal(_) => "internal_error",
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        let kind = err.kind();
        AppError::new(err.status(), anyhow!(err.to_string())).with_kind(kind)
    }
}

impl From<CredentialStoreError> for AppError {
    fn from(err: CredentialStoreError) -> Self {
        match err {
            CredentialStoreError::DuplicateLoginName(_) => {
                AppError::bad_request(anyhow!("User already exists with this username"))
            }
            other => AppError::internal(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_failures_are_unauthorized_with_distinct_kinds() {
        let failures = [
            TokenError::Expired,
            TokenError::Malformed,
            TokenError::UnsupportedFormat,
            TokenError::BadSignature,
            TokenError::EmptyOrNull,
        ];

        let mut kinds: Vec<&str> = failures.iter().map(|e| e.kind()).collect();
        for failure in failures {
            assert_eq!(AuthError::from(failure).status(), StatusCode::UNAUTHORIZED);
        }

        kinds.sort();
        kinds.dedup();
        assert_eq!(kinds.len(), 5);
    }

    #[test]
    fn test_missing_identity_indistinguishable_from_failed_validation() {
        let missing = AuthError::IdentityNotFound;
        let invalid = AuthError::ValidationFailed;

        assert_eq!(missing.to_string(), invalid.to_string());
        assert_eq!(missing.kind(), invalid.kind());
        assert_eq!(missing.status(), invalid.status());
    }

    #[test]
    fn test_forbidden_differs_from_unauthenticated() {
        assert_eq!(
            AuthError::Forbidden("ADMIN required".into()).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(AuthError::Unauthenticated.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_internal_faults_map_to_server_error() {
        let err: AppError = AuthError::Token(TokenError::Internal("boom".into())).into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.kind, Some("internal_error"));
    }

    #[test]
    fn test_store_errors() {
        let duplicate: AppError = CredentialStoreError::DuplicateLoginName("a@x.com".into()).into();
        assert_eq!(duplicate.status, StatusCode::BAD_REQUEST);

        let down: AppError = CredentialStoreError::Unavailable("pool closed".into()).into();
        assert_eq!(down.status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
