//! Application error type shared by every HTTP-facing layer.
//!
//! [`AppError`] pairs an HTTP status with an [`anyhow::Error`] and an optional
//! machine-readable `kind`. The kind is what lets a client (or an audit log)
//! tell an expired token apart from a tampered one while both still map to
//! `401 Unauthorized`.

use anyhow::{Error, anyhow};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub error: Error,
    pub kind: Option<&'static str>,
}

impl AppError {
    pub fn new<E>(status: StatusCode, err: E) -> Self
    where
        E: Into<Error>,
    {
        Self {
            status,
            error: err.into(),
            kind: None,
        }
    }

    /// Attaches a diagnostic kind that is rendered next to the message.
    pub fn with_kind(mut self, kind: &'static str) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn internal<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::internal(anyhow!(message.into()))
    }

    pub fn not_found<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::NOT_FOUND, err)
    }

    pub fn unprocessable<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, err)
    }

    pub fn bad_request<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::BAD_REQUEST, err)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, anyhow!(message.into()))
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, anyhow!(message.into()))
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, anyhow!(message.into()))
    }

    pub fn is_server_error(&self) -> bool {
        self.status.is_server_error()
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.status, self.error)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Internal details stay in the log, never in the body.
        let message = if self.is_server_error() {
            tracing::error!(status = %self.status, error = ?self.error, "request failed");
            "An internal server error occurred.".to_string()
        } else {
            self.error.to_string()
        };

        let body = match self.kind {
            Some(kind) => json!({ "error": message, "kind": kind }),
            None => json!({ "error": message }),
        };

        (self.status, Json(body)).into_response()
    }
}

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        AppError::internal(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_unauthorized_with_kind() {
        let err = AppError::unauthorized("JWT token is expired.").with_kind("token_expired");
        let (status, body) = body_json(err).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "JWT token is expired.");
        assert_eq!(body["kind"], "token_expired");
    }

    #[tokio::test]
    async fn test_kind_omitted_when_absent() {
        let (status, body) = body_json(AppError::forbidden("nope")).await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(body.get("kind").is_none());
    }

    #[tokio::test]
    async fn test_internal_error_hides_details() {
        let err = AppError::internal_error("connection refused at 10.0.0.3:5432");
        let (status, body) = body_json(err).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "An internal server error occurred.");
    }

    #[test]
    fn test_from_anyhow_is_internal() {
        let err: AppError = anyhow!("boom").into();
        assert!(err.is_server_error());
    }
}
