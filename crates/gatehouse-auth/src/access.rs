//! Operations reachable without credentials.
//!
//! Every other route requires an authenticated caller; the authentication
//! layer rejects anonymous requests to them before routing reaches a handler.

use axum::http::Method;

/// `(method, path)` pairs.
pub const PUBLIC_OPERATIONS: &[(&str, &str)] = &[
    ("POST", "/api/users/login"),
    ("POST", "/api/users/register"),
    ("POST", "/api/users/reset-password"),
    ("POST", "/api/users/reset-password-request"),
    ("GET", "/health"),
    ("GET", "/api-docs/openapi.json"),
];

/// Exact match on method and path; one trailing slash is ignored.
pub fn is_public(method: &Method, path: &str) -> bool {
    let path = match path.strip_suffix('/') {
        Some(trimmed) if !trimmed.is_empty() => trimmed,
        _ => path,
    };

    PUBLIC_OPERATIONS
        .iter()
        .any(|(m, p)| *m == method.as_str() && *p == path)
}
