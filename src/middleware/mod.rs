//! Request authentication and route-level authorization.
//!
//! - [`auth`]: the authentication layer and the [`auth::AuthUser`] extractor
//! - [`role`]: rule enforcement, as a route layer or as typed extractors
//! - [`rules`]: the authorization rules for every protected operation
//!
//! # Flow
//!
//! 1. [`auth::authenticate`] runs on every request. It attaches an
//!    `AuthenticatedContext` when a valid bearer token is presented, lets
//!    anonymous requests to public operations through, and rejects everything
//!    else.
//! 2. Routes that need more than "authenticated" apply a rule, either with
//!    [`role::enforce`] as a `route_layer` or through an extractor such as
//!    [`role::RequireAdmin`].
//!
//! ```ignore
//! use crate::middleware::auth::AuthUser;
//! use crate::middleware::role::RequireAdmin;
//!
//! async fn me(AuthUser(ctx): AuthUser) -> impl IntoResponse { /* ... */ }
//!
//! async fn get_user(RequireAdmin(admin): RequireAdmin) -> impl IntoResponse {
//!     // Only runs for callers holding ROLE_ADMIN
//! }
//! ```

pub mod auth;
pub mod role;
pub mod rules;
