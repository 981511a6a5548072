//! Authorization rules, one per protected operation.

use gatehouse_auth::{AuthorizationRule, Requirement, Role};

pub const USERS_ME: AuthorizationRule =
    AuthorizationRule::new("users.me", Requirement::Authenticated);

pub const USERS_LIST: AuthorizationRule =
    AuthorizationRule::new("users.list", Requirement::Role(Role::Admin));

pub const USERS_GET: AuthorizationRule =
    AuthorizationRule::new("users.get", Requirement::Role(Role::Admin));

/// Owners may also read their own profile.
pub const USERS_PROFILE: AuthorizationRule = AuthorizationRule::new(
    "users.profile",
    Requirement::AnyRole(&[Role::Admin, Role::Ministry]),
);
