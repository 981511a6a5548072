//! Declarative authorization rules.
//!
//! Rules are `const` values declared next to the routes they guard and are
//! evaluated after authentication. [`decide`] is pure; [`decide_owned`] adds
//! a resource-ownership escape hatch that needs one lookup.

use std::fmt;
use std::future::Future;

use tracing::warn;

use crate::context::AuthenticatedContext;
use crate::error::AuthError;
use crate::identity::UserId;
use crate::role::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// Open to anyone, authenticated or not.
    None,
    Authenticated,
    Role(Role),
    AnyRole(&'static [Role]),
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Requirement::None => f.write_str("none"),
            Requirement::Authenticated => f.write_str("authenticated"),
            Requirement::Role(role) => write!(f, "{}", role),
            Requirement::AnyRole(roles) => {
                let names: Vec<&str> = roles.iter().map(|r| r.as_str()).collect();
                write!(f, "one of {}", names.join(", "))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenyReason {
    Unauthenticated,
    MissingRole { required: Requirement },
    NotOwner,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    /// A missing caller becomes [`AuthError::Unauthenticated`]; any other
    /// denial is [`AuthError::Forbidden`].
    pub fn into_result(self) -> Result<(), AuthError> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny(DenyReason::Unauthenticated) => Err(AuthError::Unauthenticated),
            Decision::Deny(DenyReason::MissingRole { required }) => Err(AuthError::Forbidden(
                format!("Required role: {}", required),
            )),
            Decision::Deny(DenyReason::NotOwner) => Err(AuthError::Forbidden(
                "You do not have access to this resource".to_string(),
            )),
        }
    }
}

/// A named operation and what it takes to call it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthorizationRule {
    pub operation: &'static str,
    pub requirement: Requirement,
}

impl AuthorizationRule {
    pub const fn new(operation: &'static str, requirement: Requirement) -> Self {
        Self {
            operation,
            requirement,
        }
    }

    pub fn decide(&self, ctx: Option<&AuthenticatedContext>) -> Decision {
        decide(ctx, &self.requirement)
    }
}

pub fn decide(ctx: Option<&AuthenticatedContext>, requirement: &Requirement) -> Decision {
    if matches!(requirement, Requirement::None) {
        return Decision::Allow;
    }

    let Some(ctx) = ctx else {
        return Decision::Deny(DenyReason::Unauthenticated);
    };

    let allowed = match requirement {
        Requirement::None | Requirement::Authenticated => true,
        Requirement::Role(role) => ctx.has_role(*role),
        Requirement::AnyRole(roles) => ctx.has_any_role(roles),
    };

    if allowed {
        Decision::Allow
    } else {
        Decision::Deny(DenyReason::MissingRole {
            required: *requirement,
        })
    }
}

/// Like [`decide`], but a caller who owns the resource is also allowed.
///
/// `owner_lookup` is only awaited when the role check denies. A lookup that
/// fails or finds no owner denies.
pub async fn decide_owned<F, Fut, E>(
    ctx: &AuthenticatedContext,
    requirement: &Requirement,
    owner_lookup: F,
) -> Decision
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Option<UserId>, E>>,
    E: fmt::Display,
{
    if decide(Some(ctx), requirement).is_allowed() {
        return Decision::Allow;
    }

    match owner_lookup().await {
        Ok(Some(owner)) if owner == ctx.user_id() => Decision::Allow,
        Ok(_) => Decision::Deny(DenyReason::NotOwner),
        Err(e) => {
            warn!(user_id = ctx.user_id(), error = %e, "Owner lookup failed");
            Decision::Deny(DenyReason::NotOwner)
        }
    }
}
