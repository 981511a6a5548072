use chrono::{DateTime, Utc};

use crate::identity::{Identity, UserId};
use crate::role::{AuthoritySet, Role};

/// The caller established by a verified token and a matching identity.
///
/// Built fresh for every request and carried as a request extension; it is
/// never cached or persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthenticatedContext {
    pub identity: Identity,
    /// Derived from the stored identity, not from the token's claims.
    pub authorities: AuthoritySet,
    pub token_expires_at: DateTime<Utc>,
}

impl AuthenticatedContext {
    pub fn new(identity: Identity, token_expires_at: DateTime<Utc>) -> Self {
        let authorities = identity.authorities();
        Self {
            identity,
            authorities,
            token_expires_at,
        }
    }

    pub fn user_id(&self) -> UserId {
        self.identity.id
    }

    pub fn login_name(&self) -> &str {
        &self.identity.login_name
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.authorities.contains(role)
    }

    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        self.authorities.contains_any(roles)
    }
}
