use std::collections::BTreeMap;

use serde::Serialize;

use crate::role::{AuthoritySet, Role};

pub type UserId = i64;

/// Flag set once an applicant's fee payment has been approved.
pub const HAS_PAID_APPLICATION_FEE: &str = "hasPaidApplicationFee";

/// A credential record as returned by the external store.
///
/// The core reads identities but never mutates them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: UserId,
    pub login_name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub flags: BTreeMap<String, bool>,
}

impl Identity {
    pub fn new(
        id: UserId,
        login_name: impl Into<String>,
        password_hash: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            id,
            login_name: login_name.into(),
            password_hash: password_hash.into(),
            role,
            flags: BTreeMap::new(),
        }
    }

    pub fn with_flag(mut self, name: impl Into<String>, value: bool) -> Self {
        self.flags.insert(name.into(), value);
        self
    }

    /// Unset flags read as `false`.
    pub fn flag(&self, name: &str) -> bool {
        self.flags.get(name).copied().unwrap_or(false)
    }

    pub fn has_paid_application_fee(&self) -> bool {
        self.flag(HAS_PAID_APPLICATION_FEE)
    }

    pub fn authorities(&self) -> AuthoritySet {
        AuthoritySet::single(self.role)
    }
}
