//! Roles and the authority strings derived from them.
//!
//! Each identity carries exactly one [`Role`]. Tokens and authorization
//! checks work with an [`AuthoritySet`] so that multi-role accounts can be
//! introduced without changing the claim schema.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Marker prepended to every role name inside token claims.
pub const ROLE_PREFIX: &str = "ROLE_";

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Student,
    Admin,
    Ministry,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Student, Role::Admin, Role::Ministry];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "STUDENT",
            Role::Admin => "ADMIN",
            Role::Ministry => "MINISTRY",
        }
    }

    /// The tagged claim value, e.g. `ROLE_ADMIN`.
    pub fn authority(&self) -> String {
        format!("{}{}", ROLE_PREFIX, self.as_str())
    }

    /// Normalizes a claim or database value into a role. Accepts any casing,
    /// with or without the `ROLE_` marker.
    pub fn from_authority(raw: &str) -> Option<Role> {
        let upper = raw.trim().to_ascii_uppercase();
        let name = upper.strip_prefix(ROLE_PREFIX).unwrap_or(&upper);

        Role::ALL.into_iter().find(|role| role.as_str() == name)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRole(pub String);

impl fmt::Display for UnknownRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown role: {}", self.0)
    }
}

impl std::error::Error for UnknownRole {}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::from_authority(s).ok_or_else(|| UnknownRole(s.to_string()))
    }
}

/// The set of roles an authenticated caller holds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthoritySet(BTreeSet<Role>);

impl AuthoritySet {
    pub fn single(role: Role) -> Self {
        Self(BTreeSet::from([role]))
    }

    /// Builds a set from claim values, skipping anything unrecognized.
    pub fn from_claim_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            values
                .into_iter()
                .filter_map(|value| Role::from_authority(value.as_ref()))
                .collect(),
        )
    }

    pub fn contains(&self, role: Role) -> bool {
        self.0.contains(&role)
    }

    pub fn contains_any(&self, roles: &[Role]) -> bool {
        roles.iter().any(|role| self.contains(*role))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Role> + '_ {
        self.0.iter().copied()
    }

    pub fn to_claim_values(&self) -> Vec<String> {
        self.iter().map(|role| role.authority()).collect()
    }
}

impl FromIterator<Role> for AuthoritySet {
    fn from_iter<T: IntoIterator<Item = Role>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
