//! JWT claim structures.
//!
//! # Schema (version 2)
//!
//! ```json
//! {
//!   "sub": "a@x.com",
//!   "userId": 42,
//!   "roles": ["ROLE_ADMIN"],
//!   "iat": 1700000000,
//!   "exp": 1700003600,
//!   "issuedAtMillis": 1700000000123,
//!   "expiresAtMillis": 1700003600123,
//!   "ver": 2
//! }
//! ```
//!
//! `iat`/`exp` keep the registered NumericDate (seconds) form. The
//! millisecond fields are the authoritative lifetime. Version 1 tokens carry a
//! singular `"role": "ADMIN"` and second-precision times only; they are still
//! read, and their role is folded into the list form.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::identity::{Identity, UserId};
use crate::role::{AuthoritySet, ROLE_PREFIX};

pub const CLAIMS_VERSION: u8 = 2;

/// Claim names owned by the codec. Extra claims may not reuse them.
pub const RESERVED_CLAIMS: &[&str] = &[
    "sub",
    "userId",
    "roles",
    "role",
    "iat",
    "exp",
    "issuedAtMillis",
    "expiresAtMillis",
    "ver",
];

fn legacy_version() -> u8 {
    1
}

/// Decoded token payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Login name of the identity the token was issued for
    pub sub: String,
    #[serde(rename = "userId")]
    pub user_id: UserId,
    /// Tagged role names, e.g. `ROLE_STUDENT`
    #[serde(default)]
    pub roles: Vec<String>,
    /// Deprecated singular role; read-only
    #[serde(default, skip_serializing)]
    pub role: Option<String>,
    pub iat: i64,
    pub exp: i64,
    #[serde(
        rename = "issuedAtMillis",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub issued_at_millis: Option<i64>,
    #[serde(
        rename = "expiresAtMillis",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub expires_at_millis: Option<i64>,
    #[serde(default = "legacy_version")]
    pub ver: u8,
    /// Any additional claims carried by the token
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Claims {
    pub fn issued_at_millis(&self) -> i64 {
        self.issued_at_millis
            .unwrap_or_else(|| self.iat.saturating_mul(1000))
    }

    pub fn expires_at_millis(&self) -> i64 {
        self.expires_at_millis
            .unwrap_or_else(|| self.exp.saturating_mul(1000))
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.issued_at_millis())
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
    }

    /// Out-of-range expiry values collapse to the epoch and therefore read
    /// as expired.
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.expires_at_millis())
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
    }

    /// A token is live strictly before its expiry instant.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp_millis() >= self.expires_at_millis()
    }

    /// Role claim values in list form, normalized to `ROLE_<UPPER>`.
    pub fn role_names(&self) -> Vec<String> {
        if !self.roles.is_empty() {
            return self.roles.iter().map(|r| normalize_role_claim(r)).collect();
        }

        self.role
            .as_deref()
            .map(|r| vec![normalize_role_claim(r)])
            .unwrap_or_default()
    }

    pub fn authorities(&self) -> AuthoritySet {
        AuthoritySet::from_claim_values(self.role_names())
    }

    pub fn is_legacy(&self) -> bool {
        self.ver < CLAIMS_VERSION
    }

    /// Looks up any claim by its wire name.
    pub fn get(&self, name: &str) -> Option<Value> {
        match name {
            "sub" => Some(Value::from(self.sub.clone())),
            "userId" => Some(Value::from(self.user_id)),
            "roles" | "role" => Some(Value::from(self.role_names())),
            "iat" => Some(Value::from(self.iat)),
            "exp" => Some(Value::from(self.exp)),
            "issuedAtMillis" => Some(Value::from(self.issued_at_millis())),
            "expiresAtMillis" => Some(Value::from(self.expires_at_millis())),
            "ver" => Some(Value::from(self.ver)),
            other => self.extra.get(other).cloned(),
        }
    }
}

fn normalize_role_claim(raw: &str) -> String {
    let upper = raw.trim().to_ascii_uppercase();
    if upper.starts_with(ROLE_PREFIX) {
        upper
    } else {
        format!("{}{}", ROLE_PREFIX, upper)
    }
}

/// Caller-supplied claims for a token about to be issued.
#[derive(Debug, Clone, PartialEq)]
pub struct ClaimSet {
    pub user_id: UserId,
    pub roles: AuthoritySet,
    pub extra: Map<String, Value>,
}

impl ClaimSet {
    pub fn new(user_id: UserId, roles: AuthoritySet) -> Self {
        Self {
            user_id,
            roles,
            extra: Map::new(),
        }
    }

    pub fn for_identity(identity: &Identity) -> Self {
        Self::new(identity.id, identity.authorities())
    }

    pub fn with_claim(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(name.into(), value.into());
        self
    }
}

/// An issued, signed token together with the lifetime it was signed for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub value: String,
    pub subject: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Token {
    pub fn as_str(&self) -> &str {
        &self.value
    }
}
