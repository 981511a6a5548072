//! User-facing representations of stored accounts.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use gatehouse_auth::{Identity, Role, UserId};
use gatehouse_db::Account;

/// An account as returned by the API. The password hash is never included.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: UserId,
    pub username: String,
    pub role: Role,
    pub has_paid_application_fee: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl From<&Identity> for UserResponse {
    fn from(identity: &Identity) -> Self {
        Self {
            id: identity.id,
            username: identity.login_name.clone(),
            role: identity.role,
            has_paid_application_fee: identity.has_paid_application_fee(),
            created_at: None,
        }
    }
}

impl From<Account> for UserResponse {
    fn from(account: Account) -> Self {
        Self {
            created_at: Some(account.created_at),
            ..Self::from(&account.identity)
        }
    }
}

/// What the caller's own token resolves to.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUserResponse {
    pub user: UserResponse,
    /// Tagged authorities, e.g. `ROLE_STUDENT`
    pub authorities: Vec<String>,
    pub token_expires_at: DateTime<Utc>,
}
