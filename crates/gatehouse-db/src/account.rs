use async_trait::async_trait;
use chrono::{DateTime, Utc};

use gatehouse_auth::{CredentialStore, CredentialStoreError, Identity, Role, UserId};

/// A stored identity plus bookkeeping the auth core does not read.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub identity: Identity,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewAccount {
    pub login_name: String,
    /// Already hashed; stores never see plaintext passwords.
    pub password_hash: String,
    pub role: Role,
}

/// Write side of the credential store, used by registration and
/// administration. Authentication only ever goes through the read-only
/// [`CredentialStore`] supertrait.
#[async_trait]
pub trait AccountStore: CredentialStore {
    /// Fails with [`CredentialStoreError::DuplicateLoginName`] when the login
    /// name is taken.
    async fn create(&self, account: NewAccount) -> Result<Account, CredentialStoreError>;

    async fn find_account(&self, id: UserId) -> Result<Option<Account>, CredentialStoreError>;

    /// All accounts ordered by id.
    async fn list(&self) -> Result<Vec<Account>, CredentialStoreError>;

    /// Returns `false` when no account has this login name.
    async fn update_password(
        &self,
        login_name: &str,
        password_hash: &str,
    ) -> Result<bool, CredentialStoreError>;
}
