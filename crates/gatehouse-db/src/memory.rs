//! Process-local credential store for tests and database-less runs.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use gatehouse_auth::{
    CredentialStore, CredentialStoreError, HAS_PAID_APPLICATION_FEE, Identity, UserId,
};

use crate::account::{Account, AccountStore, NewAccount};

#[derive(Debug)]
pub struct InMemoryCredentialStore {
    accounts: RwLock<BTreeMap<UserId, Account>>,
    next_id: AtomicI64,
}

impl Default for InMemoryCredentialStore {
    fn default() -> Self {
        Self {
            accounts: RwLock::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes an account. Tokens already issued for it stop authenticating.
    pub async fn remove(&self, id: UserId) -> bool {
        self.accounts.write().await.remove(&id).is_some()
    }

    /// Replaces a stored identity as-is, keeping its creation time.
    pub async fn replace(&self, identity: Identity) -> bool {
        let mut accounts = self.accounts.write().await;
        match accounts.get_mut(&identity.id) {
            Some(account) => {
                account.identity = identity;
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn find_by_login_name(
        &self,
        login_name: &str,
    ) -> Result<Option<Identity>, CredentialStoreError> {
        let accounts = self.accounts.read().await;
        Ok(accounts
            .values()
            .find(|account| account.identity.login_name == login_name)
            .map(|account| account.identity.clone()))
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<Identity>, CredentialStoreError> {
        let accounts = self.accounts.read().await;
        Ok(accounts.get(&id).map(|account| account.identity.clone()))
    }
}

#[async_trait]
impl AccountStore for InMemoryCredentialStore {
    async fn create(&self, account: NewAccount) -> Result<Account, CredentialStoreError> {
        let mut accounts = self.accounts.write().await;

        if accounts
            .values()
            .any(|existing| existing.identity.login_name == account.login_name)
        {
            return Err(CredentialStoreError::DuplicateLoginName(account.login_name));
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let created = Account {
            identity: Identity::new(id, account.login_name, account.password_hash, account.role)
                .with_flag(HAS_PAID_APPLICATION_FEE, false),
            created_at: Utc::now(),
        };
        accounts.insert(id, created.clone());

        Ok(created)
    }

    async fn find_account(&self, id: UserId) -> Result<Option<Account>, CredentialStoreError> {
        Ok(self.accounts.read().await.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Account>, CredentialStoreError> {
        Ok(self.accounts.read().await.values().cloned().collect())
    }

    async fn update_password(
        &self,
        login_name: &str,
        password_hash: &str,
    ) -> Result<bool, CredentialStoreError> {
        let mut accounts = self.accounts.write().await;
        match accounts
            .values_mut()
            .find(|account| account.identity.login_name == login_name)
        {
            Some(account) => {
                account.identity.password_hash = password_hash.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
