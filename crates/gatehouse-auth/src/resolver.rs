//! Identity lookup and password verification.
//!
//! [`CredentialResolver`] is a thin layer over an external [`CredentialStore`].
//! It never writes to the store and never decides the hashing algorithm; both
//! belong to the adapters it is built from.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, instrument};

use crate::error::CredentialStoreError;
use crate::identity::{Identity, UserId};

/// Read access to stored credential records.
///
/// A missing record is `Ok(None)`, never an error. `Err` is reserved for the
/// store itself failing.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_login_name(
        &self,
        login_name: &str,
    ) -> Result<Option<Identity>, CredentialStoreError>;

    async fn find_by_id(&self, id: UserId) -> Result<Option<Identity>, CredentialStoreError>;
}

/// One-way hash comparison.
pub trait PasswordVerifier: Send + Sync {
    fn verify(&self, plaintext: &str, hash: &str) -> bool;
}

/// bcrypt-backed [`PasswordVerifier`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BcryptVerifier;

impl PasswordVerifier for BcryptVerifier {
    fn verify(&self, plaintext: &str, hash: &str) -> bool {
        match gatehouse_core::verify_password(plaintext, hash) {
            Ok(matches) => matches,
            Err(e) => {
                error!(error = %e, "Stored password hash could not be checked");
                false
            }
        }
    }
}

#[derive(Clone)]
pub struct CredentialResolver {
    store: Arc<dyn CredentialStore>,
    verifier: Arc<dyn PasswordVerifier>,
}

impl std::fmt::Debug for CredentialResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialResolver").finish_non_exhaustive()
    }
}

impl CredentialResolver {
    /// Resolver that verifies passwords with bcrypt.
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self::with_verifier(store, Arc::new(BcryptVerifier))
    }

    pub fn with_verifier(
        store: Arc<dyn CredentialStore>,
        verifier: Arc<dyn PasswordVerifier>,
    ) -> Self {
        Self { store, verifier }
    }

    pub async fn find_by_login_name(
        &self,
        login_name: &str,
    ) -> Result<Option<Identity>, CredentialStoreError> {
        self.store.find_by_login_name(login_name).await
    }

    pub async fn find_by_id(&self, id: UserId) -> Result<Option<Identity>, CredentialStoreError> {
        self.store.find_by_id(id).await
    }

    pub fn verify_password(&self, identity: &Identity, plaintext: &str) -> bool {
        self.verifier.verify(plaintext, &identity.password_hash)
    }

    /// Looks up `login_name` and checks `password` against it.
    ///
    /// Returns `Ok(None)` for both an unknown login and a wrong password so
    /// callers cannot tell the two apart.
    #[instrument(skip(self, password))]
    pub async fn authenticate_credentials(
        &self,
        login_name: &str,
        password: &str,
    ) -> Result<Option<Identity>, CredentialStoreError> {
        let Some(identity) = self.find_by_login_name(login_name).await? else {
            return Ok(None);
        };

        if self.verify_password(&identity, password) {
            Ok(Some(identity))
        } else {
            Ok(None)
        }
    }
}
