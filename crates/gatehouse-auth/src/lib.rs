//! # Gatehouse Auth
//!
//! Request authentication and authorization for the Gatehouse API.
//!
//! - [`codec`]: issues and verifies HS256 bearer tokens
//! - [`resolver`]: identity lookup over an external [`CredentialStore`]
//! - [`authenticator`]: the per-request authentication state machine
//! - [`policy`]: role and ownership rules evaluated after authentication
//! - [`access`]: operations reachable without credentials
//!
//! Login flow: [`CredentialResolver::authenticate_credentials`] then
//! [`TokenCodec::issue_for`]. Every later request goes through
//! [`Authenticator::authenticate`] and, where a route demands it,
//! [`policy::decide`].

pub mod access;
pub mod authenticator;
pub mod claims;
pub mod codec;
pub mod context;
pub mod error;
pub mod identity;
pub mod policy;
pub mod resolver;
pub mod role;

pub use access::is_public;
pub use authenticator::{Authentication, Authenticator, bearer_token};
pub use claims::{ClaimSet, Claims, Token};
pub use codec::TokenCodec;
pub use context::AuthenticatedContext;
pub use error::{AuthError, CredentialStoreError, TokenError};
pub use identity::{HAS_PAID_APPLICATION_FEE, Identity, UserId};
pub use policy::{AuthorizationRule, Decision, DenyReason, Requirement, decide, decide_owned};
pub use resolver::{BcryptVerifier, CredentialResolver, CredentialStore, PasswordVerifier};
pub use role::{AuthoritySet, Role, UnknownRole};
