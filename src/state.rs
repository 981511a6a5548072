use std::sync::Arc;

use gatehouse_auth::{Authenticator, CredentialResolver, TokenCodec};
use gatehouse_config::{ConfigError, CorsConfig, JwtConfig};
use gatehouse_db::AccountStore;

#[derive(Clone)]
pub struct AppState {
    pub codec: Arc<TokenCodec>,
    pub resolver: CredentialResolver,
    pub authenticator: Arc<Authenticator>,
    pub accounts: Arc<dyn AccountStore>,
    pub cors_config: CorsConfig,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("codec", &self.codec)
            .field("cors_config", &self.cors_config)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Wires the codec, resolver and authenticator around one store.
    ///
    /// Fails only when the JWT configuration is unusable.
    pub fn new<S>(
        store: Arc<S>,
        jwt_config: &JwtConfig,
        cors_config: CorsConfig,
    ) -> Result<Self, ConfigError>
    where
        S: AccountStore + 'static,
    {
        let codec = Arc::new(TokenCodec::new(jwt_config)?);
        let resolver = CredentialResolver::new(store.clone());
        let authenticator = Arc::new(Authenticator::new(codec.clone(), resolver.clone()));

        Ok(Self {
            codec,
            resolver,
            authenticator,
            accounts: store,
            cors_config,
        })
    }
}
