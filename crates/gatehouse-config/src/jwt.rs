//! Signing-key and token-lifetime configuration.
//!
//! # Environment Variables
//!
//! - `JWT_SECRET`: HMAC signing secret (required, non-empty)
//! - `JWT_EXPIRATION_MS`: token lifetime in milliseconds (default: 1 hour)
//!
//! A secret shorter than [`MIN_SECRET_LENGTH`] bytes and a non-positive
//! lifetime are accepted with a logged warning rather than refused. Tokens
//! issued under a non-positive lifetime are expired on arrival.

use std::env;

use tracing::warn;

use crate::error::ConfigError;

/// Minimum secret length recommended for HS256 (256 bits).
pub const MIN_SECRET_LENGTH: usize = 32;

pub const DEFAULT_EXPIRATION_MS: i64 = 3_600_000;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigWarning {
    ShortSecret { length: usize },
    NonPositiveExpiration { millis: i64 },
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigWarning::ShortSecret { length } => write!(
                f,
                "JWT secret is {} bytes; at least {} are recommended for HS256",
                length, MIN_SECRET_LENGTH
            ),
            ConfigWarning::NonPositiveExpiration { millis } => write!(
                f,
                "JWT expiration is {}ms; tokens will expire immediately",
                millis
            ),
        }
    }
}

#[derive(Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expiration_millis: i64,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("expiration_millis", &self.expiration_millis)
            .finish()
    }
}

impl JwtConfig {
    pub fn new(secret: impl Into<String>, expiration_millis: i64) -> Self {
        Self {
            secret: secret.into(),
            expiration_millis,
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process
    /// environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = lookup("JWT_SECRET").ok_or(ConfigError::MissingSecret)?;

        let expiration_millis = match lookup("JWT_EXPIRATION_MS") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue {
                    key: "JWT_EXPIRATION_MS",
                    value: raw.clone(),
                })?,
            None => DEFAULT_EXPIRATION_MS,
        };

        Ok(Self {
            secret,
            expiration_millis,
        })
    }

    /// Non-fatal problems with this configuration.
    pub fn warnings(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.secret.len() < MIN_SECRET_LENGTH {
            warnings.push(ConfigWarning::ShortSecret {
                length: self.secret.len(),
            });
        }

        if self.expiration_millis <= 0 {
            warnings.push(ConfigWarning::NonPositiveExpiration {
                millis: self.expiration_millis,
            });
        }

        warnings
    }

    /// Rejects an empty secret and logs every warning.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.secret.trim().is_empty() {
            return Err(ConfigError::EmptySecret);
        }

        for warning in self.warnings() {
            warn!(%warning, "weak JWT configuration accepted");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_missing_secret_is_fatal() {
        let result = JwtConfig::from_lookup(lookup_from(&[]));
        assert_eq!(result.unwrap_err(), ConfigError::MissingSecret);
    }

    #[test]
    fn test_empty_secret_fails_validation() {
        let config = JwtConfig::from_lookup(lookup_from(&[("JWT_SECRET", "   ")])).unwrap();
        assert_eq!(config.validate().unwrap_err(), ConfigError::EmptySecret);
    }

    #[test]
    fn test_default_expiration() {
        let config = JwtConfig::from_lookup(lookup_from(&[(
            "JWT_SECRET",
            "0123456789abcdef0123456789abcdef",
        )]))
        .unwrap();

        assert_eq!(config.expiration_millis, DEFAULT_EXPIRATION_MS);
        assert!(config.warnings().is_empty());
    }

    #[test]
    fn test_unparseable_expiration() {
        let result = JwtConfig::from_lookup(lookup_from(&[
            ("JWT_SECRET", "secret"),
            ("JWT_EXPIRATION_MS", "soon"),
        ]));

        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue {
                key: "JWT_EXPIRATION_MS",
                ..
            })
        ));
    }

    #[test]
    fn test_short_secret_and_zero_expiry_only_warn() {
        let config = JwtConfig::new("short", 0);

        assert!(config.validate().is_ok());
        assert_eq!(
            config.warnings(),
            vec![
                ConfigWarning::ShortSecret { length: 5 },
                ConfigWarning::NonPositiveExpiration { millis: 0 },
            ]
        );
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = JwtConfig::new("super-secret-value", 1000);
        assert!(!format!("{:?}", config).contains("super-secret-value"));
    }
}
