use thiserror::Error;

/// Fatal configuration problems. Any of these aborts startup.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("JWT secret key (JWT_SECRET) must be set")]
    MissingSecret,

    #[error("JWT secret key (JWT_SECRET) must not be empty")]
    EmptySecret,

    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}
