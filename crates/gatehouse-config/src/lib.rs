//! # Gatehouse Config
//!
//! Configuration structures loaded from environment variables:
//!
//! - [`jwt`]: signing secret and token lifetime
//! - [`cors`]: allowed cross-origin callers
//! - [`server`]: listen addresses and the optional database URL
//!
//! # Example
//!
//! ```ignore
//! use gatehouse_config::{CorsConfig, JwtConfig, ServerConfig};
//!
//! let jwt_config = JwtConfig::from_env()?;
//! let cors_config = CorsConfig::from_env();
//! let server_config = ServerConfig::from_env()?;
//! ```

pub mod cors;
pub mod error;
pub mod jwt;
pub mod server;

pub use cors::CorsConfig;
pub use error::ConfigError;
pub use jwt::{ConfigWarning, JwtConfig};
pub use server::ServerConfig;
