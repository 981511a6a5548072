//! # Gatehouse Core
//!
//! Foundational types shared across the Gatehouse crates:
//!
//! - [`errors`]: [`AppError`] with HTTP response conversion
//! - [`password`]: bcrypt password hashing and verification

pub mod errors;
pub mod password;

pub use errors::AppError;
pub use password::{hash_password, hash_password_with_cost, verify_password};
