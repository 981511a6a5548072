//! Public account operations: login, registration and password reset.

pub mod controller;
pub mod model;
pub mod router;
pub mod service;
