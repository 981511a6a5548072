//! # Gatehouse DB
//!
//! Credential store adapters for the Gatehouse API.
//!
//! - [`PgCredentialStore`]: PostgreSQL via SQLx, using the `users` table
//! - [`InMemoryCredentialStore`]: process-local, for tests and runs without
//!   a database
//!
//! Both implement [`gatehouse_auth::CredentialStore`] for authentication and
//! [`AccountStore`] for registration and administration.
//!
//! # Example
//!
//! ```ignore
//! use gatehouse_db::{PgCredentialStore, init_db_pool, run_migrations};
//!
//! let pool = init_db_pool(&database_url).await?;
//! run_migrations(&pool).await?;
//! let store = PgCredentialStore::new(pool);
//! ```

pub mod account;
pub mod memory;
pub mod postgres;

pub use account::{Account, AccountStore, NewAccount};
pub use memory::InMemoryCredentialStore;
pub use postgres::PgCredentialStore;

// Re-export PgPool for convenience
pub use sqlx::PgPool;

/// Opens a PostgreSQL connection pool.
pub async fn init_db_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    sqlx::postgres::PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
}

/// Applies the schema migrations shipped in `migrations/`.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../migrations").run(pool).await
}
