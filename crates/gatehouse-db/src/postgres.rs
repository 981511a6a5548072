//! PostgreSQL-backed credential store.
//!
//! Reads and writes the `users` table created by `migrations/`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::error;

use gatehouse_auth::{
    CredentialStore, CredentialStoreError, HAS_PAID_APPLICATION_FEE, Identity, Role, UserId,
};

use crate::account::{Account, AccountStore, NewAccount};

const USER_COLUMNS: &str = "id, username, password, role, has_paid_application_fee, created_at";

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    password: String,
    role: String,
    has_paid_application_fee: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for Account {
    type Error = CredentialStoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role: Role = row.role.parse().map_err(|_| {
            CredentialStoreError::CorruptRecord(format!(
                "user {} has unknown role {:?}",
                row.id, row.role
            ))
        })?;

        let identity = Identity::new(row.id, row.username, row.password, role)
            .with_flag(HAS_PAID_APPLICATION_FEE, row.has_paid_application_fee);

        Ok(Account {
            identity,
            created_at: row.created_at,
        })
    }
}

fn store_error(context: &str, err: sqlx::Error) -> CredentialStoreError {
    error!(error = %err, "{}", context);
    CredentialStoreError::Unavailable(format!("{}: {}", context, err))
}

#[derive(Debug, Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_by_login_name(
        &self,
        login_name: &str,
    ) -> Result<Option<Identity>, CredentialStoreError> {
        let sql = format!("SELECT {} FROM users WHERE username = $1", USER_COLUMNS);
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(login_name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| store_error("Failed to fetch user by username", e))?;

        Ok(row.map(Account::try_from).transpose()?.map(|a| a.identity))
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<Identity>, CredentialStoreError> {
        Ok(self.find_account(id).await?.map(|a| a.identity))
    }
}

#[async_trait]
impl AccountStore for PgCredentialStore {
    async fn create(&self, account: NewAccount) -> Result<Account, CredentialStoreError> {
        let sql = format!(
            "INSERT INTO users (username, password, role) VALUES ($1, $2, $3) RETURNING {}",
            USER_COLUMNS
        );

        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(&account.login_name)
            .bind(&account.password_hash)
            .bind(account.role.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                    CredentialStoreError::DuplicateLoginName(account.login_name.clone())
                }
                other => store_error("Failed to insert user", other),
            })?;

        Account::try_from(row)
    }

    async fn find_account(&self, id: UserId) -> Result<Option<Account>, CredentialStoreError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| store_error("Failed to fetch user by ID", e))?;

        row.map(Account::try_from).transpose()
    }

    async fn list(&self) -> Result<Vec<Account>, CredentialStoreError> {
        let sql = format!("SELECT {} FROM users ORDER BY id", USER_COLUMNS);
        let rows = sqlx::query_as::<_, UserRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| store_error("Failed to fetch users", e))?;

        rows.into_iter().map(Account::try_from).collect()
    }

    async fn update_password(
        &self,
        login_name: &str,
        password_hash: &str,
    ) -> Result<bool, CredentialStoreError> {
        let result = sqlx::query("UPDATE users SET password = $1 WHERE username = $2")
            .bind(password_hash)
            .bind(login_name)
            .execute(&self.pool)
            .await
            .map_err(|e| store_error("Failed to update password", e))?;

        Ok(result.rows_affected() > 0)
    }
}
