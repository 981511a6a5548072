use anyhow::anyhow;
use tracing::{info, instrument, warn};

use gatehouse_auth::{AuthError, Role};
use gatehouse_core::{AppError, hash_password};
use gatehouse_db::NewAccount;
use gatehouse_observability::{
    track_jwt_issued, track_login_failure, track_login_success, track_user_registered,
};

use crate::modules::users::model::UserResponse;
use crate::state::AppState;

use super::model::{LoginRequest, LoginResponse, RegisterRequest, ResetPasswordRequest};

pub struct AuthService;

impl AuthService {
    /// Verifies the credentials and issues a token for the account.
    ///
    /// An unknown username and a wrong password produce the same error.
    #[instrument(skip(state, dto), fields(username = %dto.username))]
    pub async fn login(state: &AppState, dto: LoginRequest) -> Result<LoginResponse, AppError> {
        let identity = match state
            .resolver
            .authenticate_credentials(&dto.username, &dto.password)
            .await
        {
            Ok(Some(identity)) => identity,
            Ok(None) => {
                warn!("Login failed: invalid credentials");
                track_login_failure("invalid_credentials");
                return Err(AppError::unauthorized("Invalid credentials"));
            }
            Err(e) => {
                track_login_failure("store_unavailable");
                return Err(e.into());
            }
        };

        let token = state.codec.issue_for(&identity).map_err(AuthError::from)?;

        track_jwt_issued();
        track_login_success(identity.role.as_str());
        info!(user_id = identity.id, role = %identity.role, "User logged in");

        Ok(LoginResponse {
            token: token.value,
            user: UserResponse::from(&identity),
        })
    }

    /// Creates a student account.
    #[instrument(skip(state, dto), fields(username = %dto.username))]
    pub async fn register(state: &AppState, dto: RegisterRequest) -> Result<UserResponse, AppError> {
        let password_hash = hash_password(&dto.password)?;

        let account = state
            .accounts
            .create(NewAccount {
                login_name: dto.username,
                password_hash,
                role: Role::Student,
            })
            .await?;

        track_user_registered(account.identity.role.as_str());
        info!(user_id = account.identity.id, "User registered");

        Ok(UserResponse::from(account))
    }

    #[instrument(skip(state, dto), fields(username = %dto.username))]
    pub async fn reset_password(state: &AppState, dto: ResetPasswordRequest) -> Result<(), AppError> {
        let password_hash = hash_password(&dto.new_password)?;

        let updated = state
            .accounts
            .update_password(&dto.username, &password_hash)
            .await?;

        if !updated {
            return Err(AppError::not_found(anyhow!("User not found.")));
        }

        info!("Password reset");
        Ok(())
    }

    /// Records a reset-link request. Delivery is not implemented; the outcome
    /// is only logged, and the caller learns nothing about the account.
    #[instrument(skip(state))]
    pub async fn request_password_reset(state: &AppState, username: &str) -> Result<(), AppError> {
        match state.resolver.find_by_login_name(username).await? {
            Some(identity) => info!(user_id = identity.id, "Password reset link requested"),
            None => info!("Password reset link requested for unknown username"),
        }
        Ok(())
    }
}
