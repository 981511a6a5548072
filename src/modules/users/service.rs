use anyhow::anyhow;
use tracing::instrument;

use gatehouse_auth::{AuthenticatedContext, UserId, decide_owned};
use gatehouse_core::AppError;
use gatehouse_observability::track_authorization_check;

use crate::middleware::rules;
use crate::state::AppState;

use super::model::{CurrentUserResponse, UserResponse};

pub struct UserService;

impl UserService {
    pub fn current_user(ctx: &AuthenticatedContext) -> CurrentUserResponse {
        CurrentUserResponse {
            user: UserResponse::from(&ctx.identity),
            authorities: ctx.authorities.to_claim_values(),
            token_expires_at: ctx.token_expires_at,
        }
    }

    #[instrument(skip(state))]
    pub async fn get_users(state: &AppState) -> Result<Vec<UserResponse>, AppError> {
        let accounts = state.accounts.list().await?;
        Ok(accounts.into_iter().map(UserResponse::from).collect())
    }

    #[instrument(skip(state))]
    pub async fn get_user(state: &AppState, id: UserId) -> Result<UserResponse, AppError> {
        state
            .accounts
            .find_account(id)
            .await?
            .map(UserResponse::from)
            .ok_or_else(|| AppError::not_found(anyhow!("User not found")))
    }

    /// Staff may read any profile; everyone else only their own.
    #[instrument(skip(state, ctx), fields(user_id = ctx.user_id()))]
    pub async fn get_profile(
        state: &AppState,
        ctx: &AuthenticatedContext,
        id: UserId,
    ) -> Result<UserResponse, AppError> {
        let rule = rules::USERS_PROFILE;
        let decision = decide_owned(ctx, &rule.requirement, move || async move {
            state
                .accounts
                .find_account(id)
                .await
                .map(|account| account.map(|a| a.identity.id))
        })
        .await;

        track_authorization_check(decision.is_allowed(), rule.operation);
        decision.into_result()?;

        Self::get_user(state, id).await
    }
}
