use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::core::security;
use crate::core::state::AppState;
use crate::db::models::Account;
use crate::schemas::auth::{LoginRequest, TokenResponse};
use crate::schemas::user::UserResponse;
use crate::services::provisioning;

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/login", post(login)).route("/me", get(me))
}

async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    payload.validate()?;

    let account = provisioning::authenticate(state.db(), &payload.login, &payload.password).await?;
    tracing::info!(account_id = %account.id, action = "login", "Account logged in");

    Ok(Json(issue_token(&state, account)?))
}

async fn me(CurrentUser(account): CurrentUser) -> Json<UserResponse> {
    Json(UserResponse::from_db(account))
}

/// Session token for a freshly authenticated or provisioned account.
pub(crate) fn issue_token(state: &AppState, account: Account) -> Result<TokenResponse, ApiError> {
    let token = security::create_access_token(&account.id, state.settings(), None)
        .map_err(|e| ApiError::internal(e, "Failed to create access token"))?;

    Ok(TokenResponse {
        access_token: token,
        token_type: "bearer".to_string(),
        user: UserResponse::from_db(account),
    })
}

#[cfg(test)]
mod tests;
