use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::{CurrentAdmin, CurrentUser};
use crate::core::state::AppState;
use crate::schemas::user::{AccountCreate, UserDetailsResponse, UserResponse};
use crate::services::provisioning;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/me", get(me))
        .route("/", post(create_user))
        .route("/:user_id", get(get_user))
}

async fn me(
    CurrentUser(account): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<UserDetailsResponse>, ApiError> {
    let details = provisioning::account_details(state.db(), &account.id).await?;
    Ok(Json(UserDetailsResponse::from_details(details)))
}

async fn get_user(
    Path(user_id): Path<String>,
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
) -> Result<Json<UserDetailsResponse>, ApiError> {
    let details = provisioning::account_details(state.db(), &user_id).await?;
    Ok(Json(UserDetailsResponse::from_details(details)))
}

async fn create_user(
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
    Json(payload): Json<AccountCreate>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    payload.validate()?;

    let account = provisioning::create_account(
        state.db(),
        provisioning::CreateAccount {
            email: &payload.email,
            username: &payload.username,
            full_name: &payload.full_name,
            password: &payload.password,
            role: payload.role,
        },
    )
    .await?;

    tracing::info!(
        admin_id = %admin.id,
        account_id = %account.id,
        action = "user_create",
        "Admin created account"
    );

    Ok((StatusCode::CREATED, Json(UserResponse::from_db(account))))
}
