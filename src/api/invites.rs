use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use validator::Validate;

use crate::api::auth::issue_token;
use crate::api::errors::ApiError;
use crate::api::guards::CurrentAdmin;
use crate::api::pagination::{PageQuery, PaginatedResponse};
use crate::core::state::AppState;
use crate::schemas::auth::TokenResponse;
use crate::schemas::invite::{InviteAccept, InviteCreate, InviteInfoResponse, InviteResponse};
use crate::services::provisioning;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_invites).post(issue_invite))
        .route("/accept", post(accept_invite))
        .route("/token/:token", get(inspect_invite))
        .route("/:invite_id/resend", post(resend_invite))
}

async fn issue_invite(
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
    Json(payload): Json<InviteCreate>,
) -> Result<(StatusCode, Json<InviteResponse>), ApiError> {
    payload.validate()?;

    let invite = provisioning::issue_invite(
        &state,
        provisioning::IssueInvite {
            email: &payload.email,
            full_name: &payload.full_name,
            role: payload.role,
        },
    )
    .await?;

    tracing::info!(
        admin_id = %admin.id,
        invite_id = %invite.id,
        action = "invite_create",
        "Admin issued invite"
    );

    Ok((StatusCode::CREATED, Json(InviteResponse::from_db(invite))))
}

async fn list_invites(
    Query(page): Query<PageQuery>,
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
) -> Result<Json<PaginatedResponse<InviteResponse>>, ApiError> {
    let (skip, limit) = page.bounds();
    let (invites, total_count) = provisioning::list_invites(state.db(), skip, limit).await?;

    Ok(Json(PaginatedResponse {
        items: invites.into_iter().map(InviteResponse::from_db).collect(),
        total_count,
        skip,
        limit,
    }))
}

async fn resend_invite(
    Path(invite_id): Path<String>,
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
) -> Result<Json<InviteResponse>, ApiError> {
    let invite = provisioning::resend_invite(&state, &invite_id).await?;
    Ok(Json(InviteResponse::from_db(invite)))
}

async fn inspect_invite(
    Path(token): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<InviteInfoResponse>, ApiError> {
    let invite = provisioning::inspect_invite(state.db(), &token).await?;
    Ok(Json(InviteInfoResponse::from_db(invite)))
}

async fn accept_invite(
    State(state): State<AppState>,
    Json(payload): Json<InviteAccept>,
) -> Result<(StatusCode, Json<TokenResponse>), ApiError> {
    payload.validate()?;

    let account =
        provisioning::accept_invite(state.db(), &payload.token, &payload.password).await?;
    Ok((StatusCode::CREATED, Json(issue_token(&state, account)?)))
}
