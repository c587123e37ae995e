use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentAdmin;
use crate::api::pagination::{PageQuery, PaginatedResponse};
use crate::core::state::AppState;
use crate::schemas::class::{
    ChangedStudentsResponse, ClassCreate, ClassDetailResponse, ClassResponse, PromotionCreate,
    PromotionResponse, StudentIdsRequest,
};
use crate::services::{classes, enrollment};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_classes).post(create_class))
        .route("/:class_id", get(get_class))
        .route("/:class_id/students", post(assign_students))
        .route("/:class_id/students/remove", post(unassign_students))
        .route("/:class_id/promotions", get(list_promotions).post(record_promotion))
}

async fn create_class(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
    Json(payload): Json<ClassCreate>,
) -> Result<(StatusCode, Json<ClassResponse>), ApiError> {
    payload.validate()?;
    let class = classes::create_class(state.db(), &payload.name).await?;
    Ok((StatusCode::CREATED, Json(ClassResponse::from_db(class))))
}

async fn list_classes(
    Query(page): Query<PageQuery>,
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
) -> Result<Json<PaginatedResponse<ClassResponse>>, ApiError> {
    let (skip, limit) = page.bounds();
    let (items, total_count) = classes::list_classes(state.db(), skip, limit).await?;

    Ok(Json(PaginatedResponse {
        items: items.into_iter().map(ClassResponse::from_db).collect(),
        total_count,
        skip,
        limit,
    }))
}

async fn get_class(
    Path(class_id): Path<String>,
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
) -> Result<Json<ClassDetailResponse>, ApiError> {
    let (class, students) = classes::get_class(state.db(), &class_id).await?;
    Ok(Json(ClassDetailResponse::from_db(class, students)))
}

async fn assign_students(
    Path(class_id): Path<String>,
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
    Json(payload): Json<StudentIdsRequest>,
) -> Result<Json<ChangedStudentsResponse>, ApiError> {
    payload.validate()?;
    let changed = enrollment::assign_students(state.db(), &class_id, &payload.student_ids).await?;

    tracing::debug!(admin_id = %admin.id, class_id = %class_id, "Assignment request handled");
    Ok(Json(ChangedStudentsResponse { class_id, changed }))
}

async fn unassign_students(
    Path(class_id): Path<String>,
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
    Json(payload): Json<StudentIdsRequest>,
) -> Result<Json<ChangedStudentsResponse>, ApiError> {
    payload.validate()?;
    let changed =
        enrollment::unassign_students(state.db(), &class_id, &payload.student_ids).await?;

    tracing::debug!(admin_id = %admin.id, class_id = %class_id, "Removal request handled");
    Ok(Json(ChangedStudentsResponse { class_id, changed }))
}

async fn record_promotion(
    Path(class_id): Path<String>,
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
    Json(payload): Json<PromotionCreate>,
) -> Result<(StatusCode, Json<PromotionResponse>), ApiError> {
    payload.validate()?;
    let record = enrollment::record_promotion(
        state.db(),
        &class_id,
        &payload.to_class_id,
        payload.promotion_date,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(PromotionResponse::from_db(record))))
}

async fn list_promotions(
    Path(class_id): Path<String>,
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<PromotionResponse>>, ApiError> {
    let records = enrollment::list_promotions(state.db(), &class_id).await?;
    Ok(Json(records.into_iter().map(PromotionResponse::from_db).collect()))
}

#[cfg(test)]
mod tests;
