use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};

use crate::api::errors::ApiError;
use crate::api::guards::CurrentAdmin;
use crate::core::state::AppState;
use crate::schemas::class::{EnrollmentRecordResponse, StudentMoveRequest};
use crate::services::enrollment;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/:student_id/enrollment", post(move_student))
        .route("/:student_id/enrollments", get(enrollment_history))
}

async fn move_student(
    Path(student_id): Path<String>,
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
    Json(payload): Json<StudentMoveRequest>,
) -> Result<Json<EnrollmentRecordResponse>, ApiError> {
    let record = enrollment::move_student(
        state.db(),
        &student_id,
        payload.class_id.as_deref(),
        payload.reason,
    )
    .await?;
    Ok(Json(EnrollmentRecordResponse::from_db(record)))
}

async fn enrollment_history(
    Path(student_id): Path<String>,
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<EnrollmentRecordResponse>>, ApiError> {
    let records = enrollment::history(state.db(), &student_id).await?;
    Ok(Json(records.into_iter().map(EnrollmentRecordResponse::from_db).collect()))
}
