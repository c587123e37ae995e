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
use crate::schemas::academic::{
    AcademicPeriodCreate, AcademicPeriodResponse, AcademicWeekCreate, AcademicWeekResponse,
    AcademicYearCreate, AcademicYearDetailResponse, AcademicYearResponse,
};
use crate::services::academic_calendar;

pub(crate) fn years_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_years).post(create_year))
        .route("/current", get(current_year))
        .route("/:year_id/periods", post(create_period))
}

pub(crate) fn periods_router() -> Router<AppState> {
    Router::new().route("/:period_id/weeks", post(create_week))
}

async fn create_year(
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
    Json(payload): Json<AcademicYearCreate>,
) -> Result<(StatusCode, Json<AcademicYearResponse>), ApiError> {
    payload.validate()?;

    let year = academic_calendar::create_year(
        state.db(),
        academic_calendar::NewAcademicYear {
            name: &payload.name,
            start_date: payload.start_date,
            end_date: payload.end_date,
            is_current: payload.is_current,
        },
    )
    .await?;

    tracing::debug!(admin_id = %admin.id, year_id = %year.id, "Academic year request handled");
    Ok((StatusCode::CREATED, Json(AcademicYearResponse::from_db(year))))
}

async fn list_years(
    CurrentUser(_account): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<AcademicYearDetailResponse>>, ApiError> {
    let years = academic_calendar::list_years(state.db()).await?;
    Ok(Json(years.into_iter().map(AcademicYearDetailResponse::from_service).collect()))
}

async fn current_year(
    CurrentUser(_account): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<AcademicYearResponse>, ApiError> {
    let year = academic_calendar::current_year(state.db()).await?;
    Ok(Json(AcademicYearResponse::from_db(year)))
}

async fn create_period(
    Path(year_id): Path<String>,
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
    Json(payload): Json<AcademicPeriodCreate>,
) -> Result<(StatusCode, Json<AcademicPeriodResponse>), ApiError> {
    payload.validate()?;

    let period = academic_calendar::create_period(
        state.db(),
        &year_id,
        academic_calendar::NewAcademicPeriod {
            name: &payload.name,
            order_num: payload.order_num,
            start_date: payload.start_date,
            end_date: payload.end_date,
            is_current: payload.is_current,
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(AcademicPeriodResponse::from_db(period))))
}

async fn create_week(
    Path(period_id): Path<String>,
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
    Json(payload): Json<AcademicWeekCreate>,
) -> Result<(StatusCode, Json<AcademicWeekResponse>), ApiError> {
    payload.validate()?;

    let week = academic_calendar::create_week(
        state.db(),
        &period_id,
        academic_calendar::NewAcademicWeek {
            week_num: payload.week_num,
            name: &payload.name,
            start_date: payload.start_date,
            end_date: payload.end_date,
            is_holiday: payload.is_holiday,
            is_current: payload.is_current,
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(AcademicWeekResponse::from_db(week))))
}

#[cfg(test)]
mod tests;
