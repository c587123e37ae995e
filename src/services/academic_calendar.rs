use std::collections::HashMap;

use sqlx::PgPool;
use time::Date;
use uuid::Uuid;

use crate::core::time::{format_date, primitive_now_utc};
use crate::db::models::{AcademicPeriod, AcademicWeek, AcademicYear};
use crate::repositories::{academic_periods, academic_weeks, academic_years};
use crate::services::errors::{codes, DomainError};

/// Inclusive calendar range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DateRange {
    pub(crate) start: Date,
    pub(crate) end: Date,
}

impl DateRange {
    /// Years and periods need `start < end`.
    pub(crate) fn strict(start: Date, end: Date) -> Result<Self, DomainError> {
        if start >= end {
            return Err(DomainError::validation("start_date must be before end_date"));
        }
        Ok(Self { start, end })
    }

    /// Weeks may be a single day.
    pub(crate) fn inclusive(start: Date, end: Date) -> Result<Self, DomainError> {
        if start > end {
            return Err(DomainError::validation("start_date must not be after end_date"));
        }
        Ok(Self { start, end })
    }

    pub(crate) fn overlaps(&self, other: &DateRange) -> bool {
        self.start <= other.end && self.end >= other.start
    }

    pub(crate) fn contains(&self, other: &DateRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", format_date(self.start), format_date(self.end))
    }
}

pub(crate) struct NewAcademicYear<'a> {
    pub(crate) name: &'a str,
    pub(crate) start_date: Date,
    pub(crate) end_date: Date,
    pub(crate) is_current: bool,
}

/// Creates a year unless it shares a name with, or overlaps, an existing one.
///
/// The check and the insert run under a table lock in one transaction, so two
/// colliding creators cannot both pass the check.
pub(crate) async fn create_year(
    pool: &PgPool,
    params: NewAcademicYear<'_>,
) -> Result<AcademicYear, DomainError> {
    let name = required_name(params.name)?;
    let range = DateRange::strict(params.start_date, params.end_date)?;

    let mut tx =
        pool.begin().await.map_err(|e| DomainError::store(e, "Failed to start transaction"))?;
    academic_years::lock_for_create(&mut *tx)
        .await
        .map_err(|e| DomainError::store(e, "Failed to lock academic years"))?;

    let conflict = academic_years::find_conflicting(&mut *tx, name, range.start, range.end)
        .await
        .map_err(|e| DomainError::store(e, "Failed to check academic years"))?;
    if let Some(existing) = conflict {
        return Err(collision(
            "Academic year",
            name,
            range,
            &existing.name,
            DateRange { start: existing.start_date, end: existing.end_date },
        ));
    }

    if params.is_current {
        academic_years::clear_current(&mut *tx)
            .await
            .map_err(|e| DomainError::store(e, "Failed to reset current academic year"))?;
    }

    let year = academic_years::create(
        &mut *tx,
        academic_years::CreateAcademicYear {
            id: &Uuid::new_v4().to_string(),
            name,
            start_date: range.start,
            end_date: range.end,
            is_current: params.is_current,
            created_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| DomainError::store(e, "Failed to create academic year"))?;

    tx.commit().await.map_err(|e| DomainError::store(e, "Failed to commit academic year"))?;

    tracing::info!(
        year_id = %year.id,
        name = %year.name,
        action = "academic_year_created",
        "Academic year created"
    );
    Ok(year)
}

pub(crate) struct NewAcademicPeriod<'a> {
    pub(crate) name: &'a str,
    pub(crate) order_num: i32,
    pub(crate) start_date: Date,
    pub(crate) end_date: Date,
    pub(crate) is_current: bool,
}

pub(crate) async fn create_period(
    pool: &PgPool,
    year_id: &str,
    params: NewAcademicPeriod<'_>,
) -> Result<AcademicPeriod, DomainError> {
    let name = required_name(params.name)?;
    let range = DateRange::strict(params.start_date, params.end_date)?;

    let mut tx =
        pool.begin().await.map_err(|e| DomainError::store(e, "Failed to start transaction"))?;
    let year = academic_years::find_by_id_for_update(&mut *tx, year_id)
        .await
        .map_err(|e| DomainError::store(e, "Failed to load academic year"))?
        .ok_or_else(|| {
            DomainError::not_found(codes::ACADEMIC_YEAR_NOT_FOUND, "Academic year not found")
        })?;

    let year_range = DateRange { start: year.start_date, end: year.end_date };
    if !year_range.contains(&range) {
        return Err(DomainError::validation(format!(
            "Period must lie within academic year {} ({year_range})",
            year.name
        )));
    }

    let conflict =
        academic_periods::find_conflicting(&mut *tx, &year.id, name, range.start, range.end)
            .await
            .map_err(|e| DomainError::store(e, "Failed to check academic periods"))?;
    if let Some(existing) = conflict {
        return Err(collision(
            "Academic period",
            name,
            range,
            &existing.name,
            DateRange { start: existing.start_date, end: existing.end_date },
        ));
    }

    if params.is_current {
        academic_periods::clear_current(&mut *tx, &year.id)
            .await
            .map_err(|e| DomainError::store(e, "Failed to reset current academic period"))?;
    }

    let period = academic_periods::create(
        &mut *tx,
        academic_periods::CreateAcademicPeriod {
            id: &Uuid::new_v4().to_string(),
            year_id: &year.id,
            name,
            order_num: params.order_num,
            start_date: range.start,
            end_date: range.end,
            is_current: params.is_current,
            created_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| DomainError::store(e, "Failed to create academic period"))?;

    tx.commit().await.map_err(|e| DomainError::store(e, "Failed to commit academic period"))?;

    tracing::info!(
        period_id = %period.id,
        year_id = %year.id,
        action = "academic_period_created",
        "Academic period created"
    );
    Ok(period)
}

pub(crate) struct NewAcademicWeek<'a> {
    pub(crate) week_num: i32,
    pub(crate) name: &'a str,
    pub(crate) start_date: Date,
    pub(crate) end_date: Date,
    pub(crate) is_holiday: bool,
    pub(crate) is_current: bool,
}

pub(crate) async fn create_week(
    pool: &PgPool,
    period_id: &str,
    params: NewAcademicWeek<'_>,
) -> Result<AcademicWeek, DomainError> {
    let name = required_name(params.name)?;
    let range = DateRange::inclusive(params.start_date, params.end_date)?;

    let mut tx =
        pool.begin().await.map_err(|e| DomainError::store(e, "Failed to start transaction"))?;
    let period = academic_periods::find_by_id_for_update(&mut *tx, period_id)
        .await
        .map_err(|e| DomainError::store(e, "Failed to load academic period"))?
        .ok_or_else(|| {
            DomainError::not_found(codes::ACADEMIC_PERIOD_NOT_FOUND, "Academic period not found")
        })?;

    let period_range = DateRange { start: period.start_date, end: period.end_date };
    if !period_range.contains(&range) {
        return Err(DomainError::validation(format!(
            "Week must lie within academic period {} ({period_range})",
            period.name
        )));
    }

    let conflict =
        academic_weeks::find_conflicting(&mut *tx, &period.id, name, range.start, range.end)
            .await
            .map_err(|e| DomainError::store(e, "Failed to check academic weeks"))?;
    if let Some(existing) = conflict {
        return Err(collision(
            "Academic week",
            name,
            range,
            &existing.name,
            DateRange { start: existing.start_date, end: existing.end_date },
        ));
    }

    if params.is_current {
        academic_weeks::clear_current(&mut *tx, &period.id)
            .await
            .map_err(|e| DomainError::store(e, "Failed to reset current academic week"))?;
    }

    let week = academic_weeks::create(
        &mut *tx,
        academic_weeks::CreateAcademicWeek {
            id: &Uuid::new_v4().to_string(),
            period_id: &period.id,
            week_num: params.week_num,
            name,
            start_date: range.start,
            end_date: range.end,
            is_holiday: params.is_holiday,
            is_current: params.is_current,
            created_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| DomainError::store(e, "Failed to create academic week"))?;

    tx.commit().await.map_err(|e| DomainError::store(e, "Failed to commit academic week"))?;

    tracing::info!(
        week_id = %week.id,
        period_id = %period.id,
        action = "academic_week_created",
        "Academic week created"
    );
    Ok(week)
}

pub(crate) async fn current_year(pool: &PgPool) -> Result<AcademicYear, DomainError> {
    academic_years::find_current(pool)
        .await
        .map_err(|e| DomainError::store(e, "Failed to load current academic year"))?
        .ok_or_else(|| {
            DomainError::not_found(
                codes::NO_CURRENT_ACADEMIC_YEAR_FOUND,
                "No current academic year found",
            )
        })
}

pub(crate) struct YearWithPeriods {
    pub(crate) year: AcademicYear,
    pub(crate) periods: Vec<AcademicPeriod>,
}

/// Years by start date, each with its periods in `order_num` order.
pub(crate) async fn list_years(pool: &PgPool) -> Result<Vec<YearWithPeriods>, DomainError> {
    let years = academic_years::list(pool)
        .await
        .map_err(|e| DomainError::store(e, "Failed to list academic years"))?;
    let year_ids = years.iter().map(|year| year.id.clone()).collect::<Vec<_>>();
    let periods = academic_periods::list_for_years(pool, &year_ids)
        .await
        .map_err(|e| DomainError::store(e, "Failed to list academic periods"))?;

    let mut by_year: HashMap<String, Vec<AcademicPeriod>> = HashMap::new();
    for period in periods {
        by_year.entry(period.year_id.clone()).or_default().push(period);
    }

    Ok(years
        .into_iter()
        .map(|year| {
            let periods = by_year.remove(&year.id).unwrap_or_default();
            YearWithPeriods { year, periods }
        })
        .collect())
}

fn required_name(value: &str) -> Result<&str, DomainError> {
    let name = value.trim();
    if name.is_empty() {
        return Err(DomainError::validation("name must not be empty"));
    }
    Ok(name)
}

/// Name clashes are reported ahead of date overlaps.
fn collision(
    entity: &str,
    requested_name: &str,
    requested: DateRange,
    existing_name: &str,
    existing: DateRange,
) -> DomainError {
    if existing_name == requested_name {
        DomainError::collision(format!("{entity} with name '{existing_name}' already exists"))
    } else if requested.overlaps(&existing) {
        DomainError::collision(format!("{entity} overlaps with '{existing_name}' ({existing})"))
    } else {
        DomainError::collision(format!("{entity} conflicts with '{existing_name}'"))
    }
}
