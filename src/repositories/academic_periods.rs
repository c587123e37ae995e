use time::Date;

use crate::db::models::AcademicPeriod;

const COLUMNS: &str = "\
    id, year_id, name, order_num, start_date, end_date, is_current, created_at";

pub(crate) async fn find_conflicting(
    executor: impl sqlx::PgExecutor<'_>,
    year_id: &str,
    name: &str,
    start_date: Date,
    end_date: Date,
) -> Result<Option<AcademicPeriod>, sqlx::Error> {
    sqlx::query_as::<_, AcademicPeriod>(&format!(
        "SELECT {COLUMNS}
         FROM academic_periods
         WHERE year_id = $1
           AND (name = $2 OR (start_date <= $4 AND end_date >= $3))
         ORDER BY (name = $2) DESC, start_date
         LIMIT 1",
    ))
    .bind(year_id)
    .bind(name)
    .bind(start_date)
    .bind(end_date)
    .fetch_optional(executor)
    .await
}

pub(crate) async fn clear_current(
    executor: impl sqlx::PgExecutor<'_>,
    year_id: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE academic_periods SET is_current = FALSE WHERE year_id = $1 AND is_current")
        .bind(year_id)
        .execute(executor)
        .await?;
    Ok(())
}

pub(crate) struct CreateAcademicPeriod<'a> {
    pub(crate) id: &'a str,
    pub(crate) year_id: &'a str,
    pub(crate) name: &'a str,
    pub(crate) order_num: i32,
    pub(crate) start_date: Date,
    pub(crate) end_date: Date,
    pub(crate) is_current: bool,
    pub(crate) created_at: time::PrimitiveDateTime,
}

pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    params: CreateAcademicPeriod<'_>,
) -> Result<AcademicPeriod, sqlx::Error> {
    sqlx::query_as::<_, AcademicPeriod>(&format!(
        "INSERT INTO academic_periods (
            id, year_id, name, order_num, start_date, end_date, is_current, created_at
         ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8)
         RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.year_id)
    .bind(params.name)
    .bind(params.order_num)
    .bind(params.start_date)
    .bind(params.end_date)
    .bind(params.is_current)
    .bind(params.created_at)
    .fetch_one(executor)
    .await
}

pub(crate) async fn find_by_id_for_update(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
) -> Result<Option<AcademicPeriod>, sqlx::Error> {
    sqlx::query_as::<_, AcademicPeriod>(&format!(
        "SELECT {COLUMNS} FROM academic_periods WHERE id = $1 FOR UPDATE"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await
}

/// Periods of the given years, ordered for grouping by year.
pub(crate) async fn list_for_years(
    executor: impl sqlx::PgExecutor<'_>,
    year_ids: &[String],
) -> Result<Vec<AcademicPeriod>, sqlx::Error> {
    sqlx::query_as::<_, AcademicPeriod>(&format!(
        "SELECT {COLUMNS}
         FROM academic_periods
         WHERE year_id = ANY($1)
         ORDER BY year_id, order_num, start_date",
    ))
    .bind(year_ids)
    .fetch_all(executor)
    .await
}
