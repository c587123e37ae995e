use time::Date;

use crate::db::models::AcademicWeek;

const COLUMNS: &str = "\
    id, period_id, week_num, name, start_date, end_date, is_holiday, is_current, created_at";

pub(crate) async fn find_conflicting(
    executor: impl sqlx::PgExecutor<'_>,
    period_id: &str,
    name: &str,
    start_date: Date,
    end_date: Date,
) -> Result<Option<AcademicWeek>, sqlx::Error> {
    sqlx::query_as::<_, AcademicWeek>(&format!(
        "SELECT {COLUMNS}
         FROM academic_weeks
         WHERE period_id = $1
           AND (name = $2 OR (start_date <= $4 AND end_date >= $3))
         ORDER BY (name = $2) DESC, start_date
         LIMIT 1",
    ))
    .bind(period_id)
    .bind(name)
    .bind(start_date)
    .bind(end_date)
    .fetch_optional(executor)
    .await
}

pub(crate) async fn clear_current(
    executor: impl sqlx::PgExecutor<'_>,
    period_id: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE academic_weeks SET is_current = FALSE WHERE period_id = $1 AND is_current")
        .bind(period_id)
        .execute(executor)
        .await?;
    Ok(())
}

pub(crate) struct CreateAcademicWeek<'a> {
    pub(crate) id: &'a str,
    pub(crate) period_id: &'a str,
    pub(crate) week_num: i32,
    pub(crate) name: &'a str,
    pub(crate) start_date: Date,
    pub(crate) end_date: Date,
    pub(crate) is_holiday: bool,
    pub(crate) is_current: bool,
    pub(crate) created_at: time::PrimitiveDateTime,
}

pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    params: CreateAcademicWeek<'_>,
) -> Result<AcademicWeek, sqlx::Error> {
    sqlx::query_as::<_, AcademicWeek>(&format!(
        "INSERT INTO academic_weeks (
            id, period_id, week_num, name, start_date, end_date, is_holiday, is_current, created_at
         ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9)
         RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.period_id)
    .bind(params.week_num)
    .bind(params.name)
    .bind(params.start_date)
    .bind(params.end_date)
    .bind(params.is_holiday)
    .bind(params.is_current)
    .bind(params.created_at)
    .fetch_one(executor)
    .await
}
