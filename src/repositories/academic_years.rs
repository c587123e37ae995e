use time::Date;

use crate::db::models::AcademicYear;

const COLUMNS: &str = "id, name, start_date, end_date, is_current, created_at";

/// Serialises year creation: concurrent creators wait here until the holder
/// commits, so the conflict check below always sees every committed year.
pub(crate) async fn lock_for_create(
    executor: impl sqlx::PgExecutor<'_>,
) -> Result<(), sqlx::Error> {
    sqlx::query("LOCK TABLE academic_years IN SHARE ROW EXCLUSIVE MODE")
        .execute(executor)
        .await?;
    Ok(())
}

/// A year sharing `name` or overlapping the inclusive range; name clashes first.
pub(crate) async fn find_conflicting(
    executor: impl sqlx::PgExecutor<'_>,
    name: &str,
    start_date: Date,
    end_date: Date,
) -> Result<Option<AcademicYear>, sqlx::Error> {
    sqlx::query_as::<_, AcademicYear>(&format!(
        "SELECT {COLUMNS}
         FROM academic_years
         WHERE name = $1
            OR (start_date <= $3 AND end_date >= $2)
         ORDER BY (name = $1) DESC, start_date
         LIMIT 1",
    ))
    .bind(name)
    .bind(start_date)
    .bind(end_date)
    .fetch_optional(executor)
    .await
}

pub(crate) async fn clear_current(executor: impl sqlx::PgExecutor<'_>) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE academic_years SET is_current = FALSE WHERE is_current")
        .execute(executor)
        .await?;
    Ok(())
}

pub(crate) struct CreateAcademicYear<'a> {
    pub(crate) id: &'a str,
    pub(crate) name: &'a str,
    pub(crate) start_date: Date,
    pub(crate) end_date: Date,
    pub(crate) is_current: bool,
    pub(crate) created_at: time::PrimitiveDateTime,
}

pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    params: CreateAcademicYear<'_>,
) -> Result<AcademicYear, sqlx::Error> {
    sqlx::query_as::<_, AcademicYear>(&format!(
        "INSERT INTO academic_years (id, name, start_date, end_date, is_current, created_at)
         VALUES ($1,$2,$3,$4,$5,$6)
         RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.name)
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
) -> Result<Option<AcademicYear>, sqlx::Error> {
    sqlx::query_as::<_, AcademicYear>(&format!(
        "SELECT {COLUMNS} FROM academic_years WHERE id = $1 FOR UPDATE"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub(crate) async fn find_current(
    executor: impl sqlx::PgExecutor<'_>,
) -> Result<Option<AcademicYear>, sqlx::Error> {
    sqlx::query_as::<_, AcademicYear>(&format!(
        "SELECT {COLUMNS} FROM academic_years WHERE is_current ORDER BY start_date DESC LIMIT 1"
    ))
    .fetch_optional(executor)
    .await
}

pub(crate) async fn list(
    executor: impl sqlx::PgExecutor<'_>,
) -> Result<Vec<AcademicYear>, sqlx::Error> {
    sqlx::query_as::<_, AcademicYear>(&format!(
        "SELECT {COLUMNS} FROM academic_years ORDER BY start_date"
    ))
    .fetch_all(executor)
    .await
}
