use uuid::Uuid;

use crate::db::models::EnrollmentRecord;
use crate::db::types::EnrollmentReason;
use crate::repositories::profiles;

const COLUMNS: &str = "\
    id, student_id, class_id, started_at, ended_at, reason, is_active, created_at";

pub(crate) async fn find_active(
    executor: impl sqlx::PgExecutor<'_>,
    student_id: &str,
) -> Result<Option<EnrollmentRecord>, sqlx::Error> {
    sqlx::query_as::<_, EnrollmentRecord>(&format!(
        "SELECT {COLUMNS} FROM enrollment_records WHERE student_id = $1 AND is_active"
    ))
    .bind(student_id)
    .fetch_optional(executor)
    .await
}

pub(crate) async fn list_for_student(
    executor: impl sqlx::PgExecutor<'_>,
    student_id: &str,
) -> Result<Vec<EnrollmentRecord>, sqlx::Error> {
    sqlx::query_as::<_, EnrollmentRecord>(&format!(
        "SELECT {COLUMNS}
         FROM enrollment_records
         WHERE student_id = $1
         ORDER BY started_at, created_at, is_active",
    ))
    .bind(student_id)
    .fetch_all(executor)
    .await
}

/// Closes the student's active record, if any, and opens a new one pointing at `class_id`.
///
/// Runs on the caller's transaction. The student row is locked first, so
/// concurrent writers for one student apply one after another; the partial
/// unique index on active records rejects anything that slips past.
pub(crate) async fn write_assign(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    student_id: &str,
    class_id: Option<&str>,
    reason: EnrollmentReason,
    now: time::PrimitiveDateTime,
) -> Result<EnrollmentRecord, sqlx::Error> {
    profiles::find_student_for_update(&mut **tx, student_id).await?;

    if let Some(active) = find_active(&mut **tx, student_id).await? {
        sqlx::query(
            "UPDATE enrollment_records
             SET ended_at = $1,
                 is_active = FALSE
             WHERE id = $2",
        )
        .bind(now)
        .bind(&active.id)
        .execute(&mut **tx)
        .await?;
    }

    sqlx::query_as::<_, EnrollmentRecord>(&format!(
        "INSERT INTO enrollment_records (
            id, student_id, class_id, started_at, ended_at, reason, is_active, created_at
         ) VALUES ($1,$2,$3,$4,NULL,$5,TRUE,$4)
         RETURNING {COLUMNS}",
    ))
    .bind(Uuid::new_v4().to_string())
    .bind(student_id)
    .bind(class_id)
    .bind(now)
    .bind(reason)
    .fetch_one(&mut **tx)
    .await
}
