use sqlx::PgPool;
use uuid::Uuid;

use crate::core::metrics;
use crate::core::time::primitive_now_utc;
use crate::db::models::{ClassTransferRecord, EnrollmentRecord};
use crate::db::types::EnrollmentReason;
use crate::repositories::{class_transfers, enrollments, profiles};
use crate::services::classes::require_class;
use crate::services::errors::{codes, DomainError};

/// Puts the listed students into `class_id`.
///
/// Unknown ids and students already in the class are skipped. Returns the ids
/// that actually moved, in lock order.
pub(crate) async fn assign_students(
    pool: &PgPool,
    class_id: &str,
    student_ids: &[String],
) -> Result<Vec<String>, DomainError> {
    let mut tx =
        pool.begin().await.map_err(|e| DomainError::store(e, "Failed to start transaction"))?;
    require_class(&mut *tx, class_id).await?;
    let now = primitive_now_utc();

    let mut changed = Vec::new();
    for student_id in lock_order(student_ids) {
        let profile = profiles::find_student_for_update(&mut *tx, &student_id)
            .await
            .map_err(|e| DomainError::store(e, "Failed to lock student"))?;
        let Some(profile) = profile else {
            tracing::debug!(student_id = %student_id, "Skipping unknown student");
            continue;
        };
        if profile.class_id.as_deref() == Some(class_id) {
            continue;
        }

        profiles::set_student_class(&mut *tx, &student_id, Some(class_id), now)
            .await
            .map_err(|e| DomainError::store(e, "Failed to update student class"))?;
        enrollments::write_assign(
            &mut tx,
            &student_id,
            Some(class_id),
            EnrollmentReason::Admission,
            now,
        )
        .await
        .map_err(|e| DomainError::store(e, "Failed to record enrollment"))?;
        changed.push(student_id);
    }

    tx.commit().await.map_err(|e| DomainError::store(e, "Failed to commit enrollment"))?;

    metrics::enrollment_changed(EnrollmentReason::Admission.as_str(), changed.len());
    tracing::info!(
        class_id,
        changed = changed.len(),
        action = "students_assigned",
        "Students assigned to class"
    );
    Ok(changed)
}

/// Removes the listed students from `class_id`; students elsewhere are untouched.
pub(crate) async fn unassign_students(
    pool: &PgPool,
    class_id: &str,
    student_ids: &[String],
) -> Result<Vec<String>, DomainError> {
    let mut tx =
        pool.begin().await.map_err(|e| DomainError::store(e, "Failed to start transaction"))?;
    require_class(&mut *tx, class_id).await?;
    let now = primitive_now_utc();

    let mut changed = Vec::new();
    for student_id in lock_order(student_ids) {
        let profile = profiles::find_student_for_update(&mut *tx, &student_id)
            .await
            .map_err(|e| DomainError::store(e, "Failed to lock student"))?;
        let Some(profile) = profile else {
            continue;
        };
        if profile.class_id.as_deref() != Some(class_id) {
            continue;
        }

        profiles::set_student_class(&mut *tx, &student_id, None, now)
            .await
            .map_err(|e| DomainError::store(e, "Failed to update student class"))?;
        enrollments::write_assign(&mut tx, &student_id, None, EnrollmentReason::Transfer, now)
            .await
            .map_err(|e| DomainError::store(e, "Failed to record enrollment"))?;
        changed.push(student_id);
    }

    tx.commit().await.map_err(|e| DomainError::store(e, "Failed to commit enrollment"))?;

    metrics::enrollment_changed(EnrollmentReason::Transfer.as_str(), changed.len());
    tracing::info!(
        class_id,
        changed = changed.len(),
        action = "students_unassigned",
        "Students removed from class"
    );
    Ok(changed)
}

/// Moves one student to `target_class_id` (`None` leaves them unassigned).
pub(crate) async fn move_student(
    pool: &PgPool,
    student_id: &str,
    target_class_id: Option<&str>,
    reason: EnrollmentReason,
) -> Result<EnrollmentRecord, DomainError> {
    let mut tx =
        pool.begin().await.map_err(|e| DomainError::store(e, "Failed to start transaction"))?;
    if let Some(class_id) = target_class_id {
        require_class(&mut *tx, class_id).await?;
    }

    let profile = profiles::find_student_for_update(&mut *tx, student_id)
        .await
        .map_err(|e| DomainError::store(e, "Failed to lock student"))?
        .ok_or_else(student_not_found)?;
    if profile.class_id.as_deref() == target_class_id {
        return Err(DomainError::conflict(
            codes::STUDENT_ALREADY_IN_CLASS,
            "Student is already in this class",
        ));
    }

    let now = primitive_now_utc();
    profiles::set_student_class(&mut *tx, student_id, target_class_id, now)
        .await
        .map_err(|e| DomainError::store(e, "Failed to update student class"))?;
    let record = enrollments::write_assign(&mut tx, student_id, target_class_id, reason, now)
        .await
        .map_err(|e| DomainError::store(e, "Failed to record enrollment"))?;

    tx.commit().await.map_err(|e| DomainError::store(e, "Failed to commit enrollment"))?;

    metrics::enrollment_changed(reason.as_str(), 1);
    tracing::info!(
        student_id,
        class_id = target_class_id.unwrap_or("none"),
        reason = reason.as_str(),
        action = "student_moved",
        "Student moved"
    );
    Ok(record)
}

pub(crate) async fn history(
    pool: &PgPool,
    student_id: &str,
) -> Result<Vec<EnrollmentRecord>, DomainError> {
    profiles::find_student(pool, student_id)
        .await
        .map_err(|e| DomainError::store(e, "Failed to load student"))?
        .ok_or_else(student_not_found)?;

    enrollments::list_for_student(pool, student_id)
        .await
        .map_err(|e| DomainError::store(e, "Failed to load enrollment history"))
}

/// Appends a promotion audit entry. No student records change.
pub(crate) async fn record_promotion(
    pool: &PgPool,
    from_class_id: &str,
    to_class_id: &str,
    promotion_date: time::Date,
) -> Result<ClassTransferRecord, DomainError> {
    if from_class_id == to_class_id {
        return Err(DomainError::validation("Source and target class must differ"));
    }
    require_class(pool, from_class_id).await?;
    require_class(pool, to_class_id).await?;

    let record = class_transfers::create(
        pool,
        class_transfers::CreateTransfer {
            id: &Uuid::new_v4().to_string(),
            from_class_id,
            to_class_id,
            promotion_date,
            created_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| DomainError::store(e, "Failed to record promotion"))?;

    tracing::info!(
        from_class_id,
        to_class_id,
        action = "class_promoted",
        "Class promotion recorded"
    );
    Ok(record)
}

pub(crate) async fn list_promotions(
    pool: &PgPool,
    class_id: &str,
) -> Result<Vec<ClassTransferRecord>, DomainError> {
    require_class(pool, class_id).await?;
    class_transfers::list_for_class(pool, class_id)
        .await
        .map_err(|e| DomainError::store(e, "Failed to list promotions"))
}

/// Sorted, de-duplicated ids so concurrent batches lock rows in the same order.
fn lock_order(student_ids: &[String]) -> Vec<String> {
    let mut ids = student_ids.to_vec();
    ids.sort();
    ids.dedup();
    ids
}

fn student_not_found() -> DomainError {
    DomainError::not_found(codes::STUDENT_NOT_FOUND, "Student not found")
}

#[cfg(test)]
mod tests;
