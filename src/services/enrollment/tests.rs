use time::macros::date;

use super::*;
use crate::services::errors::ErrorKind;
use crate::test_support;

async fn active_count(pool: &PgPool, student_id: &str) -> i64 {
    sqlx::query_scalar(
        "SELECT COUNT(*) FROM enrollment_records WHERE student_id = $1 AND is_active",
    )
    .bind(student_id)
    .fetch_one(pool)
    .await
    .expect("count")
}

#[test]
fn lock_order_sorts_and_dedups() {
    let ids = vec!["b".to_string(), "a".to_string(), "b".to_string(), "c".to_string()];
    assert_eq!(lock_order(&ids), vec!["a", "b", "c"]);
}

#[tokio::test]
async fn assign_then_unassign_keeps_history() {
    let Some(ctx) = test_support::setup_test_context().await else { return };
    let class = test_support::insert_class(ctx.db(), "5A").await;
    let s1 = test_support::insert_student(ctx.db(), "STUDENTONE").await;
    let s2 = test_support::insert_student(ctx.db(), "STUDENTTWO").await;

    let changed = assign_students(ctx.db(), &class.id, &[s1.id.clone(), s2.id.clone()])
        .await
        .expect("assign");
    assert_eq!(changed.len(), 2);

    let changed = unassign_students(ctx.db(), &class.id, &[s2.id.clone()]).await.expect("unassign");
    assert_eq!(changed, vec![s2.id.clone()]);

    let s1_history = history(ctx.db(), &s1.id).await.expect("s1 history");
    assert_eq!(s1_history.len(), 1);
    assert!(s1_history[0].is_active);
    assert_eq!(s1_history[0].class_id.as_deref(), Some(class.id.as_str()));
    assert_eq!(s1_history[0].reason, EnrollmentReason::Admission);

    let s2_history = history(ctx.db(), &s2.id).await.expect("s2 history");
    assert_eq!(s2_history.len(), 2);
    assert!(!s2_history[0].is_active);
    assert!(s2_history[0].ended_at.is_some());
    assert_eq!(s2_history[0].class_id.as_deref(), Some(class.id.as_str()));
    assert!(s2_history[1].is_active);
    assert_eq!(s2_history[1].class_id, None);
    assert_eq!(s2_history[1].reason, EnrollmentReason::Transfer);

    let s2_profile =
        profiles::find_student(ctx.db(), &s2.id).await.expect("load").expect("profile");
    assert!(s2_profile.class_id.is_none());
}

#[tokio::test]
async fn assigning_to_current_class_is_a_no_op() {
    let Some(ctx) = test_support::setup_test_context().await else { return };
    let class = test_support::insert_class(ctx.db(), "6B").await;
    let student = test_support::insert_student(ctx.db(), "NOOPSTUDENT").await;

    assign_students(ctx.db(), &class.id, &[student.id.clone()]).await.expect("first assign");
    let changed = assign_students(ctx.db(), &class.id, &[student.id.clone(), student.id.clone()])
        .await
        .expect("second assign");

    assert!(changed.is_empty());
    assert_eq!(history(ctx.db(), &student.id).await.expect("history").len(), 1);
}

#[tokio::test]
async fn unknown_students_are_skipped_and_unknown_class_fails() {
    let Some(ctx) = test_support::setup_test_context().await else { return };
    let class = test_support::insert_class(ctx.db(), "7C").await;
    let teacher = test_support::insert_account(
        ctx.db(),
        "teacher@school.test",
        "TEACHER",
        crate::db::types::UserRole::Teacher,
    )
    .await;

    let changed = assign_students(ctx.db(), &class.id, &["missing".to_string(), teacher.id])
        .await
        .expect("assign");
    assert!(changed.is_empty());

    let err = assign_students(ctx.db(), "no-such-class", &[]).await.expect_err("missing class");
    assert_eq!(err.code(), codes::CLASS_NOT_FOUND);
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn unassign_ignores_students_of_other_classes() {
    let Some(ctx) = test_support::setup_test_context().await else { return };
    let class_a = test_support::insert_class(ctx.db(), "8A").await;
    let class_b = test_support::insert_class(ctx.db(), "8B").await;
    let student = test_support::insert_student(ctx.db(), "OTHERCLASS").await;

    assign_students(ctx.db(), &class_a.id, &[student.id.clone()]).await.expect("assign");
    let changed =
        unassign_students(ctx.db(), &class_b.id, &[student.id.clone()]).await.expect("unassign");

    assert!(changed.is_empty());
    let profile =
        profiles::find_student(ctx.db(), &student.id).await.expect("load").expect("profile");
    assert_eq!(profile.class_id.as_deref(), Some(class_a.id.as_str()));
}

#[tokio::test]
async fn move_student_records_reason_and_rejects_same_class() {
    let Some(ctx) = test_support::setup_test_context().await else { return };
    let class_a = test_support::insert_class(ctx.db(), "9A").await;
    let class_b = test_support::insert_class(ctx.db(), "9B").await;
    let student = test_support::insert_student(ctx.db(), "MOVER").await;

    move_student(ctx.db(), &student.id, Some(&class_a.id), EnrollmentReason::Admission)
        .await
        .expect("admit");
    let record = move_student(ctx.db(), &student.id, Some(&class_b.id), EnrollmentReason::Transfer)
        .await
        .expect("transfer");
    assert!(record.is_active);
    assert_eq!(record.reason, EnrollmentReason::Transfer);

    let err = move_student(ctx.db(), &student.id, Some(&class_b.id), EnrollmentReason::Return)
        .await
        .expect_err("same class");
    assert_eq!(err.code(), codes::STUDENT_ALREADY_IN_CLASS);

    let err = move_student(ctx.db(), "ghost", None, EnrollmentReason::Transfer)
        .await
        .expect_err("missing student");
    assert_eq!(err.code(), codes::STUDENT_NOT_FOUND);

    let records = history(ctx.db(), &student.id).await.expect("history");
    assert_eq!(records.len(), 2);
    assert_eq!(active_count(ctx.db(), &student.id).await, 1);
}

#[tokio::test]
async fn concurrent_moves_leave_one_active_record() {
    let Some(ctx) = test_support::setup_test_context().await else { return };
    let student = test_support::insert_student(ctx.db(), "CONTENDED").await;
    let mut class_ids = Vec::new();
    for name in ["10A", "10B", "10C", "10D", "10E", "10F"] {
        class_ids.push(test_support::insert_class(ctx.db(), name).await.id);
    }

    let handles = class_ids
        .into_iter()
        .map(|class_id| {
            let pool = ctx.db().clone();
            let student_id = student.id.clone();
            tokio::spawn(async move {
                move_student(&pool, &student_id, Some(&class_id), EnrollmentReason::Transfer).await
            })
        })
        .collect::<Vec<_>>();

    for handle in handles {
        handle.await.expect("join").expect("move");
    }

    assert_eq!(active_count(ctx.db(), &student.id).await, 1);
    let records = history(ctx.db(), &student.id).await.expect("history");
    assert_eq!(records.len(), 6);

    let profile =
        profiles::find_student(ctx.db(), &student.id).await.expect("load").expect("profile");
    let active = enrollments::find_active(ctx.db(), &student.id)
        .await
        .expect("load")
        .expect("active record");
    assert_eq!(profile.class_id, active.class_id);
}

#[tokio::test]
async fn promotions_are_appended_and_listed() {
    let Some(ctx) = test_support::setup_test_context().await else { return };
    let from = test_support::insert_class(ctx.db(), "4A").await;
    let to = test_support::insert_class(ctx.db(), "5A").await;

    let record = record_promotion(ctx.db(), &from.id, &to.id, date!(2025 - 06 - 01))
        .await
        .expect("promotion");
    assert_eq!(record.promotion_date, date!(2025 - 06 - 01));

    let err = record_promotion(ctx.db(), &from.id, &from.id, date!(2025 - 06 - 01))
        .await
        .expect_err("same class");
    assert_eq!(err.kind(), ErrorKind::Validation);

    let err = record_promotion(ctx.db(), &from.id, "missing", date!(2025 - 06 - 01))
        .await
        .expect_err("missing class");
    assert_eq!(err.code(), codes::CLASS_NOT_FOUND);

    assert_eq!(list_promotions(ctx.db(), &from.id).await.expect("from").len(), 1);
    assert_eq!(list_promotions(ctx.db(), &to.id).await.expect("to").len(), 1);
}
