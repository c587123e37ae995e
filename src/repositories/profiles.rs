use crate::db::models::{StudentProfile, TeacherProfile};
use crate::db::types::UserRole;

const STUDENT_COLUMNS: &str = "\
    account_id, class_id, parent_phone, parent_email, parent_full_name, created_at, updated_at";

const TEACHER_COLUMNS: &str = "\
    account_id, class_id, degree, experience_years, bio, created_at, updated_at";

/// Role profile written alongside a new account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum NewProfile {
    Student {
        parent_phone: Option<String>,
        parent_email: Option<String>,
        parent_full_name: Option<String>,
    },
    Teacher {
        degree: Option<String>,
        experience_years: Option<i32>,
        bio: Option<String>,
    },
}

impl NewProfile {
    /// Empty profile for `role`; admins carry no profile.
    pub(crate) fn for_role(role: UserRole) -> Option<Self> {
        match role {
            UserRole::Student => Some(Self::Student {
                parent_phone: None,
                parent_email: None,
                parent_full_name: None,
            }),
            UserRole::Teacher => {
                Some(Self::Teacher { degree: None, experience_years: None, bio: None })
            }
            UserRole::Admin => None,
        }
    }
}

pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    account_id: &str,
    profile: &NewProfile,
    now: time::PrimitiveDateTime,
) -> Result<(), sqlx::Error> {
    match profile {
        NewProfile::Student { parent_phone, parent_email, parent_full_name } => {
            sqlx::query(
                "INSERT INTO student_profiles (
                    account_id, class_id, parent_phone, parent_email, parent_full_name,
                    created_at, updated_at
                 ) VALUES ($1, NULL, $2, $3, $4, $5, $5)",
            )
            .bind(account_id)
            .bind(parent_phone.as_deref())
            .bind(parent_email.as_deref())
            .bind(parent_full_name.as_deref())
            .bind(now)
            .execute(executor)
            .await?;
        }
        NewProfile::Teacher { degree, experience_years, bio } => {
            sqlx::query(
                "INSERT INTO teacher_profiles (
                    account_id, class_id, degree, experience_years, bio, created_at, updated_at
                 ) VALUES ($1, NULL, $2, $3, $4, $5, $5)",
            )
            .bind(account_id)
            .bind(degree.as_deref())
            .bind(*experience_years)
            .bind(bio.as_deref())
            .bind(now)
            .execute(executor)
            .await?;
        }
    }

    Ok(())
}

pub(crate) async fn find_student(
    executor: impl sqlx::PgExecutor<'_>,
    account_id: &str,
) -> Result<Option<StudentProfile>, sqlx::Error> {
    sqlx::query_as::<_, StudentProfile>(&format!(
        "SELECT {STUDENT_COLUMNS} FROM student_profiles WHERE account_id = $1"
    ))
    .bind(account_id)
    .fetch_optional(executor)
    .await
}

/// Locks the student row; every enrollment write for a student goes through here.
pub(crate) async fn find_student_for_update(
    executor: impl sqlx::PgExecutor<'_>,
    account_id: &str,
) -> Result<Option<StudentProfile>, sqlx::Error> {
    sqlx::query_as::<_, StudentProfile>(&format!(
        "SELECT {STUDENT_COLUMNS} FROM student_profiles WHERE account_id = $1 FOR UPDATE"
    ))
    .bind(account_id)
    .fetch_optional(executor)
    .await
}

pub(crate) async fn set_student_class(
    executor: impl sqlx::PgExecutor<'_>,
    account_id: &str,
    class_id: Option<&str>,
    now: time::PrimitiveDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE student_profiles SET class_id = $1, updated_at = $2 WHERE account_id = $3")
        .bind(class_id)
        .bind(now)
        .bind(account_id)
        .execute(executor)
        .await?;
    Ok(())
}

pub(crate) async fn list_students_in_class(
    executor: impl sqlx::PgExecutor<'_>,
    class_id: &str,
) -> Result<Vec<StudentProfile>, sqlx::Error> {
    sqlx::query_as::<_, StudentProfile>(&format!(
        "SELECT {STUDENT_COLUMNS} FROM student_profiles WHERE class_id = $1 ORDER BY account_id"
    ))
    .bind(class_id)
    .fetch_all(executor)
    .await
}

pub(crate) async fn find_teacher(
    executor: impl sqlx::PgExecutor<'_>,
    account_id: &str,
) -> Result<Option<TeacherProfile>, sqlx::Error> {
    sqlx::query_as::<_, TeacherProfile>(&format!(
        "SELECT {TEACHER_COLUMNS} FROM teacher_profiles WHERE account_id = $1"
    ))
    .bind(account_id)
    .fetch_optional(executor)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_follows_role() {
        assert!(matches!(
            NewProfile::for_role(UserRole::Student),
            Some(NewProfile::Student { parent_phone: None, .. })
        ));
        assert!(matches!(
            NewProfile::for_role(UserRole::Teacher),
            Some(NewProfile::Teacher { experience_years: None, .. })
        ));
        assert_eq!(NewProfile::for_role(UserRole::Admin), None);
    }
}
