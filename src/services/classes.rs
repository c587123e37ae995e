use sqlx::PgPool;
use uuid::Uuid;

use crate::core::time::primitive_now_utc;
use crate::db::models::{Class, StudentProfile};
use crate::repositories::{classes, profiles};
use crate::services::errors::{codes, is_unique_violation, DomainError};

const NAME_INDEX: &str = "classes_name_key";

pub(crate) async fn create_class(pool: &PgPool, name: &str) -> Result<Class, DomainError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DomainError::validation("name must not be empty"));
    }

    if classes::exists_by_name(pool, name)
        .await
        .map_err(|e| DomainError::store(e, "Failed to check class name"))?
    {
        return Err(class_exists());
    }

    let class = classes::create(pool, &Uuid::new_v4().to_string(), name, primitive_now_utc())
        .await
        .map_err(|e| {
            if is_unique_violation(&e, NAME_INDEX) {
                class_exists()
            } else {
                DomainError::store(e, "Failed to create class")
            }
        })?;

    tracing::info!(class_id = %class.id, action = "class_created", "Class created");
    Ok(class)
}

pub(crate) async fn get_class(
    pool: &PgPool,
    class_id: &str,
) -> Result<(Class, Vec<StudentProfile>), DomainError> {
    let class = require_class(pool, class_id).await?;
    let students = profiles::list_students_in_class(pool, &class.id)
        .await
        .map_err(|e| DomainError::store(e, "Failed to list class students"))?;
    Ok((class, students))
}

pub(crate) async fn list_classes(
    pool: &PgPool,
    skip: i64,
    limit: i64,
) -> Result<(Vec<Class>, i64), DomainError> {
    let items = classes::list(pool, skip, limit)
        .await
        .map_err(|e| DomainError::store(e, "Failed to list classes"))?;
    let total =
        classes::count(pool).await.map_err(|e| DomainError::store(e, "Failed to count classes"))?;
    Ok((items, total))
}

pub(crate) async fn require_class(
    executor: impl sqlx::PgExecutor<'_>,
    class_id: &str,
) -> Result<Class, DomainError> {
    classes::find_by_id(executor, class_id)
        .await
        .map_err(|e| DomainError::store(e, "Failed to load class"))?
        .ok_or_else(|| DomainError::not_found(codes::CLASS_NOT_FOUND, "Class not found"))
}

fn class_exists() -> DomainError {
    DomainError::conflict(codes::CLASS_ALREADY_EXISTS, "A class with this name already exists")
}
