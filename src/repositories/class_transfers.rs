use crate::db::models::ClassTransferRecord;

const COLUMNS: &str = "id, from_class_id, to_class_id, promotion_date, created_at";

pub(crate) struct CreateTransfer<'a> {
    pub(crate) id: &'a str,
    pub(crate) from_class_id: &'a str,
    pub(crate) to_class_id: &'a str,
    pub(crate) promotion_date: time::Date,
    pub(crate) created_at: time::PrimitiveDateTime,
}

/// Append-only: the table has no update or delete path.
pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    params: CreateTransfer<'_>,
) -> Result<ClassTransferRecord, sqlx::Error> {
    sqlx::query_as::<_, ClassTransferRecord>(&format!(
        "INSERT INTO class_transfer_records (
            id, from_class_id, to_class_id, promotion_date, created_at
         ) VALUES ($1,$2,$3,$4,$5)
         RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.from_class_id)
    .bind(params.to_class_id)
    .bind(params.promotion_date)
    .bind(params.created_at)
    .fetch_one(executor)
    .await
}

/// Promotions touching `class_id` in either direction, newest first.
pub(crate) async fn list_for_class(
    executor: impl sqlx::PgExecutor<'_>,
    class_id: &str,
) -> Result<Vec<ClassTransferRecord>, sqlx::Error> {
    sqlx::query_as::<_, ClassTransferRecord>(&format!(
        "SELECT {COLUMNS}
         FROM class_transfer_records
         WHERE from_class_id = $1 OR to_class_id = $1
         ORDER BY promotion_date DESC, created_at DESC",
    ))
    .bind(class_id)
    .fetch_all(executor)
    .await
}
