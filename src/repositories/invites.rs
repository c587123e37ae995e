use uuid::Uuid;

use crate::db::models::Invite;
use crate::db::types::UserRole;

const COLUMNS: &str = "\
    id, email, full_name, role, token, expires_at, used_at, is_sent, created_at";

/// Opaque acceptance token.
pub(crate) fn new_token() -> String {
    Uuid::new_v4().to_string()
}

pub(crate) struct CreateInvite<'a> {
    pub(crate) id: &'a str,
    pub(crate) email: &'a str,
    pub(crate) full_name: &'a str,
    pub(crate) role: UserRole,
    pub(crate) token: &'a str,
    pub(crate) expires_at: time::PrimitiveDateTime,
    pub(crate) created_at: time::PrimitiveDateTime,
}

pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    params: CreateInvite<'_>,
) -> Result<Invite, sqlx::Error> {
    sqlx::query_as::<_, Invite>(&format!(
        "INSERT INTO invites (
            id, email, full_name, role, token, expires_at, used_at, is_sent, created_at
         ) VALUES ($1,$2,$3,$4,$5,$6,NULL,FALSE,$7)
         RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.email)
    .bind(params.full_name)
    .bind(params.role)
    .bind(params.token)
    .bind(params.expires_at)
    .bind(params.created_at)
    .fetch_one(executor)
    .await
}

pub(crate) async fn find_by_id(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
) -> Result<Option<Invite>, sqlx::Error> {
    sqlx::query_as::<_, Invite>(&format!("SELECT {COLUMNS} FROM invites WHERE id = $1"))
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub(crate) async fn find_by_token(
    executor: impl sqlx::PgExecutor<'_>,
    token: &str,
) -> Result<Option<Invite>, sqlx::Error> {
    sqlx::query_as::<_, Invite>(&format!("SELECT {COLUMNS} FROM invites WHERE token = $1"))
        .bind(token)
        .fetch_optional(executor)
        .await
}

/// Row-locking lookup; concurrent acceptances of one token queue here.
pub(crate) async fn find_by_token_for_update(
    executor: impl sqlx::PgExecutor<'_>,
    token: &str,
) -> Result<Option<Invite>, sqlx::Error> {
    sqlx::query_as::<_, Invite>(&format!(
        "SELECT {COLUMNS} FROM invites WHERE token = $1 FOR UPDATE"
    ))
    .bind(token)
    .fetch_optional(executor)
    .await
}

pub(crate) async fn find_latest_by_email(
    executor: impl sqlx::PgExecutor<'_>,
    email: &str,
) -> Result<Option<Invite>, sqlx::Error> {
    sqlx::query_as::<_, Invite>(&format!(
        "SELECT {COLUMNS}
         FROM invites
         WHERE email = $1
         ORDER BY created_at DESC
         LIMIT 1",
    ))
    .bind(email)
    .fetch_optional(executor)
    .await
}

pub(crate) async fn mark_sent(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE invites SET is_sent = TRUE WHERE id = $1")
        .bind(id)
        .execute(executor)
        .await?;
    Ok(())
}

/// Consumes the invite. Returns `false` when it was already used.
pub(crate) async fn mark_used(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
    used_at: time::PrimitiveDateTime,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE invites SET used_at = $1 WHERE id = $2 AND used_at IS NULL")
        .bind(used_at)
        .bind(id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected() == 1)
}

pub(crate) async fn list(
    executor: impl sqlx::PgExecutor<'_>,
    skip: i64,
    limit: i64,
) -> Result<Vec<Invite>, sqlx::Error> {
    sqlx::query_as::<_, Invite>(&format!(
        "SELECT {COLUMNS}
         FROM invites
         ORDER BY created_at DESC, id
         OFFSET $1 LIMIT $2",
    ))
    .bind(skip)
    .bind(limit)
    .fetch_all(executor)
    .await
}

pub(crate) async fn count(executor: impl sqlx::PgExecutor<'_>) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM invites").fetch_one(executor).await
}
