use sqlx::PgPool;
use uuid::Uuid;

use crate::core::metrics;
use crate::core::security;
use crate::core::state::AppState;
use crate::core::time::{format_primitive, primitive_now_utc};
use crate::db::models::{Account, Invite, InviteStatus, StudentProfile, TeacherProfile};
use crate::db::types::UserRole;
use crate::repositories::{accounts, invites, profiles, profiles::NewProfile};
use crate::services::errors::{codes, is_unique_violation, DomainError, ErrorKind};
use crate::services::usernames::derive_username;

const MIN_PASSWORD_LEN: usize = 8;
const USERNAME_ATTEMPTS: usize = 5;
const EMAIL_INDEX: &str = "accounts_email_key";
const USERNAME_INDEX: &str = "accounts_username_key";
const UNCONSUMED_INVITE_INDEX: &str = "invites_one_unconsumed_per_email";

pub(crate) struct IssueInvite<'a> {
    pub(crate) email: &'a str,
    pub(crate) full_name: &'a str,
    pub(crate) role: UserRole,
}

/// Persists a new invite and mails its link.
///
/// The invite row survives a delivery failure with `is_sent = false`; the
/// caller still gets `INVITE_DELIVERY_FAILED` and can retry via resend.
pub(crate) async fn issue_invite(
    state: &AppState,
    params: IssueInvite<'_>,
) -> Result<Invite, DomainError> {
    let email = normalize_email(params.email)?;
    let full_name = required_text(params.full_name, "full_name")?;
    let pool = state.db();

    if accounts::exists_by_email(pool, &email)
        .await
        .map_err(|e| DomainError::store(e, "Failed to check existing account"))?
    {
        return Err(DomainError::conflict(
            codes::EMAIL_ALREADY_REGISTERED,
            "An account with this email already exists",
        ));
    }

    let now = primitive_now_utc();
    let latest = invites::find_latest_by_email(pool, &email)
        .await
        .map_err(|e| DomainError::store(e, "Failed to check existing invites"))?;
    if latest.is_some_and(|invite| !invite.is_used()) {
        return Err(email_already_invited());
    }

    let invite_id = Uuid::new_v4().to_string();
    let token = invites::new_token();
    let invite = invites::create(
        pool,
        invites::CreateInvite {
            id: &invite_id,
            email: &email,
            full_name,
            role: params.role,
            token: &token,
            expires_at: now + state.settings().invite().ttl(),
            created_at: now,
        },
    )
    .await
    .map_err(|e| {
        if is_unique_violation(&e, UNCONSUMED_INVITE_INDEX) {
            return email_already_invited();
        }
        DomainError::store(e, "Failed to create invite")
    })?;

    metrics::invite_issued(invite.role.as_str());
    tracing::info!(
        invite_id = %invite.id,
        role = invite.role.as_str(),
        action = "invite_issued",
        "Invite created"
    );

    deliver(state, invite).await
}

/// Re-attempts delivery of a pending invite.
pub(crate) async fn resend_invite(
    state: &AppState,
    invite_id: &str,
) -> Result<Invite, DomainError> {
    let invite = invites::find_by_id(state.db(), invite_id)
        .await
        .map_err(|e| DomainError::store(e, "Failed to load invite"))?
        .ok_or_else(invite_not_found)?;

    ensure_pending(&invite, primitive_now_utc())?;
    deliver(state, invite).await
}

/// Validity check used by the acceptance page before a password is chosen.
pub(crate) async fn inspect_invite(pool: &PgPool, token: &str) -> Result<Invite, DomainError> {
    let invite = invites::find_by_token(pool, token)
        .await
        .map_err(|e| DomainError::store(e, "Failed to load invite"))?
        .ok_or_else(invite_not_found)?;

    ensure_pending(&invite, primitive_now_utc())?;
    Ok(invite)
}

pub(crate) async fn list_invites(
    pool: &PgPool,
    skip: i64,
    limit: i64,
) -> Result<(Vec<Invite>, i64), DomainError> {
    let items = invites::list(pool, skip, limit)
        .await
        .map_err(|e| DomainError::store(e, "Failed to list invites"))?;
    let total =
        invites::count(pool).await.map_err(|e| DomainError::store(e, "Failed to count invites"))?;
    Ok((items, total))
}

/// Consumes the invite and creates the account with its role profile.
///
/// Everything happens in one transaction holding the invite row lock, so a
/// second acceptance of the same token waits and then sees it used.
pub(crate) async fn accept_invite(
    pool: &PgPool,
    token: &str,
    password: &str,
) -> Result<Account, DomainError> {
    if password.is_empty() {
        return Err(DomainError::validation("password must not be empty"));
    }
    let hashed_password = security::hash_password(password).map_err(|e| {
        DomainError::internal(e, codes::INVITE_ACCEPT_FAILED, "Failed to hash password")
    })?;

    let mut tx = pool.begin().await.map_err(accept_failed)?;
    let now = primitive_now_utc();

    let invite = invites::find_by_token_for_update(&mut *tx, token)
        .await
        .map_err(accept_failed)?
        .ok_or_else(invite_not_found)?;
    ensure_pending(&invite, now)?;

    if accounts::exists_by_email(&mut *tx, &invite.email).await.map_err(accept_failed)? {
        return Err(user_already_exists());
    }

    let account =
        insert_with_generated_username(&mut tx, &invite, &hashed_password, now).await?;

    if !invites::mark_used(&mut *tx, &invite.id, now).await.map_err(accept_failed)? {
        return Err(invite_already_used());
    }

    if let Some(profile) = NewProfile::for_role(invite.role) {
        profiles::create(&mut *tx, &account.id, &profile, now).await.map_err(accept_failed)?;
    }

    tx.commit().await.map_err(accept_failed)?;

    metrics::invite_accepted(account.role.as_str());
    tracing::info!(
        invite_id = %invite.id,
        account_id = %account.id,
        action = "invite_accepted",
        "Invite accepted"
    );

    Ok(account)
}

pub(crate) struct CreateAccount<'a> {
    pub(crate) email: &'a str,
    pub(crate) username: &'a str,
    pub(crate) full_name: &'a str,
    pub(crate) password: &'a str,
    pub(crate) role: UserRole,
}

/// Admin-driven account creation; writes the role profile in the same transaction.
pub(crate) async fn create_account(
    pool: &PgPool,
    params: CreateAccount<'_>,
) -> Result<Account, DomainError> {
    let email = normalize_email(params.email)?;
    let username = required_text(params.username, "username")?;
    let full_name = required_text(params.full_name, "full_name")?;
    validate_password(params.password)?;

    if accounts::exists_by_email(pool, &email)
        .await
        .map_err(|e| DomainError::store(e, "Failed to check existing account"))?
    {
        return Err(email_already_registered());
    }
    if accounts::exists_by_username(pool, username)
        .await
        .map_err(|e| DomainError::store(e, "Failed to check existing account"))?
    {
        return Err(username_taken());
    }

    let hashed_password = security::hash_password(params.password)
        .map_err(|e| DomainError::internal(e, codes::INTERNAL_ERROR, "Failed to hash password"))?;
    let now = primitive_now_utc();
    let account_id = Uuid::new_v4().to_string();

    let mut tx =
        pool.begin().await.map_err(|e| DomainError::store(e, "Failed to start transaction"))?;

    let account = accounts::create(
        &mut *tx,
        accounts::CreateAccount {
            id: &account_id,
            email: &email,
            username,
            hashed_password: &hashed_password,
            full_name,
            role: params.role,
            is_active: true,
            now,
        },
    )
    .await
    .map_err(|e| {
        if is_unique_violation(&e, EMAIL_INDEX) {
            email_already_registered()
        } else if is_unique_violation(&e, USERNAME_INDEX) {
            username_taken()
        } else {
            DomainError::store(e, "Failed to create account")
        }
    })?;

    if let Some(profile) = NewProfile::for_role(account.role) {
        profiles::create(&mut *tx, &account.id, &profile, now)
            .await
            .map_err(|e| DomainError::store(e, "Failed to create profile"))?;
    }

    tx.commit().await.map_err(|e| DomainError::store(e, "Failed to commit account"))?;

    tracing::info!(
        account_id = %account.id,
        role = account.role.as_str(),
        action = "account_created",
        "Account created"
    );
    Ok(account)
}

/// Password login by username or email.
pub(crate) async fn authenticate(
    pool: &PgPool,
    login: &str,
    password: &str,
) -> Result<Account, DomainError> {
    let account = accounts::find_by_login(pool, login.trim())
        .await
        .map_err(|e| DomainError::store(e, "Failed to load account"))?
        .ok_or_else(invalid_credentials)?;

    let verified = security::verify_password(password, &account.hashed_password)
        .map_err(|e| DomainError::internal(e, codes::INTERNAL_ERROR, "Failed to verify password"))?;
    if !verified {
        return Err(invalid_credentials());
    }

    if !account.is_active {
        return Err(DomainError::new(
            ErrorKind::Validation,
            codes::INACTIVE_ACCOUNT,
            "Account is inactive",
        ));
    }

    Ok(account)
}

pub(crate) struct AccountDetails {
    pub(crate) account: Account,
    pub(crate) student: Option<StudentProfile>,
    pub(crate) teacher: Option<TeacherProfile>,
}

pub(crate) async fn account_details(
    pool: &PgPool,
    account_id: &str,
) -> Result<AccountDetails, DomainError> {
    let account = accounts::find_by_id(pool, account_id)
        .await
        .map_err(|e| DomainError::store(e, "Failed to load account"))?
        .ok_or_else(|| DomainError::not_found(codes::USER_NOT_FOUND, "User not found"))?;

    let (student, teacher) = match account.role {
        UserRole::Student => (
            profiles::find_student(pool, &account.id)
                .await
                .map_err(|e| DomainError::store(e, "Failed to load student profile"))?,
            None,
        ),
        UserRole::Teacher => (
            None,
            profiles::find_teacher(pool, &account.id)
                .await
                .map_err(|e| DomainError::store(e, "Failed to load teacher profile"))?,
        ),
        UserRole::Admin => (None, None),
    };

    Ok(AccountDetails { account, student, teacher })
}

async fn deliver(state: &AppState, mut invite: Invite) -> Result<Invite, DomainError> {
    let settings = state.settings();
    let link = settings.mail().invite_link(&invite.token);
    let subject = format!("Invitation to {}", settings.api().project_name);
    let body = format!(
        "Hello {},\n\nYou have been invited to join {} as a {}.\n\n\
         Set your password and activate your account here:\n{}\n\n\
         The link expires at {}.\n",
        invite.full_name,
        settings.api().project_name,
        invite.role.as_str(),
        link,
        format_primitive(invite.expires_at),
    );

    if let Err(err) = state.mailer().send(&invite.email, &subject, &body).await {
        metrics::invite_delivery_failed();
        tracing::warn!(
            invite_id = %invite.id,
            error = %err,
            action = "invite_delivery_failed",
            "Invite could not be delivered"
        );
        return Err(DomainError::dependency(
            codes::INVITE_DELIVERY_FAILED,
            "Invite was saved but the email could not be sent",
        ));
    }

    invites::mark_sent(state.db(), &invite.id)
        .await
        .map_err(|e| DomainError::store(e, "Failed to mark invite as sent"))?;
    invite.is_sent = true;

    tracing::info!(invite_id = %invite.id, action = "invite_sent", "Invite delivered");
    Ok(invite)
}

async fn insert_with_generated_username(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    invite: &Invite,
    hashed_password: &str,
    now: time::PrimitiveDateTime,
) -> Result<Account, DomainError> {
    let account_id = Uuid::new_v4().to_string();

    for _ in 0..USERNAME_ATTEMPTS {
        let username = derive_username(&invite.full_name);
        let inserted = accounts::create_if_username_free(
            &mut **tx,
            accounts::CreateAccount {
                id: &account_id,
                email: &invite.email,
                username: &username,
                hashed_password,
                full_name: &invite.full_name,
                role: invite.role,
                is_active: true,
                now,
            },
        )
        .await
        .map_err(accept_failed)?;

        if let Some(account) = inserted {
            return Ok(account);
        }
        tracing::debug!(
            invite_id = %invite.id,
            username = %username,
            "Generated username taken; retrying"
        );
    }

    Err(DomainError::new(
        ErrorKind::Internal,
        codes::USERNAME_GENERATION_FAILED,
        "Could not generate a unique username",
    ))
}

fn ensure_pending(invite: &Invite, now: time::PrimitiveDateTime) -> Result<(), DomainError> {
    match invite.status(now) {
        InviteStatus::Pending => Ok(()),
        InviteStatus::Used => Err(invite_already_used()),
        InviteStatus::Expired => {
            Err(DomainError::conflict(codes::INVITE_EXPIRED, "Invite has expired"))
        }
    }
}

fn normalize_email(value: &str) -> Result<String, DomainError> {
    let email = value.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(DomainError::validation("email must be a valid address"));
    }
    Ok(email)
}

fn required_text<'a>(value: &'a str, field: &str) -> Result<&'a str, DomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(format!("{field} must not be empty")));
    }
    Ok(trimmed)
}

fn validate_password(password: &str) -> Result<(), DomainError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(DomainError::validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

fn accept_failed(err: sqlx::Error) -> DomainError {
    if is_unique_violation(&err, EMAIL_INDEX) {
        return user_already_exists();
    }
    DomainError::internal(err, codes::INVITE_ACCEPT_FAILED, "Failed to accept invite")
}

fn email_already_invited() -> DomainError {
    DomainError::conflict(
        codes::EMAIL_ALREADY_INVITED,
        "An unconsumed invite for this email already exists",
    )
}

fn invite_not_found() -> DomainError {
    DomainError::not_found(codes::INVITE_NOT_FOUND, "Invite not found")
}

fn invite_already_used() -> DomainError {
    DomainError::conflict(codes::INVITE_ALREADY_USED, "Invite has already been used")
}

fn user_already_exists() -> DomainError {
    DomainError::conflict(codes::USER_ALREADY_EXISTS, "An account with this email already exists")
}

fn email_already_registered() -> DomainError {
    DomainError::conflict(
        codes::EMAIL_ALREADY_REGISTERED,
        "An account with this email already exists",
    )
}

fn username_taken() -> DomainError {
    DomainError::conflict(codes::USERNAME_TAKEN, "Username is already taken")
}

fn invalid_credentials() -> DomainError {
    DomainError::unauthorized(codes::INVALID_CREDENTIALS, "Incorrect username or password")
}
