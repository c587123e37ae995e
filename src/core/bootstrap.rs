use uuid::Uuid;

use crate::core::security;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::types::UserRole;
use crate::repositories::accounts;

/// Creates the configured administrator, or repairs it when its password,
/// role or active flag drifted from the configuration.
pub(crate) async fn ensure_superuser(state: &AppState) -> anyhow::Result<()> {
    let admin = state.settings().admin();
    if admin.first_superuser_password.is_empty() {
        tracing::warn!("FIRST_SUPERUSER_PASSWORD not configured; skipping superuser creation");
        return Ok(());
    }

    let email = admin.first_superuser_email.trim().to_lowercase();
    let now = primitive_now_utc();

    if let Some(account) = accounts::find_by_email(state.db(), &email).await? {
        let verified =
            security::verify_password(&admin.first_superuser_password, &account.hashed_password)
                .unwrap_or(false);

        let update = accounts::UpdateAccount {
            hashed_password: if verified {
                None
            } else {
                Some(security::hash_password(&admin.first_superuser_password)?)
            },
            role: (account.role != UserRole::Admin).then_some(UserRole::Admin),
            is_active: (!account.is_active).then_some(true),
            updated_at: now,
        };

        if update.hashed_password.is_some() || update.role.is_some() || update.is_active.is_some()
        {
            accounts::update(state.db(), &account.id, update).await?;
            tracing::info!(account_id = %account.id, "Updated default superuser");
        } else {
            tracing::info!("Default superuser already up to date");
        }

        return Ok(());
    }

    let hashed_password = security::hash_password(&admin.first_superuser_password)?;
    let account = accounts::create(
        state.db(),
        accounts::CreateAccount {
            id: &Uuid::new_v4().to_string(),
            email: &email,
            username: &admin.first_superuser_username,
            hashed_password: &hashed_password,
            full_name: "Super Admin",
            role: UserRole::Admin,
            is_active: true,
            now,
        },
    )
    .await?;

    tracing::info!(account_id = %account.id, email = %email, "Created default superuser");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::Settings;
    use crate::test_support;

    fn state_with_superuser(ctx: &test_support::TestContext, password: &str) -> AppState {
        std::env::set_var("FIRST_SUPERUSER_EMAIL", "Root@School.test");
        std::env::set_var("FIRST_SUPERUSER_USERNAME", "root");
        std::env::set_var("FIRST_SUPERUSER_PASSWORD", password);
        let settings = Settings::load().expect("settings");
        std::env::remove_var("FIRST_SUPERUSER_EMAIL");
        std::env::remove_var("FIRST_SUPERUSER_USERNAME");
        std::env::remove_var("FIRST_SUPERUSER_PASSWORD");
        AppState::new(settings, ctx.db().clone(), ctx.mailer.clone())
    }

    #[tokio::test]
    async fn creates_then_repairs_superuser() {
        let Some(ctx) = test_support::setup_test_context().await else { return };

        let state = state_with_superuser(&ctx, "first-password");
        ensure_superuser(&state).await.expect("create");

        let account = accounts::find_by_email(ctx.db(), "root@school.test")
            .await
            .expect("load")
            .expect("superuser");
        assert_eq!(account.role, UserRole::Admin);
        assert_eq!(account.username, "root");

        accounts::update(
            ctx.db(),
            &account.id,
            accounts::UpdateAccount {
                hashed_password: None,
                role: Some(UserRole::Teacher),
                is_active: Some(false),
                updated_at: primitive_now_utc(),
            },
        )
        .await
        .expect("demote");

        let state = state_with_superuser(&ctx, "second-password");
        ensure_superuser(&state).await.expect("repair");

        let repaired =
            accounts::find_by_id(ctx.db(), &account.id).await.expect("load").expect("superuser");
        assert_eq!(repaired.role, UserRole::Admin);
        assert!(repaired.is_active);
        assert!(security::verify_password("second-password", &repaired.hashed_password)
            .expect("verify"));
    }

    #[tokio::test]
    async fn empty_password_skips_creation() {
        let Some(ctx) = test_support::setup_test_context().await else { return };

        ensure_superuser(&ctx.state).await.expect("skip");

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM accounts")
            .fetch_one(ctx.db())
            .await
            .expect("count");
        assert_eq!(count, 0);
    }
}
