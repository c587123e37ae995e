use std::sync::Arc;

use sqlx::PgPool;

use crate::core::config::Settings;
use crate::services::mailer::Mailer;

#[derive(Clone)]
pub(crate) struct AppState {
    inner: Arc<InnerState>,
}

struct InnerState {
    settings: Settings,
    db: PgPool,
    mailer: Arc<dyn Mailer>,
}

impl AppState {
    pub(crate) fn new(settings: Settings, db: PgPool, mailer: Arc<dyn Mailer>) -> Self {
        Self { inner: Arc::new(InnerState { settings, db, mailer }) }
    }

    pub(crate) fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    pub(crate) fn db(&self) -> &PgPool {
        &self.inner.db
    }

    pub(crate) fn mailer(&self) -> &dyn Mailer {
        self.inner.mailer.as_ref()
    }
}
