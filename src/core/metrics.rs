use std::sync::OnceLock;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::core::config::Settings;

static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

pub(crate) fn init(settings: &Settings) -> anyhow::Result<()> {
    if !settings.telemetry().prometheus_enabled || PROM_HANDLE.get().is_some() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new().install_recorder()?;
    let _ = PROM_HANDLE.set(handle);
    Ok(())
}

pub(crate) fn render() -> Option<String> {
    PROM_HANDLE.get().map(|handle| handle.render())
}

pub(crate) fn invite_issued(role: &'static str) {
    metrics::counter!("invites_issued_total", "role" => role).increment(1);
}

pub(crate) fn invite_accepted(role: &'static str) {
    metrics::counter!("invites_accepted_total", "role" => role).increment(1);
}

pub(crate) fn invite_delivery_failed() {
    metrics::counter!("invite_delivery_failures_total").increment(1);
}

pub(crate) fn enrollment_changed(reason: &'static str, count: usize) {
    metrics::counter!("enrollment_changes_total", "reason" => reason).increment(count as u64);
}
