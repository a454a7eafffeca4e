use anyhow::{Context, Result};
use fleetwatch_alert::{
    AlertQueryScheduler, AlertReconciler, MetricRegistry, PrometheusSource,
};
use fleetwatch_notify::{LogNotifier, Notifier, WebhookNotifier};
use fleetwatch_storage::AlertStore;
use std::sync::Arc;
use std::time::Duration;

use crate::config::ServerConfig;
use crate::ha::ConfiguredRole;

/// Connect to the configured database, creating the SQLite data directory
/// when needed.
pub async fn open_store(config: &ServerConfig) -> Result<AlertStore> {
    if config.database.url.is_none() {
        std::fs::create_dir_all(&config.database.data_dir).with_context(|| {
            format!("Failed to create data dir '{}'", config.database.data_dir)
        })?;
    }
    AlertStore::new(&config.database.connection_url())
        .await
        .with_context(|| format!("Failed to open store at {}", config.database.redacted_url()))
}

pub fn build_notifier(config: &ServerConfig) -> Result<Arc<dyn Notifier>> {
    match &config.notify.webhook_url {
        Some(url) => {
            let notifier =
                WebhookNotifier::new(url.as_str(), Duration::from_secs(config.notify.timeout_secs))
                    .context("Failed to build webhook notifier")?;
            tracing::info!(url = %url, "Dispatch webhook configured");
            Ok(Arc::new(notifier))
        }
        None => Ok(Arc::new(LogNotifier)),
    }
}

/// Wire source, store, metrics, notifier and role into a scheduler.
pub fn build_scheduler(
    config: &ServerConfig,
    store: Arc<AlertStore>,
    metrics: Arc<MetricRegistry>,
) -> Result<AlertQueryScheduler> {
    let source = PrometheusSource::new(
        &config.prometheus.base_url,
        Duration::from_secs(config.prometheus.timeout_secs),
        config.prometheus.enabled,
    )
    .context("Failed to build Prometheus client")?;

    let reconciler = AlertReconciler::new(
        Arc::new(source),
        store,
        metrics.clone(),
        config.alert_query.batch_size,
    );

    Ok(AlertQueryScheduler::new(
        Arc::new(reconciler),
        Arc::new(ConfiguredRole::from_config(&config.high_availability)),
        build_notifier(config)?,
        metrics,
        Duration::from_secs(config.alert_query.interval_secs),
        Duration::from_secs(config.alert_query.initial_delay_secs),
    ))
}
