use chrono::{DateTime, Utc};
use fleetwatch_alert::MetricRegistry;
use fleetwatch_storage::AlertStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<AlertStore>,
    pub metrics: Arc<MetricRegistry>,
    pub start_time: DateTime<Utc>,
}
