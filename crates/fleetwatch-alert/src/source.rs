use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fleetwatch_common::types::{RawSample, SampleState};
use serde::Deserialize;

use crate::error::SourceError;

/// Where raw fired-alert samples come from.
#[async_trait]
pub trait AlertSource: Send + Sync {
    /// `false` when the backend's alert management is switched off. The
    /// reconciler then treats the pull as empty.
    fn enabled(&self) -> bool {
        true
    }

    async fn pull(&self) -> Result<Vec<RawSample>, SourceError>;
}

/// Reads active alerts from a Prometheus-compatible `/api/v1/alerts`.
pub struct PrometheusSource {
    base_url: String,
    client: reqwest::Client,
    enabled: bool,
}

impl PrometheusSource {
    pub fn new(base_url: &str, timeout: Duration, enabled: bool) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            enabled,
        })
    }

    fn alerts_url(&self) -> String {
        format!("{}/api/v1/alerts", self.base_url)
    }
}

#[derive(Debug, Deserialize)]
struct AlertsResponse {
    status: String,
    #[serde(default)]
    data: Option<AlertsData>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AlertsData {
    #[serde(default)]
    alerts: Vec<WireAlert>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireAlert {
    #[serde(default)]
    labels: HashMap<String, String>,
    #[serde(default)]
    annotations: HashMap<String, String>,
    #[serde(default)]
    state: String,
    #[serde(default)]
    active_at: Option<DateTime<Utc>>,
}

impl From<WireAlert> for RawSample {
    fn from(w: WireAlert) -> Self {
        RawSample {
            labels: w.labels,
            annotations: w.annotations,
            state: SampleState::from_wire(&w.state),
            active_at: w.active_at.unwrap_or_else(Utc::now),
        }
    }
}

#[async_trait]
impl AlertSource for PrometheusSource {
    fn enabled(&self) -> bool {
        self.enabled
    }

    async fn pull(&self) -> Result<Vec<RawSample>, SourceError> {
        let resp = self.client.get(self.alerts_url()).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SourceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: AlertsResponse = resp.json().await?;
        if parsed.status != "success" {
            return Err(SourceError::Backend(
                parsed
                    .error
                    .unwrap_or_else(|| format!("unexpected status '{}'", parsed.status)),
            ));
        }

        let samples: Vec<RawSample> = parsed
            .data
            .map(|d| d.alerts)
            .unwrap_or_default()
            .into_iter()
            .map(RawSample::from)
            .collect();
        tracing::debug!(count = samples.len(), "Pulled alerts from backend");
        Ok(samples)
    }
}
