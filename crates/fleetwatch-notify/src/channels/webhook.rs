use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use crate::error::NotifyError;
use crate::utils::{truncate_string, MAX_BODY_LENGTH};
use crate::{Notifier, Result};

const MAX_ATTEMPTS: u32 = 3;

/// POSTs a JSON dispatch signal to a downstream notification service.
pub struct WebhookNotifier {
    url: String,
    client: reqwest::Client,
    backoff_base: Duration,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            url: url.into(),
            client,
            backoff_base: Duration::from_millis(100),
        })
    }

    /// Override the delay before the second attempt (doubled for each
    /// further attempt).
    #[must_use]
    pub fn with_backoff_base(mut self, backoff_base: Duration) -> Self {
        self.backoff_base = backoff_base;
        self
    }

    fn render_body() -> String {
        serde_json::json!({
            "event": "dispatch_notifications",
            "source": "fleetwatch",
            "timestamp": Utc::now().to_rfc3339(),
        })
        .to_string()
    }

    async fn post_once(&self, body: &str) -> Result<()> {
        let resp = self
            .client
            .post(self.url.as_str())
            .header("Content-Type", "application/json")
            .body(body.to_string())
            .send()
            .await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        let body = match resp.text().await {
            Ok(text) => truncate_string(&text, MAX_BODY_LENGTH),
            Err(e) => format!("[Failed to read response body: {e}]"),
        };
        Err(NotifyError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn send_notifications(&self) -> Result<()> {
        let body = Self::render_body();
        let mut last_err = None;

        for attempt in 0..MAX_ATTEMPTS {
            match self.post_once(&body).await {
                Ok(()) => {
                    tracing::debug!(url = %self.url, attempt = attempt + 1, "Dispatch signal sent");
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!(
                        url = %self.url,
                        attempt = attempt + 1,
                        error = %e,
                        "Dispatch webhook failed, retrying"
                    );
                    last_err = Some(e);
                }
            }
            if attempt + 1 < MAX_ATTEMPTS {
                tokio::time::sleep(self.backoff_base * 2u32.pow(attempt)).await;
            }
        }

        let err = last_err
            .unwrap_or_else(|| NotifyError::Other("no delivery attempt was made".to_string()));
        tracing::error!(url = %self.url, error = %err, "Dispatch webhook failed after {MAX_ATTEMPTS} attempts");
        Err(err)
    }

    fn notifier_name(&self) -> &str {
        "webhook"
    }
}
