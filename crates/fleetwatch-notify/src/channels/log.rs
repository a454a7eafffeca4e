use async_trait::async_trait;

use crate::{Notifier, Result};

/// Notifier used when no webhook is configured: records the signal only.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send_notifications(&self) -> Result<()> {
        tracing::debug!(notifier = self.notifier_name(), "Notification dispatch requested");
        Ok(())
    }

    fn notifier_name(&self) -> &str {
        "log"
    }
}
