//! Notification dispatch for reconciliation passes.
//!
//! Once per pass the scheduler tells a [`Notifier`] that alert state may have
//! changed. Delivery to end users is owned by a downstream dispatcher; the
//! notifiers here only signal it ([`channels::WebhookNotifier`]) or record
//! the signal in the log ([`channels::LogNotifier`]).

pub mod channels;
pub mod error;
pub mod utils;

#[cfg(test)]
mod tests;

use async_trait::async_trait;

pub use channels::{LogNotifier, WebhookNotifier};
pub use error::{NotifyError, Result};

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Trigger dispatch of whatever notifications are now due.
    ///
    /// # Errors
    ///
    /// Returns an error if the signal could not be delivered after retries.
    /// Callers log it; it never fails the pass that preceded it.
    async fn send_notifications(&self) -> Result<()>;

    /// Short name used in log fields (e.g. `"webhook"`).
    fn notifier_name(&self) -> &str;
}
