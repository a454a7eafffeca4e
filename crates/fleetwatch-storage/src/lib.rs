//! Persistence for reconciled alerts and the definitions and configurations
//! that produce them.
//!
//! [`store::AlertStore`] is the SeaORM implementation; the reconciler only
//! depends on the [`AlertCatalog`] contract so it can run against any
//! backing store.

pub mod entities;
pub mod error;
pub mod store;

#[cfg(test)]
mod tests;

use async_trait::async_trait;
use fleetwatch_common::types::{Alert, AlertConfiguration, AlertDefinition};

pub use error::{Result, StorageError};
pub use store::{AlertFilter, AlertStore, ConfigurationFilter, DefinitionFilter};

/// Catalog operations the reconciliation pass relies on.
///
/// Implementations must be safe to share across threads because the
/// scheduler runs passes on spawned tasks.
#[async_trait]
pub trait AlertCatalog: Send + Sync {
    /// Definitions matching the filter. Unknown ids are simply absent.
    async fn list_definitions(&self, filter: &DefinitionFilter) -> Result<Vec<AlertDefinition>>;

    async fn list_configurations(
        &self,
        filter: &ConfigurationFilter,
    ) -> Result<Vec<AlertConfiguration>>;

    async fn list_alerts(&self, filter: &AlertFilter) -> Result<Vec<Alert>>;

    /// Upsert by id and return the rows as stored. Either every alert is
    /// written or none is.
    async fn save_alerts(&self, alerts: &[Alert]) -> Result<Vec<Alert>>;

    /// Resolve every firing alert matching the filter and return them.
    async fn mark_resolved(&self, filter: &AlertFilter) -> Result<Vec<Alert>>;
}
