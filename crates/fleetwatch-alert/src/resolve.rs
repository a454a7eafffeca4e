use std::collections::HashSet;

use fleetwatch_common::types::Alert;
use fleetwatch_storage::{AlertCatalog, AlertFilter};

/// Resolve every firing alert whose id is not in `survivors`.
pub async fn resolve_absent(
    catalog: &dyn AlertCatalog,
    survivors: &HashSet<String>,
) -> fleetwatch_storage::Result<Vec<Alert>> {
    let resolved = catalog
        .mark_resolved(&AlertFilter::firing_except(survivors.clone()))
        .await?;
    if !resolved.is_empty() {
        tracing::info!(count = resolved.len(), "Resolved alerts no longer reported");
    }
    Ok(resolved)
}
