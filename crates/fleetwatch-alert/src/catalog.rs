use std::collections::{BTreeSet, HashMap};

use fleetwatch_common::types::{Alert, AlertConfiguration, AlertDefinition, AlertKey, RawSample};
use fleetwatch_storage::{AlertCatalog, AlertFilter, ConfigurationFilter, DefinitionFilter};

/// Everything the merger needs to know about one batch, fetched up front
/// with three bulk reads.
#[derive(Debug, Default)]
pub struct CatalogSnapshot {
    pub definitions: HashMap<String, AlertDefinition>,
    /// Configurations owning the batch's definitions, active or not.
    pub configurations: HashMap<String, AlertConfiguration>,
    /// Firing alerts of the batch's definitions.
    pub existing: HashMap<AlertKey, Alert>,
}

impl CatalogSnapshot {
    pub async fn load(
        catalog: &dyn AlertCatalog,
        batch: &[RawSample],
    ) -> fleetwatch_storage::Result<Self> {
        let definition_ids: BTreeSet<String> = batch
            .iter()
            .filter_map(|s| s.definition_id().map(str::to_string))
            .collect();
        if definition_ids.is_empty() {
            return Ok(Self::default());
        }

        let definitions: HashMap<String, AlertDefinition> = catalog
            .list_definitions(&DefinitionFilter::by_ids(definition_ids.iter().cloned()))
            .await?
            .into_iter()
            .map(|d| (d.id.clone(), d))
            .collect();

        let configuration_ids: BTreeSet<String> = definitions
            .values()
            .map(|d| d.configuration_id.clone())
            .collect();
        let configurations: HashMap<String, AlertConfiguration> = if configuration_ids.is_empty() {
            HashMap::new()
        } else {
            catalog
                .list_configurations(&ConfigurationFilter {
                    ids: Some(configuration_ids.into_iter().collect()),
                    active_eq: None,
                })
                .await?
                .into_iter()
                .map(|c| (c.id.clone(), c))
                .collect()
        };

        let mut existing: HashMap<AlertKey, Alert> = HashMap::new();
        for alert in catalog
            .list_alerts(&AlertFilter::firing_for_definitions(definition_ids))
            .await?
        {
            let key = alert.key();
            if let Some(kept) = existing.get(&key) {
                tracing::warn!(
                    key = %key,
                    kept = %kept.id,
                    ignored = %alert.id,
                    "More than one firing alert for key"
                );
                continue;
            }
            existing.insert(key, alert);
        }

        Ok(Self {
            definitions,
            configurations,
            existing,
        })
    }
}
