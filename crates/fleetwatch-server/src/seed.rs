use anyhow::{Context, Result};
use chrono::Utc;
use fleetwatch_common::types::{AlertConfiguration, AlertDefinition, ConfigurationType, Severity};
use fleetwatch_storage::{AlertStore, ConfigurationFilter, DefinitionFilter};
use std::collections::HashSet;

use crate::config::CatalogSeedFile;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub configurations_created: u32,
    pub definitions_created: u32,
    pub skipped: u32,
}

pub fn read_seed_file(path: &str) -> Result<CatalogSeedFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read seed file '{path}'"))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse seed file '{path}'"))
}

/// Insert seed configurations and definitions. Ids already present are
/// skipped, so the command can be re-run safely.
pub async fn init_catalog(store: &AlertStore, seed: &CatalogSeedFile) -> Result<SeedSummary> {
    let mut summary = SeedSummary::default();
    let now = Utc::now();

    let existing: HashSet<String> = store
        .list_configurations(&ConfigurationFilter::default())
        .await?
        .into_iter()
        .map(|c| c.id)
        .collect();
    for cfg in &seed.configurations {
        if existing.contains(&cfg.id) {
            tracing::warn!(id = %cfg.id, "Configuration already exists, skipping");
            summary.skipped += 1;
            continue;
        }
        let target_type: ConfigurationType = cfg
            .target_type
            .parse()
            .map_err(|e: String| anyhow::anyhow!("configuration '{}': {e}", cfg.id))?;
        let default_severity: Severity = cfg
            .default_severity
            .parse()
            .map_err(|e: String| anyhow::anyhow!("configuration '{}': {e}", cfg.id))?;
        store
            .insert_configuration(&AlertConfiguration {
                id: cfg.id.clone(),
                customer_id: cfg.customer_id.clone(),
                name: cfg.name.clone(),
                target_type,
                default_severity,
                active: cfg.active,
                created_at: now,
            })
            .await?;
        tracing::info!(id = %cfg.id, name = %cfg.name, "Configuration created");
        summary.configurations_created += 1;
    }

    let existing: HashSet<String> = store
        .list_definitions(&DefinitionFilter::default())
        .await?
        .into_iter()
        .map(|d| d.id)
        .collect();
    for def in &seed.definitions {
        if existing.contains(&def.id) {
            tracing::warn!(id = %def.id, "Definition already exists, skipping");
            summary.skipped += 1;
            continue;
        }
        store
            .insert_definition(&AlertDefinition {
                id: def.id.clone(),
                customer_id: def.customer_id.clone(),
                configuration_id: def.configuration_id.clone(),
                created_at: now,
            })
            .await?;
        tracing::info!(id = %def.id, configuration_id = %def.configuration_id, "Definition created");
        summary.definitions_created += 1;
    }

    Ok(summary)
}
