use std::fmt;

use fleetwatch_common::types::{known_labels, Alert, AlertState, RawSample, SampleState};

use crate::catalog::CatalogSnapshot;

/// Why a sample did not produce an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterReason {
    MissingDefinitionId,
    MissingConfigurationId,
    MissingSourceId,
    Pending,
    UnknownDefinition,
    UnknownConfiguration,
    InactiveConfiguration,
    MissingCustomerId,
}

impl fmt::Display for FilterReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FilterReason::MissingDefinitionId => "no definition id",
            FilterReason::MissingConfigurationId => "no configuration id",
            FilterReason::MissingSourceId => "no source id",
            FilterReason::Pending => "sample is pending",
            FilterReason::UnknownDefinition => "definition is missing",
            FilterReason::UnknownConfiguration => "configuration is missing",
            FilterReason::InactiveConfiguration => "configuration is inactive",
            FilterReason::MissingCustomerId => "no customer id",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MergeOutcome {
    Created(Alert),
    Updated(Alert),
    Filtered(FilterReason),
}

/// Apply one firing sample to the catalog state.
pub fn merge_sample(sample: &RawSample, snapshot: &CatalogSnapshot) -> MergeOutcome {
    let Some(definition_id) = sample.definition_id() else {
        return MergeOutcome::Filtered(FilterReason::MissingDefinitionId);
    };
    let Some(configuration_id) = sample.configuration_id() else {
        return MergeOutcome::Filtered(FilterReason::MissingConfigurationId);
    };
    let Some(key) = sample.key() else {
        return MergeOutcome::Filtered(FilterReason::MissingSourceId);
    };
    if sample.state == SampleState::Pending {
        return MergeOutcome::Filtered(FilterReason::Pending);
    }
    if !snapshot.definitions.contains_key(definition_id) {
        return MergeOutcome::Filtered(FilterReason::UnknownDefinition);
    }
    let Some(configuration) = snapshot.configurations.get(configuration_id) else {
        return MergeOutcome::Filtered(FilterReason::UnknownConfiguration);
    };
    if !configuration.active {
        return MergeOutcome::Filtered(FilterReason::InactiveConfiguration);
    }

    let (mut alert, created) = match snapshot.existing.get(&key) {
        Some(existing) => (existing.clone(), false),
        None => {
            let Some(customer_id) = sample.customer_id() else {
                return MergeOutcome::Filtered(FilterReason::MissingCustomerId);
            };
            let alert = Alert {
                id: fleetwatch_common::id::next_id(),
                customer_id: customer_id.to_string(),
                definition_id: key.definition_id.clone(),
                configuration_id: configuration_id.to_string(),
                source_id: key.source_id.clone(),
                source_name: sample
                    .label(known_labels::SOURCE_NAME)
                    .map(str::to_string),
                name: sample
                    .label(known_labels::DEFINITION_NAME)
                    .map(str::to_string),
                severity: sample.severity(),
                configuration_type: sample.configuration_type(),
                message: None,
                labels: Vec::new(),
                state: AlertState::Active,
                create_time: sample.active_at,
                acknowledged_time: None,
                resolved_time: None,
            };
            (alert, true)
        }
    };

    alert.severity = sample.severity();
    alert.configuration_type = sample.configuration_type();
    alert.message = sample.summary().map(str::to_string);
    alert.labels = sample.sorted_labels();
    if alert.state != AlertState::Acknowledged {
        alert.state = if sample.in_maintenance_window() {
            AlertState::Suspended
        } else {
            AlertState::Active
        };
    }

    if created {
        MergeOutcome::Created(alert)
    } else {
        MergeOutcome::Updated(alert)
    }
}

/// Alerts to persist for one batch plus its counters.
#[derive(Debug, Default)]
pub struct MergedBatch {
    pub alerts: Vec<Alert>,
    pub created: usize,
    pub updated: usize,
    pub filtered: usize,
}

pub fn merge_batch(batch: &[RawSample], snapshot: &CatalogSnapshot) -> MergedBatch {
    let mut merged = MergedBatch::default();
    for sample in batch {
        match merge_sample(sample, snapshot) {
            MergeOutcome::Created(alert) => {
                merged.created += 1;
                merged.alerts.push(alert);
            }
            MergeOutcome::Updated(alert) => {
                merged.updated += 1;
                merged.alerts.push(alert);
            }
            MergeOutcome::Filtered(reason) => {
                merged.filtered += 1;
                tracing::debug!(
                    definition_id = sample.definition_id().unwrap_or_default(),
                    source_id = sample.source_id().unwrap_or_default(),
                    %reason,
                    "Alert sample filtered"
                );
            }
        }
    }
    merged
}
