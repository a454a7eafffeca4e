use std::collections::HashSet;
use std::sync::Arc;

use fleetwatch_common::types::RawSample;
use fleetwatch_storage::AlertCatalog;

use crate::catalog::CatalogSnapshot;
use crate::dedup::{deduplicate, drop_pending};
use crate::error::Result;
use crate::merge::merge_batch;
use crate::metrics::{MetricsReporter, QueryMetric};
use crate::resolve::resolve_absent;
use crate::source::AlertSource;
use crate::validate::validate;

pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Stage counters for one pass, summed over all batches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassReport {
    pub total: usize,
    pub invalid: usize,
    pub pending: usize,
    pub filtered: usize,
    pub created: usize,
    pub updated: usize,
    pub resolved: usize,
}

impl std::fmt::Display for PassReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "total={} invalid={} pending={} filtered={} new={} updated={} resolved={}",
            self.total,
            self.invalid,
            self.pending,
            self.filtered,
            self.created,
            self.updated,
            self.resolved
        )
    }
}

/// One reconciliation pass: pull, validate, drop pending, deduplicate,
/// merge and persist per batch, then resolve whatever did not survive.
pub struct AlertReconciler {
    source: Arc<dyn AlertSource>,
    catalog: Arc<dyn AlertCatalog>,
    metrics: Arc<dyn MetricsReporter>,
    batch_size: usize,
}

impl AlertReconciler {
    pub fn new(
        source: Arc<dyn AlertSource>,
        catalog: Arc<dyn AlertCatalog>,
        metrics: Arc<dyn MetricsReporter>,
        batch_size: usize,
    ) -> Self {
        Self {
            source,
            catalog,
            metrics,
            batch_size: batch_size.max(1),
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Run one pass. A source or storage failure aborts it before
    /// resolution, leaving already-saved batches in place.
    pub async fn run_pass(&self) -> Result<PassReport> {
        let mut report = PassReport::default();
        // stages an aborted pass never reaches must not show the previous pass
        for metric in QueryMetric::ALL {
            self.metrics.set_count(metric, 0);
        }

        let samples = if self.source.enabled() {
            self.source.pull().await?
        } else {
            tracing::debug!("Alert source disabled, treating pull as empty");
            Vec::new()
        };
        report.total = samples.len();
        self.report(QueryMetric::TotalAlerts, report.total);

        let (valid, invalid) = validate(samples);
        report.invalid = invalid;
        self.report(QueryMetric::InvalidAlerts, invalid);

        let (firing, pending) = drop_pending(valid);
        report.pending = pending;
        self.report(QueryMetric::PendingAlerts, pending);

        let unique = deduplicate(firing);

        let mut survivors: HashSet<String> = HashSet::with_capacity(unique.len());
        let batches = self.merge_batches(&unique, &mut survivors, &mut report).await;
        self.report(QueryMetric::FilteredAlerts, report.filtered);
        self.report(QueryMetric::NewAlerts, report.created);
        self.report(QueryMetric::UpdatedAlerts, report.updated);
        batches?;

        let resolved = resolve_absent(self.catalog.as_ref(), &survivors).await?;
        report.resolved = resolved.len();
        self.report(QueryMetric::ResolvedAlerts, report.resolved);

        tracing::info!(
            total = report.total,
            invalid = report.invalid,
            pending = report.pending,
            filtered = report.filtered,
            created = report.created,
            updated = report.updated,
            resolved = report.resolved,
            "Alert reconciliation pass completed"
        );
        Ok(report)
    }

    async fn merge_batches(
        &self,
        samples: &[RawSample],
        survivors: &mut HashSet<String>,
        report: &mut PassReport,
    ) -> Result<()> {
        for batch in samples.chunks(self.batch_size) {
            let snapshot = CatalogSnapshot::load(self.catalog.as_ref(), batch).await?;
            let merged = merge_batch(batch, &snapshot);
            report.filtered += merged.filtered;

            let saved = self.catalog.save_alerts(&merged.alerts).await?;
            report.created += merged.created;
            report.updated += merged.updated;
            survivors.extend(saved.into_iter().map(|a| a.id));
        }
        Ok(())
    }

    fn report(&self, metric: QueryMetric, value: usize) {
        self.metrics
            .set_count(metric, u64::try_from(value).unwrap_or(u64::MAX));
    }
}
