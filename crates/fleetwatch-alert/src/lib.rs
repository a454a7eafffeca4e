//! Alert reconciliation core.
//!
//! Each pass pulls raw samples from an [`source::AlertSource`], discards
//! invalid and pending ones, collapses duplicates per
//! [`AlertKey`](fleetwatch_common::types::AlertKey), merges the rest into
//! the persisted catalog batch by batch and finally resolves every firing
//! alert that was not reported. [`scheduler::AlertQueryScheduler`] runs
//! passes on an interval with at most one in flight.

pub mod catalog;
pub mod dedup;
pub mod error;
pub mod merge;
pub mod metrics;
pub mod reconciler;
pub mod resolve;
pub mod scheduler;
pub mod source;
pub mod validate;


pub use error::{ReconcileError, SourceError};
pub use metrics::{MetricRegistry, MetricsReporter, QueryMetric, STATUS_OK};
pub use reconciler::{AlertReconciler, PassReport, DEFAULT_BATCH_SIZE};
pub use scheduler::{AlertQueryScheduler, AlwaysActive, InstanceRole, RunGuard, TickOutcome};
pub use source::{AlertSource, PrometheusSource};
