//! Alert model shared by every fleetwatch crate: severities, alert states,
//! raw samples from the alerting backend and persisted alert records.

pub mod id;
pub mod types;
