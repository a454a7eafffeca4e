use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

/// Status value reported after a pass that got through resolution.
pub const STATUS_OK: &str = "ok";

pub const STATUS_METRIC: &str = "alert_query_status";

/// Per-pass counters. Each is independent: a sample can count as invalid
/// and never reach the filtered stage, or as pending and filtered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryMetric {
    TotalAlerts,
    InvalidAlerts,
    PendingAlerts,
    FilteredAlerts,
    NewAlerts,
    UpdatedAlerts,
    ResolvedAlerts,
}

impl QueryMetric {
    pub const ALL: [QueryMetric; 7] = [
        QueryMetric::TotalAlerts,
        QueryMetric::InvalidAlerts,
        QueryMetric::PendingAlerts,
        QueryMetric::FilteredAlerts,
        QueryMetric::NewAlerts,
        QueryMetric::UpdatedAlerts,
        QueryMetric::ResolvedAlerts,
    ];

    pub fn name(self) -> &'static str {
        match self {
            QueryMetric::TotalAlerts => "alert_query_total_alerts",
            QueryMetric::InvalidAlerts => "alert_query_invalid_alerts",
            QueryMetric::PendingAlerts => "alert_query_pending_alerts",
            QueryMetric::FilteredAlerts => "alert_query_filtered_alerts",
            QueryMetric::NewAlerts => "alert_query_new_alerts",
            QueryMetric::UpdatedAlerts => "alert_query_updated_alerts",
            QueryMetric::ResolvedAlerts => "alert_query_resolved_alerts",
        }
    }

    fn help(self) -> &'static str {
        match self {
            QueryMetric::TotalAlerts => "Samples pulled from the alerting backend in the last pass",
            QueryMetric::InvalidAlerts => "Samples missing a correlation label",
            QueryMetric::PendingAlerts => "Samples not yet firing",
            QueryMetric::FilteredAlerts => "Samples rejected by the merger",
            QueryMetric::NewAlerts => "Alerts created",
            QueryMetric::UpdatedAlerts => "Alerts refreshed",
            QueryMetric::ResolvedAlerts => "Alerts resolved because they were no longer reported",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Sink for per-pass stage values.
pub trait MetricsReporter: Send + Sync {
    fn set_count(&self, metric: QueryMetric, value: u64);

    /// [`STATUS_OK`] or the error that aborted the pass.
    fn set_status(&self, status: &str);
}

/// In-process gauges holding the latest pass's values.
#[derive(Debug, Default)]
pub struct MetricRegistry {
    counts: [AtomicU64; 7],
    status: RwLock<Option<String>>,
}

impl MetricRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, metric: QueryMetric) -> u64 {
        self.counts[metric.index()].load(Ordering::Relaxed)
    }

    /// `None` until the first pass finishes.
    pub fn status(&self) -> Option<String> {
        self.status
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Prometheus text exposition of every gauge.
    pub fn render_prometheus(&self) -> String {
        let mut out = String::with_capacity(1024);
        for metric in QueryMetric::ALL {
            write_gauge(&mut out, metric.name(), metric.help(), self.count(metric));
        }
        if let Some(status) = self.status() {
            let _ = writeln!(out, "# HELP {STATUS_METRIC} Outcome of the last pass");
            let _ = writeln!(out, "# TYPE {STATUS_METRIC} gauge");
            let _ = writeln!(
                out,
                "{STATUS_METRIC}{{status=\"{}\"}} 1",
                escape_label_value(&status)
            );
        }
        out
    }
}

impl MetricsReporter for MetricRegistry {
    fn set_count(&self, metric: QueryMetric, value: u64) {
        self.counts[metric.index()].store(value, Ordering::Relaxed);
    }

    fn set_status(&self, status: &str) {
        *self.status.write().unwrap_or_else(PoisonError::into_inner) = Some(status.to_string());
    }
}

fn write_gauge(out: &mut String, name: &str, help: &str, val: u64) {
    let _ = writeln!(out, "# HELP {name} {help}");
    let _ = writeln!(out, "# TYPE {name} gauge");
    let _ = writeln!(out, "{name} {val}");
}

fn escape_label_value(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prometheus_output() {
        let m = MetricRegistry::new();
        m.set_count(QueryMetric::TotalAlerts, 12);
        m.set_count(QueryMetric::ResolvedAlerts, 3);
        let output = m.render_prometheus();
        assert!(output.contains("# TYPE alert_query_total_alerts gauge"));
        assert!(output.contains("alert_query_total_alerts 12"));
        assert!(output.contains("alert_query_resolved_alerts 3"));
        assert!(output.contains("alert_query_new_alerts 0"));
        assert!(!output.contains(STATUS_METRIC));
    }

    #[test]
    fn status_is_rendered_as_escaped_label() {
        let m = MetricRegistry::new();
        m.set_status("Source: backend error: \"down\"\nretry");
        let output = m.render_prometheus();
        assert!(output.contains(
            "alert_query_status{status=\"Source: backend error: \\\"down\\\"\\nretry\"} 1"
        ));

        m.set_status(STATUS_OK);
        assert_eq!(m.status().as_deref(), Some("ok"));
        assert!(m.render_prometheus().contains("alert_query_status{status=\"ok\"} 1"));
    }

    #[test]
    fn set_count_overwrites_previous_pass() {
        let m = MetricRegistry::new();
        m.set_count(QueryMetric::NewAlerts, 5);
        m.set_count(QueryMetric::NewAlerts, 1);
        assert_eq!(m.count(QueryMetric::NewAlerts), 1);
    }
}
