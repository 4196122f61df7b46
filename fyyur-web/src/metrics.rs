//! Prometheus counters for catalog changes and rejected submissions.
//!
//! The recorder is installed once per process; `GET /metrics` renders the
//! handle stored in the application state.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::fmt;
use std::sync::OnceLock;
use tracing::{info, warn};

static HANDLE: OnceLock<Option<PrometheusHandle>> = OnceLock::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    RecordsCreated,
    RecordsUpdated,
    RecordsDeleted,
    SubmissionsRejected,
    Searches,
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::RecordsCreated => "fyyur_records_created_total",
            MetricName::RecordsUpdated => "fyyur_records_updated_total",
            MetricName::RecordsDeleted => "fyyur_records_deleted_total",
            MetricName::SubmissionsRejected => "fyyur_submissions_rejected_total",
            MetricName::Searches => "fyyur_searches_total",
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a submission did not reach the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    Validation,
    Persistence,
}

impl RejectReason {
    fn as_str(&self) -> &'static str {
        match self {
            RejectReason::Validation => "validation",
            RejectReason::Persistence => "persistence",
        }
    }
}

/// Installs the Prometheus recorder. Idempotent; returns `None` when another
/// recorder already owns the process.
pub fn init_metrics() -> Option<PrometheusHandle> {
    HANDLE
        .get_or_init(|| match PrometheusBuilder::new().install_recorder() {
            Ok(handle) => {
                info!("Prometheus recorder installed");
                Some(handle)
            }
            Err(e) => {
                warn!("Failed to install Prometheus recorder: {}", e);
                None
            }
        })
        .clone()
}

pub fn record_created(entity: &'static str) {
    metrics::counter!(MetricName::RecordsCreated.as_str(), "entity" => entity).increment(1);
}

pub fn record_updated(entity: &'static str) {
    metrics::counter!(MetricName::RecordsUpdated.as_str(), "entity" => entity).increment(1);
}

pub fn record_deleted(entity: &'static str) {
    metrics::counter!(MetricName::RecordsDeleted.as_str(), "entity" => entity).increment(1);
}

pub fn record_rejected(entity: &'static str, reason: RejectReason) {
    metrics::counter!(
        MetricName::SubmissionsRejected.as_str(),
        "entity" => entity,
        "reason" => reason.as_str()
    )
    .increment(1);
}

pub fn record_search(entity: &'static str) {
    metrics::counter!(MetricName::Searches.as_str(), "entity" => entity).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_names_follow_prometheus_conventions() {
        let names = [
            MetricName::RecordsCreated,
            MetricName::RecordsUpdated,
            MetricName::RecordsDeleted,
            MetricName::SubmissionsRejected,
            MetricName::Searches,
        ];
        for name in names {
            let rendered = name.to_string();
            assert!(rendered.starts_with("fyyur_"));
            assert!(rendered.ends_with("_total"));
        }
    }

    #[test]
    fn test_recording_without_recorder_is_a_no_op() {
        record_created("venue");
        record_rejected("show", RejectReason::Validation);
    }
}
