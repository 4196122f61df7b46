use std::sync::Arc;

use fyyur_core::Storage;
use metrics_exporter_prometheus::PrometheusHandle;

use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn Storage>,
    pub config: Arc<Config>,
    /// `None` when no recorder is installed; `/metrics` then answers 404.
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(storage: Arc<dyn Storage>, config: Config, metrics: Option<PrometheusHandle>) -> Self {
        Self {
            storage,
            config: Arc::new(config),
            metrics,
        }
    }
}
