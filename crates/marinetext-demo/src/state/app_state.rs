use crate::config::DemoConfig;
use marinetext_classifiers::{Analyzer, ModelRegistry, ModelsConfig};
use marinetext_classifiers_ml_plugin::ExternalMlModelLoader;
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::Path;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Analyzer over the loaded model registry
    pub analyzer: Analyzer,

    /// Server configuration
    pub config: Arc<DemoConfig>,

    /// Prometheus handle for `/metrics`; absent when no recorder is installed
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(analyzer: Analyzer, config: DemoConfig) -> Self {
        Self {
            analyzer,
            config: Arc::new(config),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

/// Build the model registry from a models file, or the pretrained defaults.
///
/// Any model that fails to load aborts the whole registry.
pub async fn load_registry(models_path: Option<&Path>) -> marinetext_core::Result<ModelRegistry> {
    let loader = match models_path {
        Some(path) => {
            tracing::info!("Loading models from {}", path.display());
            ExternalMlModelLoader::from_file(path)?
        }
        None => {
            tracing::info!("Loading pretrained models from the Hugging Face Hub");
            ExternalMlModelLoader::from_config(ModelsConfig::pretrained())
        }
    };

    ModelRegistry::load(&loader).await
}
