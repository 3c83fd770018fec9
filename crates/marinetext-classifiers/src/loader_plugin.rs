//! Extension points for model-backed classifier loading.

use crate::classifier::Classifier;
use crate::lexicon::LexiconClassifier;
use crate::model_config::{ModelSource, ModelsConfig};
use async_trait::async_trait;
use marinetext_core::{Error, Result};

/// Pluggable backend for model classifier loading.
///
/// Implement this trait in external crates to provide runtime model inference
/// backends (for example, Candle) without coupling the classifiers crate to
/// heavyweight dependencies.
#[async_trait]
pub trait ModelLoaderPlugin: Send + Sync {
    /// Load a classifier instance by registry key.
    async fn load_classifier(&self, name: &str) -> Result<Box<dyn Classifier>>;

    /// List registry keys available to this loader.
    fn available_models(&self) -> Vec<String>;
}

/// Loader that only understands `builtin` sources.
pub struct BuiltinModelLoader {
    config: ModelsConfig,
}

impl BuiltinModelLoader {
    pub fn new(config: ModelsConfig) -> Self {
        Self { config }
    }

    /// Loader over [`ModelsConfig::offline`]
    pub fn offline() -> Self {
        Self::new(ModelsConfig::offline())
    }
}

#[async_trait]
impl ModelLoaderPlugin for BuiltinModelLoader {
    async fn load_classifier(&self, name: &str) -> Result<Box<dyn Classifier>> {
        let model = self
            .config
            .get_model(name)
            .ok_or_else(|| Error::classifier(format!("Model '{}' not found in registry", name)))?;

        match &model.source {
            ModelSource::Builtin { implementation } => {
                Ok(Box::new(LexiconClassifier::builtin(implementation)?))
            }
            other => Err(Error::classifier(format!(
                "Model '{}' has source {:?}, which needs an ML loader plugin",
                name, other
            ))),
        }
    }

    fn available_models(&self) -> Vec<String> {
        self.config.models.keys().cloned().collect()
    }
}
