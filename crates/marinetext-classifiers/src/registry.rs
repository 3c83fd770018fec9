//! Model registry: one classifier per model choice
//!
//! The registry is built once at startup and never mutated. Construction
//! fails unless every [`ModelChoice`] has a classifier, which makes lookups
//! total.

use crate::classifier::Classifier;
use crate::loader_plugin::ModelLoaderPlugin;
use marinetext_core::{Error, ModelChoice, Result};
use std::sync::Arc;
use tracing::{error, info};

/// Immutable mapping from model choice to classifier
pub struct ModelRegistry {
    classifiers: [Arc<dyn Classifier>; 3],
}

impl ModelRegistry {
    /// Start building a registry by hand
    pub fn builder() -> ModelRegistryBuilder {
        ModelRegistryBuilder::default()
    }

    /// Load every model choice through the given plugin.
    ///
    /// Models are loaded in dropdown order. The first failure aborts the
    /// whole load; no partial registry is returned.
    pub async fn load(loader: &dyn ModelLoaderPlugin) -> Result<Self> {
        info!("Loading {} models", ModelChoice::ALL.len());

        let mut builder = Self::builder();
        for choice in ModelChoice::ALL {
            let key = choice.registry_key();
            info!("Loading model for '{}' ({})", choice, key);

            match loader.load_classifier(key).await {
                Ok(classifier) => {
                    info!("✓ Loaded '{}' as {}", choice, classifier.name());
                    builder = builder.register(choice, Arc::from(classifier));
                }
                Err(e) => {
                    error!("✗ Failed to load '{}': {}", choice, e);
                    return Err(e);
                }
            }
        }

        builder.build()
    }

    /// Classifier for a model choice
    pub fn get(&self, choice: ModelChoice) -> Arc<dyn Classifier> {
        Arc::clone(&self.classifiers[choice.index()])
    }

    /// Model choices in dropdown order
    pub fn choices(&self) -> &'static [ModelChoice] {
        &ModelChoice::ALL
    }
}

/// Builder for [`ModelRegistry`]
#[derive(Default)]
pub struct ModelRegistryBuilder {
    slots: [Option<Arc<dyn Classifier>>; 3],
}

impl ModelRegistryBuilder {
    /// Set the classifier for a choice, replacing any earlier one
    pub fn register(mut self, choice: ModelChoice, classifier: Arc<dyn Classifier>) -> Self {
        self.slots[choice.index()] = Some(classifier);
        self
    }

    /// Finish the registry; fails if any choice is unset
    pub fn build(self) -> Result<ModelRegistry> {
        let [sentiment, emotion, hate_speech] = self.slots;
        let missing = |choice: ModelChoice| {
            Error::config(format!("No classifier registered for '{}'", choice))
        };

        Ok(ModelRegistry {
            classifiers: [
                sentiment.ok_or_else(|| missing(ModelChoice::SentimentAnalysis))?,
                emotion.ok_or_else(|| missing(ModelChoice::EmotionDetection))?,
                hate_speech.ok_or_else(|| missing(ModelChoice::HateSpeechDetection))?,
            ],
        })
    }
}
