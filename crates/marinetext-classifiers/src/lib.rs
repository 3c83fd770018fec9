//! Marinetext Classifiers
//!
//! Classifier trait, model configuration, the immutable model registry and
//! the analyzer that turns a classifier's top prediction into the dashboard
//! summary plus environmental keywords.
//!
//! Heavy ML backends live outside this crate and plug in through
//! [`ModelLoaderPlugin`]. Built-in lexicon classifiers cover offline use.

pub mod analyzer;
pub mod classifier;
pub mod keywords;
pub mod lexicon;
pub mod loader_plugin;
pub mod model_config;
pub mod registry;

pub use analyzer::{AnalysisOutput, Analyzer, Prediction, EMPTY_INPUT_WARNING};
pub use classifier::{rank_scores, ClassificationMetadata, ClassificationResult, Classifier};
pub use keywords::{ENVIRONMENTAL_VOCABULARY, NO_KEYWORDS_FOUND};
pub use lexicon::LexiconClassifier;
pub use loader_plugin::{BuiltinModelLoader, ModelLoaderPlugin};
pub use model_config::{ArchitectureConfig, InferenceConfig, ModelConfig, ModelSource, ModelsConfig};
pub use registry::{ModelRegistry, ModelRegistryBuilder};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::analyzer::{AnalysisOutput, Analyzer};
    pub use crate::classifier::{ClassificationResult, Classifier};
    pub use crate::loader_plugin::ModelLoaderPlugin;
    pub use crate::registry::ModelRegistry;
    pub use marinetext_core::ModelChoice;
}
