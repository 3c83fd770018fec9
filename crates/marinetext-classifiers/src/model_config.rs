//! Model configuration structures
//!
//! The models file maps each registry key (`sentiment`, `emotion`,
//! `hate_speech`) to where its weights come from and how to run them.

use marinetext_core::{Error, ModelChoice, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// All models known to the dashboard, keyed by registry key
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsConfig {
    #[serde(default = "default_version")]
    pub version: String,

    pub models: HashMap<String, ModelConfig>,

    /// Override for the Hugging Face download cache
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
}

/// Configuration for a single model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Model name
    #[serde(default)]
    pub name: String,

    /// Model description
    #[serde(default)]
    pub description: String,

    /// Model source (where to load from)
    pub source: ModelSource,

    /// Model architecture; required for every source except `builtin`
    #[serde(default)]
    pub architecture: Option<ArchitectureConfig>,

    /// Inference settings
    #[serde(default)]
    pub inference: InferenceConfig,
}

/// Model source configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ModelSource {
    /// Load from a local directory holding config.json, tokenizer and weights
    Local { path: PathBuf },

    /// Download from HuggingFace Hub
    HuggingFace {
        repo: String,
        #[serde(default = "default_revision")]
        revision: String,
    },

    /// Use a built-in implementation
    Builtin { implementation: String },
}

fn default_revision() -> String {
    "main".to_string()
}

fn default_version() -> String {
    "1.0".to_string()
}

/// Model architecture configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ArchitectureConfig {
    /// BERT for sequence classification
    BertSequenceClassification {
        num_labels: usize,
        #[serde(default)]
        labels: Vec<String>,
    },

    /// DistilBERT for sequence classification
    DistilBertSequenceClassification {
        num_labels: usize,
        #[serde(default)]
        labels: Vec<String>,
    },
}

impl ArchitectureConfig {
    /// Number of output labels
    pub fn num_labels(&self) -> usize {
        match self {
            Self::BertSequenceClassification { num_labels, .. }
            | Self::DistilBertSequenceClassification { num_labels, .. } => *num_labels,
        }
    }

    /// Configured label names (may be empty)
    pub fn labels(&self) -> &[String] {
        match self {
            Self::BertSequenceClassification { labels, .. }
            | Self::DistilBertSequenceClassification { labels, .. } => labels,
        }
    }
}

/// Inference configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InferenceConfig {
    /// Device to run on (cpu, cuda, mps)
    #[serde(default = "default_device")]
    pub device: String,

    /// Maximum sequence length
    #[serde(default = "default_max_length")]
    pub max_length: usize,
}

fn default_device() -> String {
    "cpu".to_string()
}

fn default_max_length() -> usize {
    512
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            device: default_device(),
            max_length: default_max_length(),
        }
    }
}

impl ModelConfig {
    fn huggingface(name: &str, repo: &str, architecture: ArchitectureConfig) -> Self {
        Self {
            name: name.to_string(),
            description: String::new(),
            source: ModelSource::HuggingFace {
                repo: repo.to_string(),
                revision: default_revision(),
            },
            architecture: Some(architecture),
            inference: InferenceConfig::default(),
        }
    }

    fn builtin(implementation: &str) -> Self {
        Self {
            name: implementation.to_string(),
            description: String::new(),
            source: ModelSource::Builtin {
                implementation: implementation.to_string(),
            },
            architecture: None,
            inference: InferenceConfig::default(),
        }
    }

    /// Name to report in results, falling back to the registry key
    pub fn display_name<'a>(&'a self, key: &'a str) -> &'a str {
        if self.name.is_empty() {
            key
        } else {
            &self.name
        }
    }
}

impl ModelsConfig {
    /// Load the models file from YAML
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Failed to read models file {}: {}", path.display(), e))
        })?;
        let config: ModelsConfig = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// The three pretrained Hugging Face models used by the dashboard
    pub fn pretrained() -> Self {
        let mut models = HashMap::new();
        models.insert(
            ModelChoice::SentimentAnalysis.registry_key().to_string(),
            ModelConfig::huggingface(
                "distilbert-sst2",
                "distilbert-base-uncased-finetuned-sst-2-english",
                ArchitectureConfig::DistilBertSequenceClassification {
                    num_labels: 2,
                    labels: Vec::new(),
                },
            ),
        );
        models.insert(
            ModelChoice::EmotionDetection.registry_key().to_string(),
            ModelConfig::huggingface(
                "distilbert-emotion",
                "bhadresh-savani/distilbert-base-uncased-emotion",
                ArchitectureConfig::DistilBertSequenceClassification {
                    num_labels: 6,
                    labels: Vec::new(),
                },
            ),
        );
        models.insert(
            ModelChoice::HateSpeechDetection.registry_key().to_string(),
            ModelConfig::huggingface(
                "dehatebert-mono-english",
                "Hate-speech-CNERG/dehatebert-mono-english",
                ArchitectureConfig::BertSequenceClassification {
                    num_labels: 2,
                    labels: Vec::new(),
                },
            ),
        );

        Self {
            version: default_version(),
            models,
            cache_dir: None,
        }
    }

    /// Built-in lexicon classifiers for every choice; needs no downloads
    pub fn offline() -> Self {
        let models = ModelChoice::ALL
            .iter()
            .map(|choice| {
                let implementation = format!("{}-lexicon", choice.registry_key());
                (
                    choice.registry_key().to_string(),
                    ModelConfig::builtin(&implementation),
                )
            })
            .collect();

        Self {
            version: default_version(),
            models,
            cache_dir: None,
        }
    }

    /// Get a model configuration by registry key
    pub fn get_model(&self, name: &str) -> Option<&ModelConfig> {
        self.models.get(name)
    }

    /// Get the configuration backing a model choice
    pub fn for_choice(&self, choice: ModelChoice) -> Option<&ModelConfig> {
        self.get_model(choice.registry_key())
    }

    /// Every model choice must be configured, and non-builtin sources need an architecture
    pub fn validate(&self) -> Result<()> {
        for choice in ModelChoice::ALL {
            let model = self.for_choice(choice).ok_or_else(|| {
                Error::config(format!(
                    "Model '{}' ({}) missing from models file",
                    choice.registry_key(),
                    choice
                ))
            })?;

            let builtin = matches!(model.source, ModelSource::Builtin { .. });
            if !builtin && model.architecture.is_none() {
                return Err(Error::config(format!(
                    "Model '{}' needs an architecture section",
                    choice.registry_key()
                )));
            }
        }

        for key in self.models.keys() {
            if key.parse::<ModelChoice>().is_err() {
                tracing::warn!("Ignoring unknown model key '{}' in models file", key);
            }
        }

        Ok(())
    }
}
