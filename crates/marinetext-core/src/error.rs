//! Error types for Marinetext

/// Result type alias using Marinetext's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for Marinetext operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Classifier loading or inference errors
    #[error("classifier error: {0}")]
    Classifier(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// A model name that does not map to any known model choice
    #[error("unknown model: {0}")]
    UnknownModel(String),

    /// Network/IO errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Generic internal errors
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new classifier error
    pub fn classifier(msg: impl Into<String>) -> Self {
        Self::Classifier(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new unknown model error
    pub fn unknown_model(name: impl Into<String>) -> Self {
        Self::UnknownModel(name.into())
    }

    /// Create a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
