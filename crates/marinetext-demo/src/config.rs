//! Dashboard server configuration

use crate::cli::ServeArgs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Dashboard server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemoConfig {
    /// Listen address
    #[serde(default = "default_address")]
    pub address: String,

    /// Listen port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Models file; `None` loads the pretrained Hugging Face models
    #[serde(default)]
    pub models_path: Option<PathBuf>,

    /// Maximum accepted request body size in bytes
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// Accept cross-origin requests from any origin instead of local ones only
    #[serde(default)]
    pub allow_any_origin: bool,
}

impl DemoConfig {
    /// Load configuration from file and CLI overrides
    pub fn load(args: &ServeArgs) -> anyhow::Result<Self> {
        let mut config = match &args.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        // Apply CLI overrides
        if let Some(address) = &args.address {
            config.address = address.clone();
        }

        if let Some(port) = args.port {
            config.port = port;
        }

        if let Some(models) = &args.models {
            config.models_path = Some(models.clone());
        }

        if args.allow_any_origin {
            config.allow_any_origin = true;
        }

        Ok(config)
    }

    /// Parse a YAML config file
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            anyhow::anyhow!("Failed to read config file {}: {}", path.display(), e)
        })?;
        Ok(serde_yaml::from_str(&content)?)
    }
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            port: default_port(),
            models_path: None,
            max_body_bytes: default_max_body_bytes(),
            allow_any_origin: false,
        }
    }
}

fn default_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    7860
}

fn default_max_body_bytes() -> usize {
    64 * 1024
}
