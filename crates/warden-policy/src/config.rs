//! Evaluator configuration

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::PolicyError;
use crate::set::Priority;

/// Default file name for the evaluator config.
pub const CONFIG_FILE_NAME: &str = "warden.toml";

/// Settings shared by every entry and set built for one policy engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluatorConfig {
    /// Emit per-entry diagnostic lines. Default: false.
    #[serde(default)]
    pub verbose: bool,

    /// Which polarity wins when grant and deny entries both match.
    #[serde(default)]
    pub priority: Priority,
}

impl EvaluatorConfig {
    /// Load the config from a TOML file.
    pub fn load(path: &Path) -> Result<Self, PolicyError> {
        let content = std::fs::read_to_string(path).map_err(|source| PolicyError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Try to load the config, falling back to defaults on any error.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                if path.exists() {
                    tracing::warn!("ignoring evaluator config {}: {}", path.display(), e);
                }
                Self::default()
            }
        }
    }
}
