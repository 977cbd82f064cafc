//! Validation run configuration.

use std::path::PathBuf;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Configuration for reading a dataset.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct ValidatorConfig {
    /// Dataset root directory.
    pub root: PathBuf,

    /// Follow symbolic links while walking the dataset.
    #[builder(default = "false")]
    #[serde(default)]
    pub follow_symlinks: bool,

    /// Extra exclusion patterns (gitignore syntax), applied after the
    /// built-in defaults and before any `.bidsignore` rules.
    #[builder(default)]
    #[serde(default)]
    pub ignore_patterns: Vec<String>,
}

impl ValidatorConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(ref root) = self.root {
            if root.as_os_str().is_empty() {
                return Err("Dataset root cannot be empty".to_string());
            }
        } else {
            return Err("Dataset root is required".to_string());
        }
        Ok(())
    }
}

impl ValidatorConfig {
    /// Create a new config builder.
    pub fn builder() -> ValidatorConfigBuilder {
        ValidatorConfigBuilder::default()
    }

    /// Create a config for a dataset root with default options.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            follow_symlinks: false,
            ignore_patterns: Vec::new(),
        }
    }
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self::new(".")
    }
}
