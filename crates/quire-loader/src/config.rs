//! Loader configuration (quire.toml)
//!
//! Every field has a default matching the conventional layout: dependencies
//! under `node_modules/`, bundled archives nesting them under
//! `.atomist/node_modules/`, and `.ts` sources compiled to `.js`.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::kind::SuffixConvention;

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Validation error
    #[error("Invalid config: {0}")]
    ValidationError(String),
}

/// Loader configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoaderConfig {
    /// Path segment after which nested dependency names start
    pub dependency_marker: String,

    /// Prefixes tried, in order, when looking a bare name up as a packaged resource
    pub package_roots: Vec<String>,

    /// URL scheme served from the packaged resource space
    pub resource_scheme: String,

    /// Suffix of executable modules
    pub compiled_suffix: String,

    /// Suffix of modules that must be compiled first
    pub source_suffix: String,

    /// Archive directory scanned by batch compilation
    pub project_root: String,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            dependency_marker: "node_modules/".to_string(),
            package_roots: vec![
                "node_modules/".to_string(),
                ".atomist/node_modules/".to_string(),
            ],
            resource_scheme: "classpath".to_string(),
            compiled_suffix: ".js".to_string(),
            source_suffix: ".ts".to_string(),
            project_root: ".atomist".to_string(),
        }
    }
}

impl LoaderConfig {
    /// Load and validate a config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: LoaderConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.compiled_suffix.is_empty() || self.source_suffix.is_empty() {
            return Err(ConfigError::ValidationError(
                "compiled_suffix and source_suffix must not be empty".to_string(),
            ));
        }
        if self.compiled_suffix == self.source_suffix {
            return Err(ConfigError::ValidationError(format!(
                "compiled_suffix and source_suffix are both '{}'",
                self.compiled_suffix
            )));
        }
        if !self.dependency_marker.ends_with('/') || self.dependency_marker.len() < 2 {
            return Err(ConfigError::ValidationError(format!(
                "dependency_marker '{}' must be a directory name ending in '/'",
                self.dependency_marker
            )));
        }
        if self.resource_scheme.is_empty()
            || !self
                .resource_scheme
                .bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
        {
            return Err(ConfigError::ValidationError(format!(
                "resource_scheme '{}' must be a lowercase URL scheme",
                self.resource_scheme
            )));
        }
        Ok(())
    }

    pub fn convention(&self) -> SuffixConvention {
        SuffixConvention::new(self.compiled_suffix.as_str(), self.source_suffix.as_str())
    }
}
