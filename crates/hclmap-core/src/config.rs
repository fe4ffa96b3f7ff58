//! Mapping configuration
//!
//! Configuration is loaded from defaults, an optional YAML/JSON file and
//! `HCLMAP_*` environment variables, in that order of precedence.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Documentation used for fields that carry none
pub const DEFAULT_DOCUMENTATION: &str = "No documentation available";

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Description given to fields without a doc annotation or comment
    pub default_documentation: String,

    /// Maximum record nesting before a projection gives up
    pub max_depth: usize,

    /// Return type mismatches from decode instead of logging and dropping them
    pub strict_types: bool,

    /// Decimal places used when hashing floats into unordered collections
    pub float_hash_precision: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_documentation: DEFAULT_DOCUMENTATION.to_string(),
            max_depth: 32,
            strict_types: false,
            float_hash_precision: 6,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;

        let extension = path.extension().and_then(|s| s.to_str());
        let config: Config = if extension == Some("yaml") || extension == Some("yml") {
            serde_yaml::from_str(&content)?
        } else {
            serde_json::from_str(&content)?
        };

        config.validate()?;
        Ok(config)
    }

    /// Load from an optional file, then apply environment overrides
    pub fn load_with_file(file: Option<&Path>) -> Result<Self> {
        let mut config = match file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.merge_with_env()?;
        Ok(config)
    }

    /// Apply `HCLMAP_*` environment overrides
    pub fn merge_with_env(&mut self) -> Result<()> {
        if let Ok(depth) = std::env::var("HCLMAP_MAX_DEPTH") {
            self.max_depth = depth.parse().map_err(|e| Error::Configuration {
                message: format!("invalid HCLMAP_MAX_DEPTH '{}'", depth),
                source: Some(anyhow::Error::new(e)),
            })?;
        }

        if let Ok(strict) = std::env::var("HCLMAP_STRICT_TYPES") {
            self.strict_types = strict.to_lowercase() == "true" || strict == "1";
        }

        if let Ok(doc) = std::env::var("HCLMAP_DEFAULT_DOC") {
            self.default_documentation = doc;
        }

        self.validate()
    }

    /// Check invariants that serde cannot express
    pub fn validate(&self) -> Result<()> {
        if self.max_depth == 0 {
            return Err(Error::config("max_depth must be at least 1"));
        }
        if self.float_hash_precision > 17 {
            return Err(Error::config(format!(
                "float_hash_precision {} exceeds 17 digits",
                self.float_hash_precision
            )));
        }
        Ok(())
    }
}

/// Builder for creating configurations programmatically
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn default_documentation(mut self, doc: impl Into<String>) -> Self {
        self.config.default_documentation = doc.into();
        self
    }

    pub fn max_depth(mut self, depth: usize) -> Self {
        self.config.max_depth = depth;
        self
    }

    pub fn strict_types(mut self, strict: bool) -> Self {
        self.config.strict_types = strict;
        self
    }

    pub fn float_hash_precision(mut self, precision: usize) -> Self {
        self.config.float_hash_precision = precision;
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<Config> {
        self.config.validate()?;
        Ok(self.config)
    }
}
