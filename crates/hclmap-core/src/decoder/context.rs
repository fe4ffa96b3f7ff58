//! Per-call decoding context

use crate::config::Config;
use crate::error::{Error, Result};

/// State threaded through a decode: configuration, current field and depth
#[derive(Debug, Clone)]
pub struct DecodeContext<'a> {
    config: &'a Config,
    field: String,
    depth: usize,
}

impl<'a> DecodeContext<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            field: String::new(),
            depth: 0,
        }
    }

    pub fn config(&self) -> &'a Config {
        self.config
    }

    /// Property key of the field being decoded
    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub(crate) fn for_field(&self, field: &str) -> Self {
        Self {
            config: self.config,
            field: field.to_string(),
            depth: self.depth,
        }
    }

    /// Context one record level deeper
    pub(crate) fn descend(&self, type_name: &str) -> Result<Self> {
        if self.depth >= self.config.max_depth {
            return Err(Error::DepthExceeded {
                type_name: type_name.to_string(),
                limit: self.config.max_depth,
            });
        }
        Ok(Self {
            config: self.config,
            field: self.field.clone(),
            depth: self.depth + 1,
        })
    }

    /// Report a value that does not fit the declared type
    ///
    /// Lenient decoding logs and drops the value; strict decoding fails.
    pub fn mismatch<T>(&self, expected: &str, found: &str) -> Result<Option<T>> {
        if self.config.strict_types {
            return Err(Error::TypeMismatch {
                field: self.field.clone(),
                expected: expected.to_string(),
                found: found.to_string(),
            });
        }
        log::warn!(
            "Dropping value for field '{}': expected {}, found {}",
            self.field,
            expected,
            found
        );
        Ok(None)
    }
}
