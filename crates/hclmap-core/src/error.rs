//! Error types for the hclmap core library
//!
//! A single error enum covers the three projections (encode, decode and
//! schema derivation) plus configuration loading. Errors raised while
//! processing a field are wrapped in [`Error::Field`] so the message names
//! the field that failed.

use std::fmt;
use thiserror::Error;

/// Main error type for hclmap operations
#[derive(Error, Debug)]
pub enum Error {
    /// A field type has no mapping (maps, nested sequences, ...)
    #[error("Unsupported type: {type_name} ({kind}) for field '{field}'")]
    UnsupportedType {
        field: String,
        type_name: String,
        kind: String,
    },

    /// The destination of a decode or derivation is not a usable record
    #[error("Invalid target {type_name}: {message}")]
    InvalidTarget {
        type_name: String,
        message: String,
    },

    /// A stored value could not be converted to the declared field type
    #[error("Type mismatch for field '{field}': expected {expected}, found {found}")]
    TypeMismatch {
        field: String,
        expected: String,
        found: String,
    },

    /// More than one polymorphic candidate key was present in the source
    #[error("Ambiguous polymorphic match for field '{field}': candidates {candidates:?} are all present")]
    AmbiguousPolymorphicMatch {
        field: String,
        candidates: Vec<String>,
    },

    /// A numeric value does not fit the property tree's integer domain
    #[error("Value out of range for field '{field}': {value} does not fit {target}")]
    ValueOutOfRange {
        field: String,
        value: String,
        target: String,
    },

    /// Nesting exceeded the configured depth limit
    #[error("Depth limit of {limit} exceeded at {type_name}")]
    DepthExceeded {
        type_name: String,
        limit: usize,
    },

    /// An error raised while processing one field
    #[error("cannot {operation} field '{field}': {source}")]
    Field {
        operation: Operation,
        field: String,
        #[source]
        source: Box<Error>,
    },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// JSON parsing and serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// YAML parsing errors
    #[error("YAML error: {message}")]
    Yaml {
        message: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Errors raised by hand-written conversions
    #[error("{message}")]
    Custom {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// The projection an error occurred in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Encode,
    Decode,
    Schema,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Encode => write!(f, "encode"),
            Operation::Decode => write!(f, "decode"),
            Operation::Schema => write!(f, "derive schema for"),
        }
    }
}

impl Error {
    /// Wrap this error with the name of the field being processed
    pub fn in_field(self, operation: Operation, field: impl Into<String>) -> Self {
        Error::Field {
            operation,
            field: field.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, skipping any field wrappers
    pub fn root_cause(&self) -> &Error {
        match self {
            Error::Field { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Field names from the outermost wrapper inwards
    pub fn field_path(&self) -> Vec<&str> {
        let mut path = Vec::new();
        let mut current = self;
        while let Error::Field { field, source, .. } = current {
            path.push(field.as_str());
            current = source;
        }
        path
    }

    pub(crate) fn unsupported(field: &str, type_name: &str, kind: &str) -> Self {
        Error::UnsupportedType {
            field: field.to_string(),
            type_name: type_name.to_string(),
            kind: kind.to_string(),
        }
    }

    pub(crate) fn config(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
            source: None,
        }
    }
}

// Conversion implementations
impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Yaml {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Custom {
            message: err.to_string(),
            source: err,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::UnsupportedType {
            field: "labels".to_string(),
            type_name: "HashMap<String, String>".to_string(),
            kind: "map".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Unsupported type: HashMap<String, String> (map) for field 'labels'"
        );
    }

    #[test]
    fn test_field_wrapping() {
        let err = Error::unsupported("labels", "HashMap", "map")
            .in_field(Operation::Encode, "labels")
            .in_field(Operation::Encode, "platform");
        assert!(err.to_string().starts_with("cannot encode field 'platform': cannot encode field 'labels'"));
        assert!(matches!(err.root_cause(), Error::UnsupportedType { .. }));
        assert_eq!(err.field_path(), vec!["platform", "labels"]);
    }

    #[test]
    fn test_operation_display() {
        assert_eq!(Operation::Decode.to_string(), "decode");
        assert_eq!(Operation::Schema.to_string(), "derive schema for");
    }

    #[test]
    fn test_anyhow_conversion() {
        let err: Error = anyhow::anyhow!("bad port").into();
        assert_eq!(err.to_string(), "bad port");
    }
}
