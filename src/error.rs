//! Error taxonomy shared by the model, the store and the engine.

use std::path::PathBuf;
use thiserror::Error;

/// A violated field-level or cross-field constraint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid `{field}`: {rule}")]
pub struct ValidationError {
    /// Name of the offending attribute (or the attribute the invariant is attached to)
    pub field: String,
    /// Human-readable description of the rule that failed
    pub rule: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, rule: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            rule: rule.into(),
        }
    }

    /// Shorthand for a `null` sent to an attribute that cannot be cleared.
    pub fn required(field: impl Into<String>) -> Self {
        Self::new(field, "is required and cannot be null")
    }
}

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("{kind} `{id}` not found")]
    NotFound { kind: &'static str, id: String },

    #[error("{kind} `{id}` already exists")]
    Duplicate { kind: &'static str, id: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("store {path:?} is not accessible: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("store {path:?} is malformed: {reason}")]
    Parse { path: PathBuf, reason: String },
}

impl RecordError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn parse(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Parse {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

pub type RecordResult<T> = std::result::Result<T, RecordError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_names_field_and_rule() {
        let err = ValidationError::new("height", "must be greater than 0");
        assert_eq!(err.to_string(), "invalid `height`: must be greater than 0");

        let wrapped: RecordError = err.clone().into();
        assert!(matches!(wrapped, RecordError::Validation(ref inner) if *inner == err));
    }

    #[test]
    fn test_not_found_message() {
        let err = RecordError::NotFound { kind: "patient", id: "P404".to_string() };
        assert_eq!(err.to_string(), "patient `P404` not found");
    }
}
