use std::{
    error::Error,
    fmt::{self, Display},
    io,
    path::PathBuf,
};

use crate::Feature;

/// The result type used across the model crate.
pub type Result<T> = std::result::Result<T, ModelErr>;

/// Failures while loading the model artifact or running inference.
#[derive(Debug)]
pub enum ModelErr {
    Io { path: PathBuf, source: io::Error },
    Parse(serde_json::Error),
    /// The artifact parsed but its contents are unusable.
    Artifact(String),
    NonFiniteOutput,
}

impl Display for ModelErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelErr::Io { path, source } => {
                write!(f, "cannot read model artifact '{}': {source}", path.display())
            }
            ModelErr::Parse(e) => write!(f, "invalid model artifact: {e}"),
            ModelErr::Artifact(msg) => write!(f, "invalid model artifact: {msg}"),
            ModelErr::NonFiniteOutput => write!(f, "the model produced a non finite output"),
        }
    }
}

impl Error for ModelErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ModelErr::Io { source, .. } => Some(source),
            ModelErr::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ModelErr {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// Reasons a student profile is rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationErr {
    NotAnObject,
    MissingField(Feature),
    TypeError {
        field: Feature,
        expected: &'static str,
    },
    RangeError {
        field: Feature,
        min: f64,
        max: f64,
        got: f64,
    },
}

impl ValidationErr {
    /// Returns the offending field, if the error is about a single field.
    pub fn field(&self) -> Option<Feature> {
        match self {
            ValidationErr::NotAnObject => None,
            ValidationErr::MissingField(field)
            | ValidationErr::TypeError { field, .. }
            | ValidationErr::RangeError { field, .. } => Some(*field),
        }
    }
}

impl Display for ValidationErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationErr::NotAnObject => write!(f, "student data must be a JSON object"),
            ValidationErr::MissingField(field) => write!(f, "Missing required field: {field}"),
            ValidationErr::TypeError { field, expected } => {
                write!(f, "{field} must be {expected}")
            }
            ValidationErr::RangeError {
                field: Feature::Research,
                got,
                ..
            } => write!(f, "Research must be 0 or 1, got {got}"),
            ValidationErr::RangeError {
                field,
                min,
                max,
                got,
            } => write!(f, "{field} must be between {min} and {max}, got {got}"),
        }
    }
}

impl Error for ValidationErr {}
