//! Errors raised while turning a raw config into a [`CompileSpec`](crate::CompileSpec).

use thiserror::Error;

pub type SpecResult<T> = Result<T, SpecError>;

/// Every variant names the offending field so callers can assert on it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpecError {
    #[error("missing required field `{field}`: expected {expected}")]
    MissingField {
        field: String,
        expected: &'static str,
    },

    #[error("invalid input range at `{field}`: {reason}")]
    InvalidRange { field: String, reason: String },

    #[error("invalid shape at `{field}`: {reason}")]
    InvalidShape { field: String, reason: String },

    #[error("type mismatch at `{field}`: expected {expected}, found {actual}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        actual: String,
    },

    #[error("unsupported operating precision at `{field}`: found {actual} (supported: int8, half, float32)")]
    UnsupportedPrecision { field: String, actual: String },

    #[error("invalid device at `{field}`: found {actual} (expected gpu or dla)")]
    InvalidDevice { field: String, actual: String },
}

/// Discriminant of a [`SpecError`], for branching without matching on payloads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpecErrorKind {
    MissingField,
    InvalidRange,
    InvalidShape,
    TypeMismatch,
    UnsupportedPrecision,
    InvalidDevice,
}

impl SpecError {
    pub fn kind(&self) -> SpecErrorKind {
        match self {
            SpecError::MissingField { .. } => SpecErrorKind::MissingField,
            SpecError::InvalidRange { .. } => SpecErrorKind::InvalidRange,
            SpecError::InvalidShape { .. } => SpecErrorKind::InvalidShape,
            SpecError::TypeMismatch { .. } => SpecErrorKind::TypeMismatch,
            SpecError::UnsupportedPrecision { .. } => SpecErrorKind::UnsupportedPrecision,
            SpecError::InvalidDevice { .. } => SpecErrorKind::InvalidDevice,
        }
    }

    pub fn field(&self) -> &str {
        match self {
            SpecError::MissingField { field, .. }
            | SpecError::InvalidRange { field, .. }
            | SpecError::InvalidShape { field, .. }
            | SpecError::TypeMismatch { field, .. }
            | SpecError::UnsupportedPrecision { field, .. }
            | SpecError::InvalidDevice { field, .. } => field,
        }
    }

    pub fn type_mismatch(
        field: impl Into<String>,
        expected: &'static str,
        actual: impl Into<String>,
    ) -> Self {
        SpecError::TypeMismatch {
            field: field.into(),
            expected,
            actual: actual.into(),
        }
    }
}
