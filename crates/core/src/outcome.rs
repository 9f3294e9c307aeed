//! Success/failure algebra shared by every validating constructor.

use serde::{Deserialize, Serialize};

use crate::error::{GLOBAL_FIELD, Severity, ValidationError, codes};

/// Outcome of validating a value.
///
/// - `Success` carries the (possibly normalized) value plus non-blocking
///   warnings. It never carries an entry of severity [`Severity::Error`].
/// - `Failure` carries a non-empty list of entries; mixed severities are
///   allowed and consumers filter by severity.
///
/// Values are immutable once built; combine results by building new ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ValidationResult<T> {
    Success {
        value: T,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        warnings: Vec<ValidationError>,
    },
    Failure {
        #[serde(rename = "error")]
        errors: Vec<ValidationError>,
    },
}

impl<T> ValidationResult<T> {
    pub fn success(value: T) -> Self {
        Self::Success {
            value,
            warnings: Vec::new(),
        }
    }

    /// Success with advisory entries.
    ///
    /// If any supplied entry has severity `error` the outcome is a `Failure`
    /// holding every supplied entry.
    pub fn success_with_warnings(value: T, warnings: Vec<ValidationError>) -> Self {
        if warnings.iter().any(ValidationError::is_error) {
            return Self::Failure { errors: warnings };
        }
        Self::Success { value, warnings }
    }

    /// Failure from a single entry or a list of entries.
    ///
    /// An empty list is replaced by one `UNKNOWN_VALIDATION_ERROR` entry on
    /// the `global` field.
    pub fn failure(errors: impl Into<Vec<ValidationError>>) -> Self {
        let mut errors = errors.into();
        if errors.is_empty() {
            errors.push(ValidationError::new(
                codes::UNKNOWN_VALIDATION_ERROR,
                "validation failed",
                GLOBAL_FIELD,
            ));
        }
        Self::Failure { errors }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure { .. })
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Success { value, .. } => Some(value),
            Self::Failure { .. } => None,
        }
    }

    /// Warnings of a `Success`; empty for a `Failure`.
    pub fn warnings(&self) -> &[ValidationError] {
        match self {
            Self::Success { warnings, .. } => warnings,
            Self::Failure { .. } => &[],
        }
    }

    /// Entries of a `Failure`; empty for a `Success`.
    pub fn errors(&self) -> &[ValidationError] {
        match self {
            Self::Success { .. } => &[],
            Self::Failure { errors } => errors,
        }
    }

    /// Every entry carried, whatever the tag.
    pub fn issues(&self) -> &[ValidationError] {
        match self {
            Self::Success { warnings, .. } => warnings,
            Self::Failure { errors } => errors,
        }
    }

    /// Entries of a `Failure` whose `field` is exactly `field`.
    ///
    /// No prefix matching: `"location"` does not match `"location.city"`.
    pub fn errors_for_field(&self, field: &str) -> Vec<&ValidationError> {
        self.errors().iter().filter(|e| e.field == field).collect()
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ValidationResult<U> {
        match self {
            Self::Success { value, warnings } => ValidationResult::Success {
                value: f(value),
                warnings,
            },
            Self::Failure { errors } => ValidationResult::Failure { errors },
        }
    }

    /// Drop warnings and convert into a plain `Result`.
    pub fn into_result(self) -> Result<T, Vec<ValidationError>> {
        match self {
            Self::Success { value, .. } => Ok(value),
            Self::Failure { errors } => Err(errors),
        }
    }

    /// Highest severity among carried entries.
    pub fn highest_severity(&self) -> Option<Severity> {
        self.issues().iter().map(|e| e.severity).max()
    }
}

impl<T> From<ValidationResult<T>> for Result<T, Vec<ValidationError>> {
    fn from(value: ValidationResult<T>) -> Self {
        value.into_result()
    }
}

/// Free-function spelling of [`ValidationResult::success_with_warnings`].
///
/// Pass `Vec::new()` for a plain success.
pub fn create_success<T>(value: T, warnings: Vec<ValidationError>) -> ValidationResult<T> {
    ValidationResult::success_with_warnings(value, warnings)
}

/// Free-function spelling of [`ValidationResult::failure`].
pub fn create_failure<T>(errors: impl Into<Vec<ValidationError>>) -> ValidationResult<T> {
    ValidationResult::failure(errors)
}
