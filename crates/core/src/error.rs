//! Validation error taxonomy.
//!
//! Every validating constructor in the workspace reports problems as
//! [`ValidationError`] records. A record says *what* went wrong (`code`,
//! `message`), *where* (`field`, a dot-path such as `"location.postalCode"`),
//! *how bad* it is ([`Severity`]) and *which layer* noticed it ([`ErrorLayer`]).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Field path reserved for document-wide issues.
pub const GLOBAL_FIELD: &str = "global";

/// Interpolation parameters for a translation key.
pub type I18nParams = BTreeMap<String, serde_json::Value>;

/// Well-known error codes produced by the substrate itself.
pub mod codes {
    pub const REQUIRED: &str = "REQUIRED";
    pub const INVALID_FORMAT: &str = "INVALID_FORMAT";
    pub const CROSS_FIELD_INVALID: &str = "CROSS_FIELD_INVALID";
    pub const FIELD_NOT_VALIDATED: &str = "FIELD_NOT_VALIDATED";
    pub const ASYNC_VALIDATION_ERROR: &str = "ASYNC_VALIDATION_ERROR";
    pub const UNKNOWN_VALIDATION_ERROR: &str = "UNKNOWN_VALIDATION_ERROR";
    pub const ITEM_NOT_FOUND: &str = "ITEM_NOT_FOUND";
}

/// Classification of a validation entry.
///
/// Ordering follows blocking-ness: `Info < Warning < Error`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl core::fmt::Display for Severity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Layer that raised a validation entry.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorLayer {
    /// Business-rule violations raised by validating constructors.
    Domain,
    /// Use-case level failures.
    Application,
    /// Local UI state construction errors.
    Presentation,
}

/// A single validation finding attached to a field path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[serde(rename_all = "camelCase")]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub code: String,
    pub message: String,
    pub field: String,
    pub severity: Severity,
    pub layer: ErrorLayer,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub i18n_key: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub i18n_params: I18nParams,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ValidationError {
    /// Blocking domain error for `field`.
    pub fn new(code: impl Into<String>, message: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            field: field.into(),
            severity: Severity::Error,
            layer: ErrorLayer::Domain,
            i18n_key: None,
            i18n_params: I18nParams::new(),
            suggestion: None,
        }
    }

    /// Non-blocking domain warning for `field`.
    pub fn warning(code: impl Into<String>, message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::new(code, message, field).with_severity(Severity::Warning)
    }

    /// Informational entry for `field`.
    pub fn info(code: impl Into<String>, message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::new(code, message, field).with_severity(Severity::Info)
    }

    /// Shorthand for a `REQUIRED` error.
    pub fn required(field: impl Into<String>) -> Self {
        let field = field.into();
        let message = format!("{field} is required");
        Self::new(codes::REQUIRED, message, field.clone())
            .with_i18n("validation.required")
            .with_i18n_param("field", field)
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn in_layer(mut self, layer: ErrorLayer) -> Self {
        self.layer = layer;
        self
    }

    pub fn with_i18n(mut self, key: impl Into<String>) -> Self {
        self.i18n_key = Some(key.into());
        self
    }

    pub fn with_i18n_param(mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.i18n_params.insert(name.into(), value.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }

    pub fn is_info(&self) -> bool {
        self.severity == Severity::Info
    }

    pub fn is_global(&self) -> bool {
        self.field == GLOBAL_FIELD
    }
}

impl From<ValidationError> for Vec<ValidationError> {
    fn from(value: ValidationError) -> Self {
        vec![value]
    }
}

/// Split a `"<field>: <text>"` message at its first `:`.
///
/// Returns `None` for the field when the message has no prefix or the prefix
/// is empty or contains whitespace. Whether the field is known is up to the
/// caller.
pub fn split_field_message(raw: &str) -> (Option<&str>, &str) {
    match raw.split_once(':') {
        Some((field, text)) => {
            let field = field.trim();
            if field.is_empty() || field.contains(char::is_whitespace) {
                (None, raw.trim())
            } else {
                (Some(field), text.trim())
            }
        }
        None => (None, raw.trim()),
    }
}
