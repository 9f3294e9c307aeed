//! Error mapping layer: infrastructure failures → user-facing records.
//!
//! The mapper keeps a static table keyed by failure category
//! (`"StorageError"`, `"ValidationError"`, ...) plus field-specific overrides
//! keyed by `"<category>:<fieldPath>"`. Validation failures carry raw
//! `"<field>: <text>"` messages; the field prefix selects the override.
//!
//! ```text
//! PersistenceError::Validation ["basics.name: required", ...]
//!   → "ValidationError:basics.name"  (override, if present)
//!   → "ValidationError"              (category mapping otherwise)
//! PersistenceError::Storage(..)      → "StorageError"
//! anything else                      → "default"
//! ```

use std::collections::HashMap;

use resumeforge_core::{Severity, split_field_message};
use resumeforge_persistence::PersistenceError;

use crate::info::{ErrorAction, ErrorInfo, ErrorReport, ErrorSource};

/// Key of the catch-all mapping.
pub const DEFAULT_MAPPING: &str = "default";

/// Converts a caught failure into a user-facing record.
pub trait ErrorMapper: Send + Sync {
    fn map_error(&self, error: &anyhow::Error) -> ErrorInfo;
}

/// One row of the mapping table.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorMapping {
    pub code: String,
    pub user_message: String,
    pub severity: Severity,
    pub field: Option<String>,
    pub action: Option<ErrorAction>,
}

impl ErrorMapping {
    pub fn new(code: impl Into<String>, user_message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            user_message: user_message.into(),
            severity: Severity::Error,
            field: None,
            action: None,
        }
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn with_action(mut self, action: ErrorAction) -> Self {
        self.action = Some(action);
        self
    }
}

/// Table-driven mapper for [`PersistenceError`]s.
#[derive(Debug, Clone)]
pub struct InfrastructureErrorMapper {
    mappings: HashMap<String, ErrorMapping>,
}

impl Default for InfrastructureErrorMapper {
    fn default() -> Self {
        Self::empty()
            .with_mapping(
                "StorageError",
                ErrorMapping::new(
                    "STORAGE_WRITE_FAILED",
                    "Your changes could not be saved. Free up some storage and try again.",
                )
                .with_action(ErrorAction::new("Retry", "retry-save")),
            )
            .with_mapping(
                "ValidationError",
                ErrorMapping::new(
                    "DOCUMENT_INVALID",
                    "Some information in your resume is missing or invalid.",
                ),
            )
            .with_mapping(
                "NotFoundError",
                ErrorMapping::new("DOCUMENT_NOT_FOUND", "No saved resume was found.")
                    .with_severity(Severity::Info),
            )
            .with_mapping(
                "SerializationError",
                ErrorMapping::new(
                    "DOCUMENT_UNREADABLE",
                    "The saved resume could not be read. It may be corrupted.",
                )
                .with_action(ErrorAction::new("Import backup", "import-document")),
            )
            .with_field_override(
                "ValidationError",
                "basics.name",
                ErrorMapping::new("NAME_REQUIRED", "Please enter your name.").with_action(
                    ErrorAction::new("Go to field", "focus-field").with_param("field", "basics.name"),
                ),
            )
            .with_field_override(
                "ValidationError",
                "basics.email",
                ErrorMapping::new("EMAIL_INVALID", "Please enter a valid email address.")
                    .with_action(
                        ErrorAction::new("Go to field", "focus-field")
                            .with_param("field", "basics.email"),
                    ),
            )
    }
}

impl InfrastructureErrorMapper {
    /// Mapper with only a bare catch-all row.
    pub fn empty() -> Self {
        let mut mappings = HashMap::new();
        mappings.insert(
            DEFAULT_MAPPING.to_string(),
            ErrorMapping::new("UNKNOWN_ERROR", "An unexpected error occurred."),
        );
        Self { mappings }
    }

    pub fn with_mapping(mut self, category: impl Into<String>, mapping: ErrorMapping) -> Self {
        self.mappings.insert(category.into(), mapping);
        self
    }

    pub fn with_field_override(
        mut self,
        category: &str,
        field: &str,
        mapping: ErrorMapping,
    ) -> Self {
        self.mappings.insert(override_key(category, field), mapping);
        self
    }

    /// One record per field message of a validation failure.
    ///
    /// Other failures yield exactly one record, the same as
    /// [`map_error`](ErrorMapper::map_error).
    pub fn map_all(&self, error: &anyhow::Error) -> Vec<ErrorInfo> {
        match error.downcast_ref::<PersistenceError>() {
            Some(PersistenceError::Validation { messages }) if !messages.is_empty() => messages
                .iter()
                .map(|raw| self.map_field_message("ValidationError", raw))
                .collect(),
            _ => vec![self.map_error(error)],
        }
    }

    fn map_field_message(&self, category: &str, raw: &str) -> ErrorInfo {
        let field = split_field_message(raw).0;
        let (key, mapping) = field
            .and_then(|field| {
                let key = override_key(category, field);
                self.mappings.get(&key).map(|m| (key, m))
            })
            .unwrap_or_else(|| self.category_mapping(category));

        tracing::debug!(mapping = %key, raw, "mapped field error");
        let mut info = build_info(mapping);
        if info.field.is_none() {
            info.field = field.map(str::to_string);
        }
        info
    }

    fn category_mapping(&self, category: &str) -> (String, &ErrorMapping) {
        match self.mappings.get(category) {
            Some(mapping) => (category.to_string(), mapping),
            None => (DEFAULT_MAPPING.to_string(), self.default_mapping()),
        }
    }

    fn default_mapping(&self) -> &ErrorMapping {
        self.mappings
            .get(DEFAULT_MAPPING)
            .unwrap_or_else(|| &*FALLBACK_MAPPING)
    }
}

impl ErrorMapper for InfrastructureErrorMapper {
    /// Map `error` to a single record.
    ///
    /// For a validation failure with several field messages only the first
    /// one is mapped; use [`map_all`](InfrastructureErrorMapper::map_all) to
    /// get every field error.
    fn map_error(&self, error: &anyhow::Error) -> ErrorInfo {
        let Some(persistence) = error.downcast_ref::<PersistenceError>() else {
            tracing::debug!(mapping = DEFAULT_MAPPING, error = %error, "unrecognised failure");
            return build_info(self.default_mapping());
        };

        let category = persistence.category();
        if let Some(first) = persistence.validation_messages().and_then(<[String]>::first) {
            return self.map_field_message(category, first);
        }

        let (key, mapping) = self.category_mapping(category);
        tracing::debug!(mapping = %key, error = %error, "mapped failure");
        build_info(mapping)
    }
}

static FALLBACK_MAPPING: std::sync::LazyLock<ErrorMapping> =
    std::sync::LazyLock::new(|| ErrorMapping::new("UNKNOWN_ERROR", "An unexpected error occurred."));

fn override_key(category: &str, field: &str) -> String {
    format!("{category}:{field}")
}

fn build_info(mapping: &ErrorMapping) -> ErrorInfo {
    let mut report = ErrorReport::new(mapping.user_message.clone(), ErrorSource::Infrastructure)
        .with_severity(mapping.severity);
    report.field = mapping.field.clone();
    report.action = mapping.action.clone();
    report.into_info()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validation(messages: &[&str]) -> anyhow::Error {
        PersistenceError::validation(messages.iter().copied()).into()
    }

    #[test]
    fn field_override_wins_for_first_failing_field() {
        let mapper = InfrastructureErrorMapper::default();
        let info = mapper.map_error(&validation(&["basics.name: required", "basics.email: invalid"]));

        assert_eq!(info.field.as_deref(), Some("basics.name"));
        assert_eq!(info.message, "Please enter your name.");
        assert_eq!(info.source, ErrorSource::Infrastructure);
        assert!(!info.dismissed);
        assert_eq!(info.action.as_ref().map(|a| a.handler.as_str()), Some("focus-field"));
    }

    #[test]
    fn unknown_field_falls_back_to_category_mapping_with_field() {
        let mapper = InfrastructureErrorMapper::default();
        let info = mapper.map_error(&validation(&["work.0.startDate: invalid date"]));

        assert_eq!(info.message, "Some information in your resume is missing or invalid.");
        assert_eq!(info.field.as_deref(), Some("work.0.startDate"));
    }

    #[test]
    fn validation_without_messages_uses_category_mapping() {
        let mapper = InfrastructureErrorMapper::default();
        let info = mapper.map_error(&validation(&[]));
        assert_eq!(info.message, "Some information in your resume is missing or invalid.");
        assert!(info.field.is_none());
    }

    #[test]
    fn storage_failure_carries_retry_action() {
        let mapper = InfrastructureErrorMapper::default();
        let info = mapper.map_error(&PersistenceError::storage("quota exceeded").into());
        assert_eq!(info.severity, Severity::Error);
        assert_eq!(info.action.unwrap().handler, "retry-save");
    }

    #[test]
    fn foreign_errors_use_default_mapping() {
        let mapper = InfrastructureErrorMapper::default();
        let info = mapper.map_error(&anyhow::anyhow!("socket closed"));
        assert_eq!(info.message, "An unexpected error occurred.");
        assert_eq!(info.source, ErrorSource::Infrastructure);
    }

    #[test]
    fn unmapped_category_uses_default_mapping() {
        let mapper = InfrastructureErrorMapper::empty();
        let info = mapper.map_error(&PersistenceError::NotFound.into());
        assert_eq!(info.message, "An unexpected error occurred.");
    }

    #[test]
    fn every_mapping_gets_a_fresh_id() {
        let mapper = InfrastructureErrorMapper::default();
        let err: anyhow::Error = PersistenceError::storage("x").into();
        assert_ne!(mapper.map_error(&err).id, mapper.map_error(&err).id);
    }

    #[test]
    fn map_all_returns_one_record_per_field_message() {
        let mapper = InfrastructureErrorMapper::default();
        let infos = mapper.map_all(&validation(&["basics.name: required", "basics.email: invalid"]));
        let fields: Vec<_> = infos.iter().map(|i| i.field.as_deref()).collect();
        assert_eq!(fields, vec![Some("basics.name"), Some("basics.email")]);
        assert_eq!(infos[1].message, "Please enter a valid email address.");

        let single = mapper.map_all(&PersistenceError::storage("x").into());
        assert_eq!(single.len(), 1);
    }
}
