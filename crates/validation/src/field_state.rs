//! Per-field view over a validation result.

use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;

use resumeforge_core::{Severity, Signal, ValidationError, ValidationResult};

use crate::derived::{Derived, ViewKey};
use crate::i18n::I18n;

/// Plain copy of a field's state, for binding into a view layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSnapshot {
    pub errors: Vec<ValidationError>,
    pub first_error_message: String,
    pub highest_severity: Option<Severity>,
    pub has_error: bool,
    pub has_warning: bool,
    pub has_info: bool,
    pub is_dirty: bool,
}

/// Validation state of one input.
///
/// The error list is derived from the owning aggregator's result cell and
/// recomputed lazily after the result (or the locale) changes. The dirty flag
/// is independent state: replacing the result never touches it, only
/// [`reset`](Self::reset) clears it.
pub struct FieldValidationState<T> {
    field: String,
    result: Signal<Option<ValidationResult<T>>>,
    i18n: Option<I18n>,
    dirty: AtomicBool,
    errors: Derived<Vec<ValidationError>>,
}

impl<T> core::fmt::Debug for FieldValidationState<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FieldValidationState")
            .field("field", &self.field)
            .field("dirty", &self.dirty.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl<T: Clone + Send + Sync + 'static> FieldValidationState<T> {
    pub(crate) fn new(
        field: impl Into<String>,
        result: Signal<Option<ValidationResult<T>>>,
        i18n: Option<I18n>,
    ) -> Self {
        Self {
            field: field.into(),
            result,
            i18n,
            dirty: AtomicBool::new(false),
            errors: Derived::default(),
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    /// Entries of the current result attached to exactly this field.
    pub fn errors(&self) -> Vec<ValidationError> {
        let key = ViewKey {
            result: self.result.version(),
            locale: self.i18n.as_ref().map_or(0, I18n::locale_version),
        };
        let errors = self.errors.get_or_compute(key, || {
            self.result.with(|result| match result {
                Some(result) => result
                    .errors_for_field(&self.field)
                    .into_iter()
                    .map(|e| match &self.i18n {
                        Some(i18n) => i18n.localize(e),
                        None => e.clone(),
                    })
                    .collect(),
                None => Vec::new(),
            })
        });
        errors.as_ref().clone()
    }

    /// Message of the first blocking entry, or an empty string.
    pub fn first_error_message(&self) -> String {
        self.errors()
            .into_iter()
            .find(ValidationError::is_error)
            .map(|e| e.message)
            .unwrap_or_default()
    }

    pub fn highest_severity(&self) -> Option<Severity> {
        self.errors().iter().map(|e| e.severity).max()
    }

    pub fn has_error(&self) -> bool {
        self.has_severity(Severity::Error)
    }

    pub fn has_warning(&self) -> bool {
        self.has_severity(Severity::Warning)
    }

    pub fn has_info(&self) -> bool {
        self.has_severity(Severity::Info)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    /// Record that the user touched this field.
    pub fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::Release);
    }

    /// Forget that the user touched this field.
    pub fn reset(&self) {
        self.dirty.store(false, Ordering::Release);
    }

    pub fn snapshot(&self) -> FieldSnapshot {
        let errors = self.errors();
        let first_error_message = errors
            .iter()
            .find(|e| e.is_error())
            .map(|e| e.message.clone())
            .unwrap_or_default();
        let has = |severity| errors.iter().any(|e| e.severity == severity);

        FieldSnapshot {
            first_error_message,
            highest_severity: errors.iter().map(|e| e.severity).max(),
            has_error: has(Severity::Error),
            has_warning: has(Severity::Warning),
            has_info: has(Severity::Info),
            is_dirty: self.is_dirty(),
            errors,
        }
    }

    fn has_severity(&self, severity: Severity) -> bool {
        self.errors().iter().any(|e| e.severity == severity)
    }
}
