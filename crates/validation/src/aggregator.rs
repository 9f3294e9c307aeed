//! Field validation state aggregator.
//!
//! A [`ValidationState`] wraps a reactive cell holding the latest
//! `ValidationResult` of a form (or `None` before the first validation) and
//! derives everything an input widget needs from it:
//!
//! - whole-result views: `all_errors`, `all_warnings`, `fields_with_errors`, ...
//! - per-field views: [`FieldValidationState`], memoized per field name so the
//!   same `Arc` is returned for every lookup of that field.
//!
//! Derived views are recomputed lazily when the result cell (or the locale
//! signal, if translation is configured) has been written since the last
//! read. Dirty flags live on the field states and are never touched by
//! result writes.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use resumeforge_core::{Severity, Signal, ValidationError, ValidationResult};

use crate::derived::{Derived, ViewKey};
use crate::field_state::FieldValidationState;
use crate::i18n::I18n;

#[derive(Debug, Default)]
struct Issues {
    errors: Vec<ValidationError>,
    warnings: Vec<ValidationError>,
}

/// Observable validation state of one form.
pub struct ValidationState<T> {
    result: Signal<Option<ValidationResult<T>>>,
    i18n: Option<I18n>,
    fields: Mutex<HashMap<String, Arc<FieldValidationState<T>>>>,
    issues: Derived<Issues>,
}

impl<T> core::fmt::Debug for ValidationState<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ValidationState")
            .field("version", &self.result.version())
            .field("i18n", &self.i18n)
            .finish_non_exhaustive()
    }
}

impl<T: Clone + Send + Sync + 'static> Default for ValidationState<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + Sync + 'static> ValidationState<T> {
    /// Aggregator over a fresh, empty result cell.
    pub fn new() -> Self {
        Self::from_signal(Signal::new(None))
    }

    /// Aggregator over a caller-owned result cell.
    pub fn from_signal(result: Signal<Option<ValidationResult<T>>>) -> Self {
        Self {
            result,
            i18n: None,
            fields: Mutex::new(HashMap::new()),
            issues: Derived::default(),
        }
    }

    /// Resolve messages through `i18n`.
    ///
    /// Must be configured before the first [`field_state`](Self::field_state)
    /// lookup; field states capture the translation handle on creation.
    pub fn with_i18n(mut self, i18n: I18n) -> Self {
        self.i18n = Some(i18n);
        self
    }

    pub fn result(&self) -> Option<ValidationResult<T>> {
        self.result.get()
    }

    pub fn result_signal(&self) -> &Signal<Option<ValidationResult<T>>> {
        &self.result
    }

    pub fn set_result(&self, result: ValidationResult<T>) {
        self.result.set(Some(result));
    }

    /// Forget the current result. Dirty flags are kept.
    pub fn reset_result(&self) {
        self.result.set(None);
    }

    /// Blocking entries across the whole result.
    pub fn all_errors(&self) -> Vec<ValidationError> {
        self.issues().errors.clone()
    }

    /// Advisory entries across the whole result.
    pub fn all_warnings(&self) -> Vec<ValidationError> {
        self.issues().warnings.clone()
    }

    pub fn is_success(&self) -> bool {
        self.result.with(|r| r.as_ref().is_some_and(ValidationResult::is_success))
    }

    pub fn is_failure(&self) -> bool {
        self.result.with(|r| r.as_ref().is_some_and(ValidationResult::is_failure))
    }

    /// Field names with at least one blocking entry, in first-seen order.
    pub fn fields_with_errors(&self) -> Vec<String> {
        unique_fields(&self.issues().errors)
    }

    /// Field names with at least one advisory entry, in first-seen order.
    pub fn fields_with_warnings(&self) -> Vec<String> {
        unique_fields(&self.issues().warnings)
    }

    pub fn total_issues(&self) -> usize {
        let issues = self.issues();
        issues.errors.len() + issues.warnings.len()
    }

    /// State of `field`, created on first lookup and shared afterwards.
    pub fn field_state(&self, field: &str) -> Arc<FieldValidationState<T>> {
        let mut fields = self.fields.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(fields.entry(field.to_string()).or_insert_with(|| {
            Arc::new(FieldValidationState::new(
                field,
                self.result.clone(),
                self.i18n.clone(),
            ))
        }))
    }

    /// Clear the dirty flag of every field looked up so far.
    pub fn reset_all(&self) {
        let fields = self.fields.lock().unwrap_or_else(PoisonError::into_inner);
        for state in fields.values() {
            state.reset();
        }
    }

    /// Names of fields currently marked dirty.
    pub fn dirty_fields(&self) -> Vec<String> {
        let fields = self.fields.lock().unwrap_or_else(PoisonError::into_inner);
        let mut dirty: Vec<String> = fields
            .iter()
            .filter(|(_, state)| state.is_dirty())
            .map(|(name, _)| name.clone())
            .collect();
        dirty.sort();
        dirty
    }

    fn issues(&self) -> Arc<Issues> {
        let key = ViewKey {
            result: self.result.version(),
            locale: self.i18n.as_ref().map_or(0, I18n::locale_version),
        };
        self.issues.get_or_compute(key, || {
            self.result.with(|result| {
                let Some(result) = result else {
                    return Issues::default();
                };
                let localize = |e: &ValidationError| match &self.i18n {
                    Some(i18n) => i18n.localize(e),
                    None => e.clone(),
                };
                let pick = |severity: Severity| -> Vec<ValidationError> {
                    result
                        .issues()
                        .iter()
                        .filter(|e| e.severity == severity)
                        .map(localize)
                        .collect()
                };
                Issues {
                    errors: pick(Severity::Error),
                    warnings: pick(Severity::Warning),
                }
            })
        })
    }
}

fn unique_fields(entries: &[ValidationError]) -> Vec<String> {
    let mut fields: Vec<String> = Vec::new();
    for entry in entries {
        if !fields.contains(&entry.field) {
            fields.push(entry.field.clone());
        }
    }
    fields
}
