//! `resumeforge-validation`: field-level validation state.
//!
//! - [`ValidationState`]: aggregator deriving whole-form and per-field views
//!   from a reactive validation result.
//! - [`I18n`] / [`Translator`]: optional message translation, re-resolved on
//!   locale change.
//! - [`handlers`]: helpers to watch, combine and produce results.

pub mod aggregator;
mod derived;
pub mod field_state;
pub mod handlers;
pub mod i18n;

pub use aggregator::ValidationState;
pub use field_state::{FieldSnapshot, FieldValidationState};
pub use handlers::{
    ResultCallbacks, ResultWatch, apply_async_validation, combine_field_results,
    errors_from_messages, option_to_result, validate_related_fields, watch_result,
};
pub use i18n::{CatalogTranslator, I18n, Translator};
