//! Helpers used by section controllers around validation results.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

use resumeforge_core::{
    ErrorLayer, GLOBAL_FIELD, Signal, SubscriptionId, ValidationError, ValidationResult, codes,
    split_field_message,
};

type SuccessFn<T> = Arc<dyn Fn(&T, &[ValidationError]) + Send + Sync>;
type FailureFn = Arc<dyn Fn(&[ValidationError]) + Send + Sync>;
type CompleteFn = Arc<dyn Fn() + Send + Sync>;

/// Callbacks for [`watch_result`].
pub struct ResultCallbacks<T> {
    on_success: Option<SuccessFn<T>>,
    on_failure: Option<FailureFn>,
    on_complete: Option<CompleteFn>,
}

impl<T> Default for ResultCallbacks<T> {
    fn default() -> Self {
        Self {
            on_success: None,
            on_failure: None,
            on_complete: None,
        }
    }
}

impl<T> ResultCallbacks<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called with the value and warnings of every new `Success`.
    pub fn on_success(mut self, f: impl Fn(&T, &[ValidationError]) + Send + Sync + 'static) -> Self {
        self.on_success = Some(Arc::new(f));
        self
    }

    /// Called with the entries of every new `Failure`.
    pub fn on_failure(mut self, f: impl Fn(&[ValidationError]) + Send + Sync + 'static) -> Self {
        self.on_failure = Some(Arc::new(f));
        self
    }

    /// Called after either of the above.
    pub fn on_complete(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_complete = Some(Arc::new(f));
        self
    }
}

/// Active [`watch_result`] registration.
#[derive(Debug)]
pub struct ResultWatch<T> {
    signal: Signal<Option<ValidationResult<T>>>,
    id: SubscriptionId,
}

impl<T: Clone + Send + Sync + 'static> ResultWatch<T> {
    /// Stop dispatching.
    pub fn stop(self) {
        self.signal.unsubscribe(self.id);
    }
}

/// Dispatch every write of `result` to exactly one of `on_success` /
/// `on_failure`, then to `on_complete`. Writes of `None` dispatch nothing.
pub fn watch_result<T: Clone + Send + Sync + 'static>(
    result: &Signal<Option<ValidationResult<T>>>,
    callbacks: ResultCallbacks<T>,
) -> ResultWatch<T> {
    let id = result.subscribe(move |current| {
        let Some(current) = current else {
            return;
        };
        match current {
            ValidationResult::Success { value, warnings } => {
                if let Some(f) = &callbacks.on_success {
                    f(value, warnings);
                }
            }
            ValidationResult::Failure { errors } => {
                if let Some(f) = &callbacks.on_failure {
                    f(errors);
                }
            }
        }
        if let Some(f) = &callbacks.on_complete {
            f();
        }
    });

    ResultWatch {
        signal: result.clone(),
        id,
    }
}

/// Combine per-field results into one result over a record.
///
/// - a field without a result yields a `FIELD_NOT_VALIDATED` error for it;
/// - failed fields contribute their entries;
/// - successful fields contribute their value and their warnings.
///
/// The outcome is a `Failure` holding every collected entry if any field
/// failed or was not validated, even when the failure carries only warnings.
/// Otherwise it is a `Success` carrying the collected warnings.
pub fn combine_field_results<K, V, I>(fields: I) -> ValidationResult<BTreeMap<String, V>>
where
    K: Into<String>,
    I: IntoIterator<Item = (K, Option<ValidationResult<V>>)>,
{
    let mut values = BTreeMap::new();
    let mut collected = Vec::new();
    let mut failed = false;

    for (field, result) in fields {
        let field = field.into();
        match result {
            None => {
                failed = true;
                collected.push(
                    ValidationError::new(
                        codes::FIELD_NOT_VALIDATED,
                        format!("{field} has not been validated"),
                        field,
                    )
                    .in_layer(ErrorLayer::Application),
                );
            }
            Some(ValidationResult::Failure { errors }) => {
                failed = true;
                collected.extend(errors);
            }
            Some(ValidationResult::Success { value, warnings }) => {
                collected.extend(warnings);
                values.insert(field, value);
            }
        }
    }

    if failed {
        return ValidationResult::failure(collected);
    }
    ValidationResult::success_with_warnings(values, collected)
}

/// Sets `loading` back to `false` however the validation ends.
struct LoadingGuard<'a>(Option<&'a Signal<bool>>);

impl<'a> LoadingGuard<'a> {
    fn engage(loading: Option<&'a Signal<bool>>) -> Self {
        if let Some(flag) = loading {
            flag.set(true);
        }
        Self(loading)
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if let Some(flag) = self.0 {
            flag.set(false);
        }
    }
}

/// Run an asynchronous validator and store its outcome in `result`.
///
/// A validator error becomes a single `ASYNC_VALIDATION_ERROR` failure on the
/// `global` field. `loading`, if given, is `true` for the duration of the call.
pub async fn apply_async_validation<T, V, F, Fut>(
    validate: F,
    result: &Signal<Option<ValidationResult<T>>>,
    value: V,
    loading: Option<&Signal<bool>>,
) -> ValidationResult<T>
where
    T: Clone + Send + Sync + 'static,
    F: FnOnce(V) -> Fut,
    Fut: Future<Output = anyhow::Result<ValidationResult<T>>>,
{
    let _guard = LoadingGuard::engage(loading);

    let outcome = match validate(value).await {
        Ok(outcome) => outcome,
        Err(err) => {
            tracing::warn!(error = %err, "async validator failed");
            ValidationResult::failure(
                ValidationError::new(codes::ASYNC_VALIDATION_ERROR, err.to_string(), GLOBAL_FIELD)
                    .in_layer(ErrorLayer::Application),
            )
        }
    };

    result.set(Some(outcome.clone()));
    outcome
}

/// `Success` for `Some`, `Failure` built by `error` for `None`.
pub fn option_to_result<T, E>(value: Option<T>, error: impl FnOnce() -> E) -> ValidationResult<T>
where
    E: Into<Vec<ValidationError>>,
{
    match value {
        Some(value) => ValidationResult::success(value),
        None => ValidationResult::failure(error()),
    }
}

/// Check a cross-field rule over `values`.
///
/// When `is_invalid` holds, returns one error per name in `fields`, all with
/// the same message, so every implicated input shows the complaint.
pub fn validate_related_fields<V: ?Sized>(
    fields: &[&str],
    is_invalid: impl FnOnce(&V) -> bool,
    message: &str,
    values: &V,
) -> Vec<ValidationError> {
    if !is_invalid(values) {
        return Vec::new();
    }
    fields
        .iter()
        .map(|field| {
            ValidationError::new(codes::CROSS_FIELD_INVALID, message, *field)
                .with_i18n_param("fields", fields.join(","))
        })
        .collect()
}

/// Turn `"<field>: <text>"` messages into errors.
///
/// Messages without a field prefix are attached to the `global` field.
pub fn errors_from_messages<S: AsRef<str>>(
    messages: &[S],
    code: &str,
    layer: ErrorLayer,
) -> Vec<ValidationError> {
    messages
        .iter()
        .map(|raw| {
            let (field, text) = split_field_message(raw.as_ref());
            ValidationError::new(code, text, field.unwrap_or(GLOBAL_FIELD)).in_layer(layer)
        })
        .collect()
}
