//! Centralized error store.
//!
//! One session-wide list of [`ErrorInfo`] records, shared by every section
//! controller. Records are appended in call order, never deduplicated, and
//! only ever changed by flipping `dismissed`; the list shrinks only on
//! [`ErrorStore::clear_errors`].
//!
//! [`ErrorStore::execute_with_error_handling`] is the chokepoint every
//! load/save/delete/reorder passes through: a failing operation produces
//! exactly one record here instead of escaping to the caller.

use std::future::Future;
use std::sync::{Arc, OnceLock};

use resumeforge_core::{ErrorId, Severity, Signal};

use crate::info::{ErrorInfo, ErrorReport, ErrorSource};
use crate::mapping::{ErrorMapper, InfrastructureErrorMapper};

/// Options for [`ErrorStore::execute_with_error_handling`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ExecuteOptions {
    /// Surface the failure as an active notification. When `false` the record
    /// is still appended, already dismissed.
    pub show_toast: bool,
    /// Return the failure to the caller after recording it.
    pub rethrow: bool,
}

impl Default for ExecuteOptions {
    fn default() -> Self {
        Self {
            show_toast: true,
            rethrow: false,
        }
    }
}

impl ExecuteOptions {
    pub fn rethrow() -> Self {
        Self {
            rethrow: true,
            ..Self::default()
        }
    }

    pub fn silent() -> Self {
        Self {
            show_toast: false,
            ..Self::default()
        }
    }
}

/// Session-wide list of user-facing errors.
///
/// Cheap to clone; clones share the same list.
#[derive(Clone, Default)]
pub struct ErrorStore {
    errors: Signal<Vec<ErrorInfo>>,
    mapper: Option<Arc<dyn ErrorMapper>>,
}

impl core::fmt::Debug for ErrorStore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ErrorStore")
            .field("errors", &self.errors.with(Vec::len))
            .field("has_mapper", &self.mapper.is_some())
            .finish()
    }
}

static GLOBAL: OnceLock<ErrorStore> = OnceLock::new();

impl ErrorStore {
    /// Store without a mapping collaborator; failures use the generic fallback.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mapper(mapper: Arc<dyn ErrorMapper>) -> Self {
        Self {
            errors: Signal::default(),
            mapper: Some(mapper),
        }
    }

    /// Process-wide store with the default infrastructure mapper installed.
    pub fn global() -> &'static ErrorStore {
        GLOBAL.get_or_init(|| Self::with_mapper(Arc::new(InfrastructureErrorMapper::default())))
    }

    /// Reactive list for notification rendering.
    pub fn signal(&self) -> &Signal<Vec<ErrorInfo>> {
        &self.errors
    }

    /// Full session history, dismissed entries included.
    pub fn errors(&self) -> Vec<ErrorInfo> {
        self.errors.get()
    }

    pub fn active_errors(&self) -> Vec<ErrorInfo> {
        self.errors
            .with(|errors| errors.iter().filter(|e| !e.dismissed).cloned().collect())
    }

    /// Append a record, filling in id and timestamp where absent.
    pub fn add_error(&self, report: impl Into<ErrorReport>) -> ErrorId {
        let info = report.into().into_info();
        let id = info.id;
        let field = info.field.clone().unwrap_or_default();

        match info.severity {
            Severity::Error => tracing::error!(
                error_id = %id, source = info.source.as_str(), field = %field, "{}", info.message
            ),
            Severity::Warning => tracing::warn!(
                error_id = %id, source = info.source.as_str(), field = %field, "{}", info.message
            ),
            Severity::Info => tracing::info!(
                error_id = %id, source = info.source.as_str(), field = %field, "{}", info.message
            ),
        }

        self.errors.update(|errors| errors.push(info));
        id
    }

    /// Mark a record dismissed. Returns `false` for unknown ids.
    ///
    /// Dismissing twice is a no-op.
    pub fn dismiss_error(&self, id: ErrorId) -> bool {
        let state = self
            .errors
            .with(|errors| errors.iter().find(|e| e.id == id).map(|e| e.dismissed));

        match state {
            None => false,
            Some(true) => true,
            Some(false) => {
                self.errors.update(|errors| {
                    if let Some(entry) = errors.iter_mut().find(|e| e.id == id) {
                        entry.dismissed = true;
                    }
                });
                true
            }
        }
    }

    pub fn clear_errors(&self) {
        self.errors.set(Vec::new());
    }

    /// Whether any record is still active.
    pub fn has_errors(&self) -> bool {
        self.errors.with(|errors| errors.iter().any(|e| !e.dismissed))
    }

    /// Most recently appended record, dismissed or not.
    pub fn last_error(&self) -> Option<ErrorInfo> {
        self.errors.with(|errors| errors.last().cloned())
    }

    /// First active record attached to `path`.
    pub fn field_error(&self, path: &str) -> Option<ErrorInfo> {
        self.errors.with(|errors| {
            errors
                .iter()
                .find(|e| !e.dismissed && e.field.as_deref() == Some(path))
                .cloned()
        })
    }

    pub fn has_field_error(&self, path: &str) -> bool {
        self.field_error(path).is_some()
    }

    /// Record a caught failure.
    ///
    /// Uses the mapping collaborator when one is installed, otherwise builds
    /// an application-level record from the failure's message.
    pub fn record_failure(&self, error: &anyhow::Error, options: ExecuteOptions) -> ErrorId {
        let report: ErrorReport = match &self.mapper {
            Some(mapper) => mapper.map_error(error).into(),
            None => ErrorReport::new(error.to_string(), ErrorSource::Application),
        };
        self.add_error(report.dismissed(!options.show_toast))
    }

    /// Run `operation`, turning a failure into exactly one store record.
    ///
    /// Returns `Ok(Some(value))` on success. On failure returns `Ok(None)`, or
    /// the failure itself when `options.rethrow` is set.
    pub async fn execute_with_error_handling<T, E, Fut>(
        &self,
        operation: Fut,
        options: ExecuteOptions,
    ) -> anyhow::Result<Option<T>>
    where
        Fut: Future<Output = Result<T, E>>,
        E: Into<anyhow::Error>,
    {
        match operation.await {
            Ok(value) => Ok(Some(value)),
            Err(err) => {
                let err: anyhow::Error = err.into();
                tracing::error!(error = %err, "operation failed");
                self.record_failure(&err, options);
                if options.rethrow { Err(err) } else { Ok(None) }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use resumeforge_persistence::PersistenceError;

    #[test]
    fn add_error_assigns_exactly_one_id() {
        let store = ErrorStore::new();
        let id = store.add_error(ErrorReport::new("boom", ErrorSource::Ui));
        let errors = store.errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].id, id);
    }

    #[test]
    fn add_error_keeps_supplied_id_and_does_not_dedupe() {
        let store = ErrorStore::new();
        let id = ErrorId::new();
        let report = ErrorReport::new("boom", ErrorSource::Domain).with_id(id);
        assert_eq!(store.add_error(report.clone()), id);
        store.add_error(ErrorReport::new("boom", ErrorSource::Domain));
        store.add_error(ErrorReport::new("boom", ErrorSource::Domain));
        assert_eq!(store.errors().len(), 3);
    }

    #[test]
    fn dismiss_is_idempotent_and_retains_history() {
        let store = ErrorStore::new();
        let id = store.add_error(ErrorReport::new("boom", ErrorSource::Ui));

        assert!(store.dismiss_error(id));
        let version = store.signal().version();
        assert!(store.dismiss_error(id));
        assert_eq!(store.signal().version(), version);

        let errors = store.errors();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].dismissed);
        assert!(!store.dismiss_error(ErrorId::new()));
    }

    #[test]
    fn has_errors_false_iff_all_dismissed_or_empty() {
        let store = ErrorStore::new();
        assert!(!store.has_errors());

        let a = store.add_error(ErrorReport::new("a", ErrorSource::Ui));
        let b = store.add_error(ErrorReport::new("b", ErrorSource::Ui));
        assert!(store.has_errors());

        store.dismiss_error(a);
        assert!(store.has_errors());
        store.dismiss_error(b);
        assert!(!store.has_errors());
        assert_eq!(store.active_errors().len(), 0);
    }

    #[test]
    fn last_error_ignores_dismissal() {
        let store = ErrorStore::new();
        store.add_error(ErrorReport::new("first", ErrorSource::Ui));
        let second = store.add_error(ErrorReport::new("second", ErrorSource::Ui));
        store.dismiss_error(second);
        assert_eq!(store.last_error().unwrap().message, "second");
    }

    #[test]
    fn field_error_skips_dismissed_entries() {
        let store = ErrorStore::new();
        let first = store.add_error(ErrorReport::new("first", ErrorSource::Domain).with_field("basics.email"));
        store.add_error(ErrorReport::new("second", ErrorSource::Domain).with_field("basics.email"));

        assert_eq!(store.field_error("basics.email").unwrap().message, "first");
        store.dismiss_error(first);
        assert_eq!(store.field_error("basics.email").unwrap().message, "second");
        assert!(!store.has_field_error("basics.name"));
    }

    #[test]
    fn clear_empties_the_list() {
        let store = ErrorStore::new();
        store.add_error(ErrorReport::new("a", ErrorSource::Ui));
        store.clear_errors();
        assert!(store.errors().is_empty());
        assert!(store.last_error().is_none());
    }

    #[test]
    fn clones_share_the_list() {
        let store = ErrorStore::new();
        let other = store.clone();
        other.add_error(ErrorReport::new("shared", ErrorSource::Ui));
        assert_eq!(store.errors().len(), 1);
    }

    #[tokio::test]
    async fn execute_returns_value_on_success() {
        let store = ErrorStore::new();
        let out = store
            .execute_with_error_handling(async { Ok::<_, PersistenceError>(5) }, ExecuteOptions::default())
            .await
            .unwrap();
        assert_eq!(out, Some(5));
        assert!(store.errors().is_empty());
    }

    #[tokio::test]
    async fn execute_without_mapper_records_application_fallback() {
        let store = ErrorStore::new();
        let out: Option<()> = store
            .execute_with_error_handling(
                async { Err(anyhow::anyhow!("disk on fire")) },
                ExecuteOptions::default(),
            )
            .await
            .unwrap();

        assert!(out.is_none());
        let errors = store.errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].source, ErrorSource::Application);
        assert_eq!(errors[0].severity, Severity::Error);
        assert_eq!(errors[0].message, "disk on fire");
        assert!(!errors[0].dismissed);
    }

    #[tokio::test]
    async fn execute_with_mapper_records_mapped_error() {
        let store = ErrorStore::with_mapper(Arc::new(InfrastructureErrorMapper::default()));
        let out: Option<()> = store
            .execute_with_error_handling(
                async { Err(PersistenceError::validation(["basics.name: required"])) },
                ExecuteOptions::default(),
            )
            .await
            .unwrap();

        assert!(out.is_none());
        assert!(store.has_field_error("basics.name"));
        assert_eq!(store.last_error().unwrap().source, ErrorSource::Infrastructure);
    }

    #[tokio::test]
    async fn execute_rethrows_after_recording() {
        let store = ErrorStore::new();
        let err = store
            .execute_with_error_handling(
                async { Err::<(), _>(PersistenceError::storage("quota exceeded")) },
                ExecuteOptions::rethrow(),
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<PersistenceError>(),
            Some(PersistenceError::Storage(_))
        ));
        assert_eq!(store.errors().len(), 1);
    }

    #[tokio::test]
    async fn silent_execution_records_dismissed_entry() {
        let store = ErrorStore::new();
        let _ = store
            .execute_with_error_handling(
                async { Err::<(), _>(anyhow::anyhow!("background sync failed")) },
                ExecuteOptions::silent(),
            )
            .await;
        assert_eq!(store.errors().len(), 1);
        assert!(!store.has_errors());
    }

    #[test]
    fn global_store_is_a_single_instance() {
        assert!(ErrorStore::global().signal().ptr_eq(ErrorStore::global().signal()));
    }
}
