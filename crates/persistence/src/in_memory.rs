//! In-memory repository for tests/dev.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::document::Document;
use crate::error::PersistenceError;
use crate::repository::DocumentRepository;

type DocumentValidator = Box<dyn Fn(&Document) -> Vec<String> + Send + Sync>;

/// In-memory document store.
///
/// - No IO
/// - Queued failures (`fail_next_load` / `fail_next_save`) are returned once,
///   in order, before the store behaves normally again
/// - An optional validator rejects documents on save with its messages
#[derive(Default)]
pub struct InMemoryRepository {
    document: Mutex<Option<Document>>,
    load_failures: Mutex<VecDeque<PersistenceError>>,
    save_failures: Mutex<VecDeque<PersistenceError>>,
    validator: Option<DocumentValidator>,
    saves: AtomicUsize,
}

impl core::fmt::Debug for InMemoryRepository {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("InMemoryRepository")
            .field("saves", &self.save_count())
            .finish_non_exhaustive()
    }
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(document: Document) -> Self {
        Self {
            document: Mutex::new(Some(document)),
            ..Self::default()
        }
    }

    /// Reject saved documents for which `validator` returns messages.
    pub fn with_validator(
        mut self,
        validator: impl Fn(&Document) -> Vec<String> + Send + Sync + 'static,
    ) -> Self {
        self.validator = Some(Box::new(validator));
        self
    }

    pub fn fail_next_load(&self, error: PersistenceError) {
        lock(&self.load_failures).push_back(error);
    }

    pub fn fail_next_save(&self, error: PersistenceError) {
        lock(&self.save_failures).push_back(error);
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::Acquire)
    }

    /// Currently stored document, if any.
    pub fn stored(&self) -> Option<Document> {
        lock(&self.document).clone()
    }
}

#[async_trait]
impl DocumentRepository for InMemoryRepository {
    async fn load(&self) -> Result<Document, PersistenceError> {
        if let Some(err) = lock(&self.load_failures).pop_front() {
            return Err(err);
        }
        lock(&self.document).clone().ok_or(PersistenceError::NotFound)
    }

    async fn save(&self, document: &Document) -> Result<(), PersistenceError> {
        if let Some(err) = lock(&self.save_failures).pop_front() {
            return Err(err);
        }

        if let Some(validator) = &self.validator {
            let messages = validator(document);
            if !messages.is_empty() {
                tracing::debug!(count = messages.len(), "document rejected by validator");
                return Err(PersistenceError::Validation { messages });
            }
        }

        *lock(&self.document) = Some(document.clone());
        self.saves.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
