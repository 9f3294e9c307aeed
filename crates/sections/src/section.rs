//! List section controllers.
//!
//! A [`CollectionSection`] binds one list field of the shared document to a
//! [`CollectionController`] and persists every change through the error
//! store's `execute_with_error_handling` chokepoint:
//!
//! 1. refuse to start while another operation of this section is pending
//! 2. snapshot the current list and staging area
//! 3. mutate optimistically through the controller
//! 4. under the context's write lock, write the new list into the latest
//!    document and save it
//! 5. on failure restore the snapshot; the store holds the error record
//!
//! Sections share one document, so writes from different sections queue on
//! the lock instead of overwriting each other.

use std::sync::Arc;

use serde::{Serialize, de::DeserializeOwned};
use tokio::sync::{Mutex, MutexGuard};

use resumeforge_collection::{CollectionController, IdField, ItemRef};
use resumeforge_core::{IdGenerator, Signal, ValidationResult};
use resumeforge_errors::{ErrorStore, ExecuteOptions};
use resumeforge_persistence::{Document, DocumentRepository, PersistenceError};

use crate::models::SectionItem;

/// Collaborators shared by every section of one editor.
#[derive(Clone)]
pub struct SectionContext {
    pub document: Signal<Document>,
    pub repository: Arc<dyn DocumentRepository>,
    pub store: ErrorStore,
    pub options: ExecuteOptions,
    pub ids: Arc<dyn IdGenerator>,
    writes: Arc<Mutex<()>>,
}

impl SectionContext {
    pub fn new(
        repository: Arc<dyn DocumentRepository>,
        store: ErrorStore,
        options: ExecuteOptions,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        Self {
            document: Signal::default(),
            repository,
            store,
            options,
            ids,
            writes: Arc::default(),
        }
    }

    /// Serializes every read-modify-write of the shared document.
    pub(crate) async fn write_lock(&self) -> MutexGuard<'_, ()> {
        self.writes.lock().await
    }
}

impl core::fmt::Debug for SectionContext {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SectionContext")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Sets the loading flag for the lifetime of one operation.
pub(crate) struct LoadingGuard<'a>(&'a Signal<bool>);

impl<'a> LoadingGuard<'a> {
    /// `None` when an operation is already in flight.
    pub(crate) fn acquire(loading: &'a Signal<bool>) -> Option<Self> {
        let mut acquired = false;
        loading.update(|busy| {
            if !*busy {
                *busy = true;
                acquired = true;
            }
        });
        acquired.then_some(Self(loading))
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// State restored when a save fails.
struct Snapshot<T> {
    items: Vec<T>,
    staged: Option<(T, bool)>,
}

/// Controller for one list-shaped section of the document.
pub struct CollectionSection<T> {
    name: String,
    ctx: SectionContext,
    items: Signal<Vec<T>>,
    loading: Signal<bool>,
    controller: CollectionController<T>,
}

impl<T> core::fmt::Debug for CollectionSection<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CollectionSection")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl<T: SectionItem> CollectionSection<T> {
    /// Section for a typed entry, stored under `T::SECTION`.
    pub fn typed(ctx: SectionContext) -> Self {
        Self::new(ctx, T::SECTION, IdField::default(), T::default, T::validate)
    }
}

impl<T> CollectionSection<T>
where
    T: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    pub fn new(
        ctx: SectionContext,
        name: impl Into<String>,
        id_field: IdField<T>,
        default_item: impl Fn() -> T + Send + Sync + 'static,
        validator: impl Fn(&T) -> ValidationResult<T> + Send + Sync + 'static,
    ) -> Self {
        let name = name.into();
        let items = Signal::new(Vec::new());
        let sink = items.clone();
        let controller = CollectionController::new(
            name.clone(),
            items.clone(),
            id_field,
            default_item,
            move |_: &str, list: Vec<T>| sink.set(list),
        )
        .with_validator(validator)
        .with_id_generator(Arc::clone(&ctx.ids));

        Self {
            name,
            ctx,
            items,
            loading: Signal::new(false),
            controller,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn items(&self) -> &Signal<Vec<T>> {
        &self.items
    }

    pub fn loading(&self) -> &Signal<bool> {
        &self.loading
    }

    /// Staging area, edit target and validation errors.
    pub fn controller(&self) -> &CollectionController<T> {
        &self.controller
    }

    /// Replace the list with the section stored in `document`.
    pub fn hydrate(&self, document: &Document) -> Result<(), PersistenceError> {
        let items = document.section::<Vec<T>>(&self.name)?.unwrap_or_default();
        self.items.set(items);
        Ok(())
    }

    /// Load the document and hydrate this section from it.
    pub async fn load(&self) -> anyhow::Result<bool> {
        let Some(_guard) = self.begin("load") else {
            return Ok(false);
        };

        let _writes = self.ctx.write_lock().await;
        let repository = Arc::clone(&self.ctx.repository);
        let loaded = self
            .ctx
            .store
            .execute_with_error_handling(
                async move {
                    let document = repository.load().await?;
                    let items = document.section::<Vec<T>>(&self.name)?.unwrap_or_default();
                    Ok::<_, PersistenceError>((document, items))
                },
                self.ctx.options,
            )
            .await?;

        match loaded {
            Some((document, items)) => {
                self.ctx.document.set(document);
                self.items.set(items);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Validate, append and save. `false` if the item was rejected or the
    /// save failed.
    pub async fn add(&self, item: Option<T>) -> anyhow::Result<bool> {
        let Some(_guard) = self.begin("add") else {
            return Ok(false);
        };

        // Staged item and open form come back if the save fails.
        let snapshot = Snapshot {
            items: self.items.get(),
            staged: item
                .is_none()
                .then(|| (self.controller.new_item().get(), self.controller.is_adding().get())),
        };
        if self.controller.add_item(item).is_failure() {
            return Ok(false);
        }
        self.persist(snapshot).await
    }

    pub async fn update(&self, id: &str, item: T) -> anyhow::Result<bool> {
        let Some(_guard) = self.begin("update") else {
            return Ok(false);
        };

        let snapshot = self.snapshot();
        if self.controller.update_item(id, item).is_failure() {
            return Ok(false);
        }
        self.persist(snapshot).await
    }

    pub async fn remove(&self, target: impl Into<ItemRef>) -> anyhow::Result<bool> {
        let Some(_guard) = self.begin("remove") else {
            return Ok(false);
        };

        let snapshot = self.snapshot();
        if !self.controller.remove_item(target) {
            return Ok(false);
        }
        self.persist(snapshot).await
    }

    pub async fn reorder<S: AsRef<str>>(&self, ids: &[S]) -> anyhow::Result<bool> {
        let Some(_guard) = self.begin("reorder") else {
            return Ok(false);
        };

        let snapshot = self.snapshot();
        if !self.controller.reorder_items(ids) {
            return Ok(false);
        }
        self.persist(snapshot).await
    }

    pub async fn move_item(&self, from: usize, to: usize) -> anyhow::Result<bool> {
        let Some(_guard) = self.begin("move") else {
            return Ok(false);
        };

        let snapshot = self.snapshot();
        if !self.controller.move_item(from, to) {
            return Ok(false);
        }
        self.persist(snapshot).await
    }

    fn begin(&self, operation: &'static str) -> Option<LoadingGuard<'_>> {
        let guard = LoadingGuard::acquire(&self.loading);
        if guard.is_none() {
            tracing::warn!(section = %self.name, operation, "operation already in progress");
        }
        guard
    }

    fn snapshot(&self) -> Snapshot<T> {
        Snapshot {
            items: self.items.get(),
            staged: None,
        }
    }

    async fn persist(&self, snapshot: Snapshot<T>) -> anyhow::Result<bool> {
        let _writes = self.ctx.write_lock().await;
        let items = self.items.get();
        let mut document = self.ctx.document.get();
        let repository = Arc::clone(&self.ctx.repository);

        let saved = self
            .ctx
            .store
            .execute_with_error_handling(
                async move {
                    document.set_section(self.name.as_str(), &items)?;
                    repository.save(&document).await?;
                    Ok::<_, PersistenceError>(document)
                },
                self.ctx.options,
            )
            .await;

        match saved {
            Ok(Some(document)) => {
                self.ctx.document.set(document);
                Ok(true)
            }
            Ok(None) => {
                self.rollback(snapshot);
                Ok(false)
            }
            Err(err) => {
                self.rollback(snapshot);
                Err(err)
            }
        }
    }

    fn rollback(&self, snapshot: Snapshot<T>) {
        tracing::info!(section = %self.name, len = snapshot.items.len(), "rolling back optimistic update");
        self.items.set(snapshot.items);
        if let Some((new_item, is_adding)) = snapshot.staged {
            self.controller.new_item().set(new_item);
            self.controller.is_adding().set(is_adding);
        }
    }
}
