//! Basics section: a single object edited as a draft.
//!
//! Field-level feedback comes from a [`ValidationState`] fed by every
//! `validate`/`save`; dirty flags survive re-validation so inline errors only
//! show for inputs the user has touched.

use std::sync::Arc;

use resumeforge_core::{Signal, ValidationResult};
use resumeforge_persistence::PersistenceError;
use resumeforge_validation::{FieldValidationState, I18n, ValidationState};

use crate::models::Basics;
use crate::section::{LoadingGuard, SectionContext};

pub struct BasicsSection {
    ctx: SectionContext,
    draft: Signal<Basics>,
    validation: ValidationState<Basics>,
    loading: Signal<bool>,
}

impl core::fmt::Debug for BasicsSection {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BasicsSection")
            .field("draft", &self.draft)
            .finish_non_exhaustive()
    }
}

impl BasicsSection {
    pub fn new(ctx: SectionContext) -> Self {
        Self {
            ctx,
            draft: Default::default(),
            validation: ValidationState::new(),
            loading: Default::default(),
        }
    }

    /// Localize field messages through `i18n`.
    pub fn with_i18n(mut self, i18n: I18n) -> Self {
        self.validation = ValidationState::new().with_i18n(i18n);
        self
    }

    pub fn draft(&self) -> &Signal<Basics> {
        &self.draft
    }

    pub fn update_draft(&self, f: impl FnOnce(&mut Basics)) {
        self.draft.update(f);
    }

    pub fn validation(&self) -> &ValidationState<Basics> {
        &self.validation
    }

    pub fn loading(&self) -> &Signal<bool> {
        &self.loading
    }

    /// State of `field` (`"basics.name"`, `"basics.location.postalCode"`...).
    pub fn field(&self, field: &str) -> Arc<FieldValidationState<Basics>> {
        self.validation.field_state(field)
    }

    /// Mark `field` as touched by the user.
    pub fn touch(&self, field: &str) {
        self.validation.field_state(field).mark_dirty();
    }

    pub fn hydrate(&self, document: &resumeforge_persistence::Document) -> Result<(), PersistenceError> {
        let basics = document.section::<Basics>(Basics::SECTION)?.unwrap_or_default();
        self.replace(basics);
        Ok(())
    }

    pub(crate) fn replace(&self, basics: Basics) {
        self.draft.set(basics);
        self.validation.reset_result();
        self.validation.reset_all();
    }

    /// Validate the draft and publish the result to the field states.
    pub fn validate(&self) -> ValidationResult<Basics> {
        let result = self.draft.with(Basics::validate);
        self.validation.set_result(result.clone());
        result
    }

    /// Validate and save the draft. `false` if invalid, busy or the save failed.
    ///
    /// A failed save leaves the shared document untouched; the draft keeps the
    /// user's edits.
    pub async fn save(&self) -> anyhow::Result<bool> {
        let Some(_guard) = LoadingGuard::acquire(&self.loading) else {
            tracing::warn!(section = Basics::SECTION, "operation already in progress");
            return Ok(false);
        };

        let basics = match self.validate() {
            ValidationResult::Success { value, .. } => value,
            ValidationResult::Failure { errors } => {
                tracing::debug!(count = errors.len(), "basics rejected by validation");
                return Ok(false);
            }
        };

        let _writes = self.ctx.write_lock().await;
        let mut document = self.ctx.document.get();
        let repository = Arc::clone(&self.ctx.repository);
        let saved = self
            .ctx
            .store
            .execute_with_error_handling(
                async move {
                    document.set_section(Basics::SECTION, &basics)?;
                    repository.save(&document).await?;
                    Ok::<_, PersistenceError>((document, basics))
                },
                self.ctx.options,
            )
            .await?;

        match saved {
            Some((document, basics)) => {
                self.ctx.document.set(document);
                self.draft.set(basics);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
