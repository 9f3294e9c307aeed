//! Resume editor facade.
//!
//! Owns the shared document cell and one controller per section. The
//! document type has no knowledge of the sections; the editor decodes every
//! section up front and only then hydrates, so a corrupt section leaves the
//! editor state untouched.

use std::sync::Arc;

use resumeforge_collection::IdField;
use resumeforge_core::{IdGenerator, Signal, UuidGenerator, ValidationResult};
use resumeforge_errors::ErrorStore;
use resumeforge_persistence::{Document, DocumentRepository, PersistenceError};
use resumeforge_validation::{I18n, Translator};

use crate::basics::BasicsSection;
use crate::config::SectionsConfig;
use crate::models::{AwardEntry, Basics, EducationEntry, SectionItem, SkillEntry, WorkEntry};
use crate::section::{CollectionSection, SectionContext};

/// Every typed section decoded from one document.
struct Decoded {
    document: Document,
    basics: Basics,
    work: Vec<WorkEntry>,
    education: Vec<EducationEntry>,
    skills: Vec<SkillEntry>,
    awards: Vec<AwardEntry>,
}

impl Decoded {
    fn from_document(document: Document) -> Result<Self, PersistenceError> {
        Ok(Self {
            basics: document.section(Basics::SECTION)?.unwrap_or_default(),
            work: list(&document)?,
            education: list(&document)?,
            skills: list(&document)?,
            awards: list(&document)?,
            document,
        })
    }
}

fn list<T: SectionItem>(document: &Document) -> Result<Vec<T>, PersistenceError> {
    Ok(document.section(T::SECTION)?.unwrap_or_default())
}

pub struct ResumeEditor {
    ctx: SectionContext,
    config: SectionsConfig,
    locale: Signal<String>,
    basics: BasicsSection,
    work: CollectionSection<WorkEntry>,
    education: CollectionSection<EducationEntry>,
    skills: CollectionSection<SkillEntry>,
    awards: CollectionSection<AwardEntry>,
}

impl core::fmt::Debug for ResumeEditor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ResumeEditor")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ResumeEditor {
    pub fn new(repository: Arc<dyn DocumentRepository>, store: ErrorStore, config: SectionsConfig) -> Self {
        Self::with_id_generator(repository, store, config, Arc::new(UuidGenerator))
    }

    pub fn with_id_generator(
        repository: Arc<dyn DocumentRepository>,
        store: ErrorStore,
        config: SectionsConfig,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        let ctx = SectionContext::new(repository, store, config.execute_options(), ids);

        Self {
            locale: Signal::new(config.locale.clone()),
            basics: BasicsSection::new(ctx.clone()),
            work: CollectionSection::typed(ctx.clone()),
            education: CollectionSection::typed(ctx.clone()),
            skills: CollectionSection::typed(ctx.clone()),
            awards: CollectionSection::typed(ctx.clone()),
            config,
            ctx,
        }
    }

    /// Localize basics field messages, following [`locale`](Self::locale).
    pub fn with_translator(mut self, translator: Arc<dyn Translator>) -> Self {
        self.basics = self.basics.with_i18n(I18n::new(translator, self.locale.clone()));
        self
    }

    pub fn config(&self) -> &SectionsConfig {
        &self.config
    }

    pub fn locale(&self) -> &Signal<String> {
        &self.locale
    }

    pub fn document(&self) -> &Signal<Document> {
        &self.ctx.document
    }

    pub fn store(&self) -> &ErrorStore {
        &self.ctx.store
    }

    pub fn basics(&self) -> &BasicsSection {
        &self.basics
    }

    pub fn work(&self) -> &CollectionSection<WorkEntry> {
        &self.work
    }

    pub fn education(&self) -> &CollectionSection<EducationEntry> {
        &self.education
    }

    pub fn skills(&self) -> &CollectionSection<SkillEntry> {
        &self.skills
    }

    pub fn awards(&self) -> &CollectionSection<AwardEntry> {
        &self.awards
    }

    /// Untyped list section keyed by the configured identifier field.
    ///
    /// The section shares the editor's document and collaborators but is not
    /// hydrated by [`load`](Self::load); call `hydrate` or `load` on it.
    pub fn json_section(&self, name: &str) -> CollectionSection<serde_json::Value> {
        CollectionSection::new(
            self.ctx.clone(),
            name,
            IdField::json(self.config.id_field.clone()),
            || serde_json::Value::Object(Default::default()),
            |item: &serde_json::Value| ValidationResult::success(item.clone()),
        )
    }

    /// Load the document and hydrate every section.
    pub async fn load(&self) -> anyhow::Result<bool> {
        let _writes = self.ctx.write_lock().await;
        let repository = Arc::clone(&self.ctx.repository);
        let decoded = self
            .ctx
            .store
            .execute_with_error_handling(
                async move { Decoded::from_document(repository.load().await?) },
                self.ctx.options,
            )
            .await?;
        Ok(self.adopt(decoded))
    }

    /// Replace the stored document with `json` and hydrate from it.
    pub async fn import(&self, json: &str) -> anyhow::Result<bool> {
        let _writes = self.ctx.write_lock().await;
        let repository = Arc::clone(&self.ctx.repository);
        let decoded = self
            .ctx
            .store
            .execute_with_error_handling(
                async move {
                    let raw = serde_json::from_str(json)?;
                    let decoded = Decoded::from_document(Document::from_raw(raw)?)?;
                    repository.save(&decoded.document).await?;
                    Ok::<_, PersistenceError>(decoded)
                },
                self.ctx.options,
            )
            .await?;
        Ok(self.adopt(decoded))
    }

    /// Stored document as pretty JSON.
    pub async fn export(&self) -> anyhow::Result<Option<String>> {
        let repository = Arc::clone(&self.ctx.repository);
        self.ctx
            .store
            .execute_with_error_handling(async move { repository.export().await }, self.ctx.options)
            .await
    }

    fn adopt(&self, decoded: Option<Decoded>) -> bool {
        let Some(decoded) = decoded else {
            return false;
        };

        self.basics.replace(decoded.basics);
        self.work.items().set(decoded.work);
        self.education.items().set(decoded.education);
        self.skills.items().set(decoded.skills);
        self.awards.items().set(decoded.awards);
        self.ctx.document.set(decoded.document);
        tracing::info!("resume loaded");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use resumeforge_core::SequentialIdGenerator;
    use resumeforge_errors::{ErrorSource, InfrastructureErrorMapper};
    use async_trait::async_trait;
    use resumeforge_persistence::InMemoryRepository;
    use serde_json::json;

    /// Suspends once inside every save so concurrent writers interleave.
    struct YieldingRepository(InMemoryRepository);

    #[async_trait]
    impl DocumentRepository for YieldingRepository {
        async fn load(&self) -> Result<Document, PersistenceError> {
            self.0.load().await
        }

        async fn save(&self, document: &Document) -> Result<(), PersistenceError> {
            tokio::task::yield_now().await;
            self.0.save(document).await
        }
    }

    fn editor(repo: Arc<InMemoryRepository>, store: ErrorStore) -> ResumeEditor {
        ResumeEditor::with_id_generator(
            repo,
            store,
            SectionsConfig::default(),
            Arc::new(SequentialIdGenerator::new("item")),
        )
    }

    fn sample() -> Document {
        Document::from_raw(json!({
            "basics": { "name": "Ada", "email": "ada@example.com" },
            "work": [{ "id": "w-1", "name": "Analytical Engines", "position": "Programmer" }],
            "skills": [{ "id": "s-1", "name": "Mathematics", "keywords": ["calculus"] }],
            "projects": [{ "id": "p-1", "name": "Note G" }]
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn load_hydrates_every_section() {
        let repo = Arc::new(InMemoryRepository::with_document(sample()));
        let editor = editor(repo, ErrorStore::new());

        assert!(editor.load().await.unwrap());
        assert_eq!(editor.basics().draft().get().name, "Ada");
        assert_eq!(editor.work().items().get().len(), 1);
        assert_eq!(editor.skills().items().get()[0].keywords, ["calculus"]);
        assert!(editor.education().items().get().is_empty());
        assert!(editor.awards().items().get().is_empty());
    }

    #[tokio::test]
    async fn missing_document_is_recorded_as_info() {
        let store = ErrorStore::with_mapper(Arc::new(InfrastructureErrorMapper::default()));
        let editor = editor(Arc::new(InMemoryRepository::new()), store);

        assert!(!editor.load().await.unwrap());
        let error = editor.store().last_error().unwrap();
        assert_eq!(error.severity, resumeforge_core::Severity::Info);
        assert_eq!(error.source, ErrorSource::Infrastructure);
    }

    #[tokio::test]
    async fn corrupt_section_leaves_state_untouched() {
        let mut document = sample();
        document.set_field("awards", json!("not a list"));
        let repo = Arc::new(InMemoryRepository::with_document(document));
        let editor = editor(repo, ErrorStore::new());

        assert!(!editor.load().await.unwrap());
        assert!(editor.work().items().get().is_empty());
        assert_eq!(editor.document().get(), Document::new());
        assert_eq!(editor.store().errors().len(), 1);
    }

    #[tokio::test]
    async fn sections_share_one_document() {
        let repo = Arc::new(InMemoryRepository::with_document(sample()));
        let editor = editor(Arc::clone(&repo), ErrorStore::new());
        editor.load().await.unwrap();

        let award = AwardEntry {
            title: "Turing Award".to_string(),
            date: "1966".to_string(),
            ..AwardEntry::default()
        };
        assert!(editor.awards().add(Some(award)).await.unwrap());
        editor.basics().update_draft(|b| b.label = "Programmer".to_string());
        assert!(editor.basics().save().await.unwrap());

        let stored = repo.stored().unwrap();
        assert_eq!(stored.field("awards").unwrap()[0]["id"], "item-1");
        assert_eq!(stored.field("basics").unwrap()["label"], "Programmer");
        assert_eq!(stored.field("projects"), sample().field("projects"));
    }

    #[tokio::test]
    async fn import_then_export_round_trips() {
        let repo = Arc::new(InMemoryRepository::new());
        let editor = editor(Arc::clone(&repo), ErrorStore::new());

        let json = serde_json::to_string(&sample().to_json()).unwrap();
        assert!(editor.import(&json).await.unwrap());
        assert_eq!(editor.work().items().get()[0].id.as_deref(), Some("w-1"));

        let exported = editor.export().await.unwrap().unwrap();
        let reparsed: serde_json::Value = serde_json::from_str(&exported).unwrap();
        assert_eq!(reparsed, sample().to_json());
    }

    #[tokio::test]
    async fn malformed_import_is_recorded() {
        let editor = editor(Arc::new(InMemoryRepository::new()), ErrorStore::new());
        assert!(!editor.import("[1, 2]").await.unwrap());
        assert!(editor.store().has_errors());
    }

    #[tokio::test]
    async fn json_section_uses_configured_id_field() {
        let repo = Arc::new(InMemoryRepository::with_document(sample()));
        let editor = editor(Arc::clone(&repo), ErrorStore::new());
        let projects = editor.json_section("projects");

        assert!(projects.load().await.unwrap());
        assert!(projects.remove("p-1").await.unwrap());
        assert_eq!(repo.stored().unwrap().field("projects"), Some(&json!([])));
    }

    #[tokio::test]
    async fn concurrent_saves_from_different_sections_are_all_kept() {
        let repo = Arc::new(YieldingRepository(InMemoryRepository::with_document(sample())));
        let editor = ResumeEditor::with_id_generator(
            Arc::clone(&repo) as _,
            ErrorStore::new(),
            SectionsConfig::default(),
            Arc::new(SequentialIdGenerator::new("item")),
        );
        editor.load().await.unwrap();

        let skill = SkillEntry {
            name: "Rust".to_string(),
            ..SkillEntry::default()
        };
        let award = AwardEntry {
            title: "Lovelace Medal".to_string(),
            ..AwardEntry::default()
        };
        let (skills, awards) = tokio::join!(editor.skills().add(Some(skill)), editor.awards().add(Some(award)));
        assert!(skills.unwrap());
        assert!(awards.unwrap());

        let stored = repo.0.stored().unwrap();
        assert_eq!(stored.field("skills").unwrap().as_array().unwrap().len(), 2);
        assert_eq!(stored.field("awards").unwrap().as_array().unwrap().len(), 1);
        assert_eq!(editor.document().get(), stored);
        assert!(editor.store().errors().is_empty());
    }
}
