//! Generic collection field controller.
//!
//! Manages one named list field inside a larger document: add (with a
//! validation gate), remove, update, edit lifecycle, reorder and a staging
//! area for the item being composed.
//!
//! The list is read through an [`ItemsSource`] and every change is written by
//! passing a *copy* to the caller's `update_field` callback. The list is never
//! mutated in place, so the caller always observes a new list and can restore
//! the previous one on persistence failure.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use resumeforge_core::{
    ErrorLayer, IdGenerator, Signal, UuidGenerator, ValidationError, ValidationResult, codes,
};

use crate::item::{IdField, ItemRef};

type Validator<T> = Arc<dyn Fn(&T) -> ValidationResult<T> + Send + Sync>;
type UpdateField<T> = Arc<dyn Fn(&str, Vec<T>) + Send + Sync>;
type DefaultItem<T> = Arc<dyn Fn() -> T + Send + Sync>;

/// Read access to the canonical list, which the caller owns.
pub enum ItemsSource<T> {
    Signal(Signal<Vec<T>>),
    Getter(Arc<dyn Fn() -> Vec<T> + Send + Sync>),
}

impl<T: Clone + Send + Sync + 'static> ItemsSource<T> {
    pub fn getter(f: impl Fn() -> Vec<T> + Send + Sync + 'static) -> Self {
        ItemsSource::Getter(Arc::new(f))
    }

    pub fn read(&self) -> Vec<T> {
        match self {
            ItemsSource::Signal(signal) => signal.get(),
            ItemsSource::Getter(get) => get(),
        }
    }
}

impl<T> From<Signal<Vec<T>>> for ItemsSource<T> {
    fn from(signal: Signal<Vec<T>>) -> Self {
        ItemsSource::Signal(signal)
    }
}

/// Controller for a list field named `field_name`.
pub struct CollectionController<T> {
    field_name: String,
    items: ItemsSource<T>,
    id_field: IdField<T>,
    default_item: DefaultItem<T>,
    update_field: UpdateField<T>,
    validator: Validator<T>,
    ids: Arc<dyn IdGenerator>,

    new_item: Signal<T>,
    is_adding: Signal<bool>,
    editing_item_id: Signal<Option<String>>,
    validation_errors: Signal<BTreeMap<String, String>>,
    last_validation_result: Signal<Option<ValidationResult<T>>>,
}

impl<T> core::fmt::Debug for CollectionController<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CollectionController")
            .field("field_name", &self.field_name)
            .field("id_field", &self.id_field)
            .finish_non_exhaustive()
    }
}

impl<T: Clone + Send + Sync + 'static> CollectionController<T> {
    /// Controller accepting every item as-is, with UUIDv7 identifiers.
    pub fn new(
        field_name: impl Into<String>,
        items: impl Into<ItemsSource<T>>,
        id_field: IdField<T>,
        default_item: impl Fn() -> T + Send + Sync + 'static,
        update_field: impl Fn(&str, Vec<T>) + Send + Sync + 'static,
    ) -> Self {
        let new_item = Signal::new(default_item());
        Self {
            field_name: field_name.into(),
            items: items.into(),
            id_field,
            default_item: Arc::new(default_item),
            update_field: Arc::new(update_field),
            validator: Arc::new(|item: &T| ValidationResult::success(item.clone())),
            ids: Arc::new(UuidGenerator),
            new_item,
            is_adding: Signal::new(false),
            editing_item_id: Signal::new(None),
            validation_errors: Signal::default(),
            last_validation_result: Signal::new(None),
        }
    }

    /// Gate adds and updates behind `validator`.
    ///
    /// The validated value, not the submitted one, is what gets stored.
    pub fn with_validator(
        mut self,
        validator: impl Fn(&T) -> ValidationResult<T> + Send + Sync + 'static,
    ) -> Self {
        self.validator = Arc::new(validator);
        self
    }

    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    pub fn id_field(&self) -> &IdField<T> {
        &self.id_field
    }

    /// Current list, read through the source.
    pub fn items(&self) -> Vec<T> {
        self.items.read()
    }

    /// Item being composed in the add form.
    pub fn new_item(&self) -> &Signal<T> {
        &self.new_item
    }

    pub fn is_adding(&self) -> &Signal<bool> {
        &self.is_adding
    }

    pub fn editing_item_id(&self) -> &Signal<Option<String>> {
        &self.editing_item_id
    }

    /// Field → first message of the last failed validation.
    pub fn validation_errors(&self) -> &Signal<BTreeMap<String, String>> {
        &self.validation_errors
    }

    pub fn last_validation_result(&self) -> &Signal<Option<ValidationResult<T>>> {
        &self.last_validation_result
    }

    pub fn start_adding(&self) {
        self.new_item.set((self.default_item)());
        self.validation_errors.set(BTreeMap::new());
        self.is_adding.set(true);
    }

    pub fn cancel_adding(&self) {
        self.is_adding.set(false);
        self.new_item.set((self.default_item)());
        self.validation_errors.set(BTreeMap::new());
    }

    pub fn set_new_item(&self, item: T) {
        self.new_item.set(item);
    }

    pub fn update_new_item(&self, f: impl FnOnce(&mut T)) {
        self.new_item.update(f);
    }

    /// Run the validator and record its outcome.
    pub fn validate(&self, item: &T) -> ValidationResult<T> {
        let result = (self.validator)(item);

        let mut by_field = BTreeMap::new();
        for error in result.errors().iter().filter(|e| e.is_error()) {
            by_field
                .entry(error.field.clone())
                .or_insert_with(|| error.message.clone());
        }
        self.validation_errors.set(by_field);
        self.last_validation_result.set(Some(result.clone()));
        result
    }

    /// Validate and append `item`, or the staged new item when `None`.
    ///
    /// On failure nothing is written and `update_field` is not called. On
    /// success the stored value (with its identifier) is returned, the
    /// staging area is reset and the add form closed.
    pub fn add_item(&self, item: Option<T>) -> ValidationResult<T> {
        let candidate = item.unwrap_or_else(|| self.new_item.get());
        let (mut value, warnings) = match self.validate(&candidate) {
            ValidationResult::Success { value, warnings } => (value, warnings),
            failure => return failure,
        };

        if self.id_field.get(&value).is_none() {
            self.id_field.set(&mut value, self.ids.generate_id());
        }

        let mut list = self.items();
        list.push(value.clone());
        tracing::debug!(field = %self.field_name, len = list.len(), "item added");
        (self.update_field)(&self.field_name, list);

        self.new_item.set((self.default_item)());
        self.is_adding.set(false);
        ValidationResult::success_with_warnings(value, warnings)
    }

    /// Remove by index or identifier. Unresolved targets are a logged no-op.
    pub fn remove_item(&self, target: impl Into<ItemRef>) -> bool {
        let target = target.into();
        let mut list = self.items();
        let Some(index) = self.resolve(&list, &target) else {
            tracing::warn!(field = %self.field_name, target = %target, "remove: item not found");
            return false;
        };

        let removed = list.remove(index);
        if let Some(id) = self.id_field.get(&removed) {
            if self.editing_item_id.with(|editing| editing.as_deref() == Some(id.as_str())) {
                self.editing_item_id.set(None);
            }
        }
        (self.update_field)(&self.field_name, list);
        true
    }

    /// Validate and replace the item with identifier `id`.
    ///
    /// The stored item keeps `id` whatever identifier `item` carries.
    pub fn update_item(&self, id: &str, item: T) -> ValidationResult<T> {
        let (mut value, warnings) = match self.validate(&item) {
            ValidationResult::Success { value, warnings } => (value, warnings),
            failure => return failure,
        };

        let mut list = self.items();
        let Some(index) = list.iter().position(|i| self.id_field.matches(i, id)) else {
            tracing::warn!(field = %self.field_name, id, "update: item not found");
            return ValidationResult::failure(
                ValidationError::new(
                    codes::ITEM_NOT_FOUND,
                    format!("No item with {} '{id}'", self.id_field.name()),
                    self.id_field.name(),
                )
                .in_layer(ErrorLayer::Application)
                .with_i18n("validation.itemNotFound")
                .with_i18n_param("id", id),
            );
        };

        self.id_field.set(&mut value, id.to_string());
        list[index] = value.clone();
        (self.update_field)(&self.field_name, list);
        self.editing_item_id.set(None);
        ValidationResult::success_with_warnings(value, warnings)
    }

    /// Mark an item as the edit target and return a copy of it.
    pub fn start_editing(&self, target: impl Into<ItemRef>) -> Option<T> {
        let target = target.into();
        let list = self.items();
        let Some(index) = self.resolve(&list, &target) else {
            tracing::warn!(field = %self.field_name, target = %target, "edit: item not found");
            return None;
        };

        let item = list[index].clone();
        self.editing_item_id.set(self.id_field.get(&item));
        Some(item)
    }

    pub fn cancel_editing(&self) {
        self.editing_item_id.set(None);
        self.validation_errors.set(BTreeMap::new());
    }

    /// Rebuild the list in the order given by `ids`.
    ///
    /// Identifiers that do not resolve are dropped; if the rebuilt list is not
    /// a permutation of the current one, nothing is written and `false` is
    /// returned.
    pub fn reorder_items<S: AsRef<str>>(&self, ids: &[S]) -> bool {
        let current = self.items();
        let mut seen = HashSet::new();
        let mut reordered = Vec::with_capacity(ids.len());

        for id in ids {
            let id = id.as_ref();
            match current.iter().find(|item| self.id_field.matches(item, id)) {
                Some(item) if seen.insert(id) => reordered.push(item.clone()),
                Some(_) => tracing::warn!(field = %self.field_name, id, "reorder: duplicate id"),
                None => tracing::warn!(field = %self.field_name, id, "reorder: unknown id dropped"),
            }
        }

        if reordered.len() != current.len() {
            tracing::warn!(
                field = %self.field_name,
                expected = current.len(),
                resolved = reordered.len(),
                "reorder rejected"
            );
            return false;
        }

        (self.update_field)(&self.field_name, reordered);
        true
    }

    /// Move the item at `from` to position `to`.
    pub fn move_item(&self, from: usize, to: usize) -> bool {
        let current = self.items();
        if from >= current.len() || to >= current.len() {
            tracing::warn!(field = %self.field_name, from, to, "move: index out of range");
            return false;
        }

        let mut ids: Vec<String> = current
            .iter()
            .filter_map(|item| self.id_field.get(item))
            .collect();
        if ids.len() != current.len() {
            tracing::warn!(field = %self.field_name, "move: items without identifiers");
            return false;
        }

        let id = ids.remove(from);
        ids.insert(to, id);
        self.reorder_items(&ids)
    }

    fn resolve(&self, list: &[T], target: &ItemRef) -> Option<usize> {
        match target {
            ItemRef::Index(i) => (*i < list.len()).then_some(*i),
            ItemRef::Id(id) => list.iter().position(|item| self.id_field.matches(item, id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::HasId;
    use resumeforge_core::SequentialIdGenerator;
    use std::sync::Mutex;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Skill {
        id: Option<String>,
        name: String,
    }

    impl HasId for Skill {
        fn id(&self) -> Option<&str> {
            self.id.as_deref()
        }

        fn set_id(&mut self, id: String) {
            self.id = Some(id);
        }
    }

    fn skill(id: &str, name: &str) -> Skill {
        Skill {
            id: Some(id.to_string()),
            name: name.to_string(),
        }
    }

    fn require_name(skill: &Skill) -> ValidationResult<Skill> {
        if skill.name.trim().is_empty() {
            ValidationResult::failure(ValidationError::required("name"))
        } else {
            let mut normalized = skill.clone();
            normalized.name = skill.name.trim().to_string();
            ValidationResult::success(normalized)
        }
    }

    struct Fixture {
        list: Signal<Vec<Skill>>,
        calls: Arc<Mutex<Vec<(String, usize)>>>,
        controller: CollectionController<Skill>,
    }

    fn fixture(initial: Vec<Skill>) -> Fixture {
        let list = Signal::new(initial);
        let calls = Arc::new(Mutex::new(Vec::new()));

        let sink = list.clone();
        let log = Arc::clone(&calls);
        let controller = CollectionController::new(
            "skills",
            list.clone(),
            IdField::default(),
            Skill::default,
            move |field: &str, items: Vec<Skill>| {
                log.lock().unwrap().push((field.to_string(), items.len()));
                sink.set(items);
            },
        )
        .with_validator(require_name)
        .with_id_generator(Arc::new(SequentialIdGenerator::new("skill")));

        Fixture {
            list,
            calls,
            controller,
        }
    }

    fn ids(list: &Signal<Vec<Skill>>) -> Vec<String> {
        list.get().into_iter().filter_map(|s| s.id).collect()
    }

    #[test]
    fn add_invalid_item_is_gated() {
        let f = fixture(vec![]);
        let result = f.controller.add_item(Some(Skill::default()));

        assert!(result.is_failure());
        assert!(f.list.get().is_empty());
        assert!(f.controller.validation_errors().get().contains_key("name"));
        assert!(f.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn add_valid_item_appends_with_generated_id() {
        let f = fixture(vec![skill("a", "Go")]);
        f.controller.start_adding();
        let result = f.controller.add_item(Some(Skill {
            id: None,
            name: "  Rust ".to_string(),
        }));

        let stored = result.value().cloned().unwrap();
        assert_eq!(stored.id.as_deref(), Some("skill-1"));
        assert_eq!(stored.name, "Rust");
        assert_eq!(f.list.get().len(), 2);
        assert_eq!(f.list.get()[1], stored);
        assert_eq!(*f.calls.lock().unwrap(), vec![("skills".to_string(), 2)]);
        assert!(!f.controller.is_adding().get());
    }

    #[test]
    fn add_without_argument_uses_staged_item_and_resets_it() {
        let f = fixture(vec![]);
        f.controller.start_adding();
        f.controller.update_new_item(|s| s.name = "Rust".to_string());

        assert!(f.controller.add_item(None).is_success());
        assert_eq!(f.list.get()[0].name, "Rust");
        assert_eq!(f.controller.new_item().get(), Skill::default());
    }

    #[test]
    fn add_keeps_existing_id() {
        let f = fixture(vec![]);
        f.controller.add_item(Some(skill("mine", "Rust")));
        assert_eq!(ids(&f.list), ["mine"]);
    }

    #[test]
    fn remove_by_id_and_index() {
        let f = fixture(vec![skill("a", "Go"), skill("b", "Rust"), skill("c", "Zig")]);
        assert!(f.controller.remove_item("b"));
        assert_eq!(ids(&f.list), ["a", "c"]);
        assert!(f.controller.remove_item(0));
        assert_eq!(ids(&f.list), ["c"]);
    }

    #[test]
    fn remove_missing_id_is_a_no_op() {
        let f = fixture(vec![skill("a", "Go"), skill("b", "Rust")]);
        assert!(!f.controller.remove_item("missing-id"));
        assert!(!f.controller.remove_item(9));
        assert_eq!(ids(&f.list), ["a", "b"]);
        assert!(f.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn update_preserves_original_id_and_clears_edit_target() {
        let f = fixture(vec![skill("a", "Go"), skill("b", "Rust")]);
        let mut draft = f.controller.start_editing("b").unwrap();
        assert_eq!(f.controller.editing_item_id().get().as_deref(), Some("b"));

        draft.name = "Rust 2024".to_string();
        draft.id = Some("hijacked".to_string());
        let result = f.controller.update_item("b", draft);

        assert!(result.is_success());
        assert_eq!(f.list.get()[1], skill("b", "Rust 2024"));
        assert!(f.controller.editing_item_id().get().is_none());
    }

    #[test]
    fn update_unknown_id_fails_without_writing() {
        let f = fixture(vec![skill("a", "Go")]);
        let result = f.controller.update_item("zzz", skill("zzz", "Rust"));
        assert_eq!(result.errors()[0].code, codes::ITEM_NOT_FOUND);
        assert!(f.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn update_invalid_item_is_gated() {
        let f = fixture(vec![skill("a", "Go")]);
        assert!(f.controller.update_item("a", skill("a", " ")).is_failure());
        assert_eq!(f.list.get()[0].name, "Go");
    }

    #[test]
    fn start_editing_returns_a_copy() {
        let f = fixture(vec![skill("a", "Go")]);
        let mut copy = f.controller.start_editing(0).unwrap();
        copy.name = "changed".to_string();
        assert_eq!(f.list.get()[0].name, "Go");
    }

    #[test]
    fn cancel_editing_clears_target_and_errors() {
        let f = fixture(vec![skill("a", "Go")]);
        f.controller.start_editing("a");
        f.controller.update_item("a", skill("a", ""));
        f.controller.cancel_editing();
        assert!(f.controller.editing_item_id().get().is_none());
        assert!(f.controller.validation_errors().get().is_empty());
        assert_eq!(f.list.get()[0].name, "Go");
    }

    #[test]
    fn reorder_with_full_permutation_applies() {
        let f = fixture(vec![skill("a", "Go"), skill("b", "Rust"), skill("c", "Zig")]);
        assert!(f.controller.reorder_items(&["c", "a", "b"]));
        assert_eq!(ids(&f.list), ["c", "a", "b"]);
    }

    // Unknown ids are dropped before the length check; a stale order that
    // happens to resolve to the right length would lose the unnamed items.
    #[test]
    fn reorder_with_unknown_id_is_a_no_op() {
        let f = fixture(vec![skill("a", "Go"), skill("b", "Rust")]);
        assert!(!f.controller.reorder_items(&["a", "ghost"]));
        assert_eq!(ids(&f.list), ["a", "b"]);
        assert!(f.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn reorder_with_duplicate_id_is_a_no_op() {
        let f = fixture(vec![skill("a", "Go"), skill("b", "Rust")]);
        assert!(!f.controller.reorder_items(&["a", "a"]));
        assert_eq!(ids(&f.list), ["a", "b"]);
    }

    #[test]
    fn move_item_reorders_by_position() {
        let f = fixture(vec![skill("a", "Go"), skill("b", "Rust"), skill("c", "Zig")]);
        assert!(f.controller.move_item(0, 2));
        assert_eq!(ids(&f.list), ["b", "c", "a"]);
        assert!(!f.controller.move_item(0, 3));
    }

    #[test]
    fn getter_source_is_read_on_every_call() {
        let backing = Arc::new(Mutex::new(vec![skill("a", "Go")]));
        let read = Arc::clone(&backing);
        let write = Arc::clone(&backing);
        let controller = CollectionController::new(
            "skills",
            ItemsSource::getter(move || read.lock().unwrap().clone()),
            IdField::default(),
            Skill::default,
            move |_: &str, items: Vec<Skill>| *write.lock().unwrap() = items,
        );

        backing.lock().unwrap().push(skill("b", "Rust"));
        assert_eq!(controller.items().len(), 2);
        assert!(controller.remove_item("a"));
        assert_eq!(backing.lock().unwrap().len(), 1);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn list_of(n: usize) -> Vec<Skill> {
            (0..n).map(|i| skill(&format!("s{i}"), "x")).collect()
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 128,
                ..ProptestConfig::default()
            })]

            /// Property: a successful reorder is a permutation of the list.
            #[test]
            fn reorder_never_loses_items(
                n in 1usize..8,
                order in proptest::collection::vec(0usize..10, 0..10),
            ) {
                let f = fixture(list_of(n));
                let before = ids(&f.list);
                let requested: Vec<String> = order.iter().map(|i| format!("s{i}")).collect();

                let applied = f.controller.reorder_items(&requested);
                let mut after = ids(&f.list);
                prop_assert_eq!(after.len(), before.len());
                if !applied {
                    prop_assert_eq!(&after, &before);
                }
                after.sort();
                let mut sorted = before.clone();
                sorted.sort();
                prop_assert_eq!(after, sorted);
            }

            /// Property: remove shrinks the list by one iff the target resolves.
            #[test]
            fn remove_changes_length_by_at_most_one(n in 0usize..6, target in 0usize..8) {
                let f = fixture(list_of(n));
                let removed = f.controller.remove_item(format!("s{target}"));
                prop_assert_eq!(removed, target < n);
                let expected = if removed { n - 1 } else { n };
                prop_assert_eq!(f.list.get().len(), expected);
            }
        }
    }
}
