//! Collection items and their identifiers.

use std::sync::Arc;

use serde_json::Value;

/// Record with an optional string identifier.
pub trait HasId {
    fn id(&self) -> Option<&str>;
    fn set_id(&mut self, id: String);
}

type Getter<T> = Arc<dyn Fn(&T) -> Option<String> + Send + Sync>;
type Setter<T> = Arc<dyn Fn(&mut T, String) + Send + Sync>;

/// Accessor for the identifier field of `T`.
///
/// An empty identifier counts as missing.
pub struct IdField<T> {
    name: String,
    get: Getter<T>,
    set: Setter<T>,
}

impl<T> Clone for IdField<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            get: Arc::clone(&self.get),
            set: Arc::clone(&self.set),
        }
    }
}

impl<T> core::fmt::Debug for IdField<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("IdField").field("name", &self.name).finish()
    }
}

impl<T> IdField<T> {
    pub fn new(
        name: impl Into<String>,
        get: impl Fn(&T) -> Option<String> + Send + Sync + 'static,
        set: impl Fn(&mut T, String) + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            get: Arc::new(get),
            set: Arc::new(set),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, item: &T) -> Option<String> {
        (self.get)(item).filter(|id| !id.is_empty())
    }

    pub fn set(&self, item: &mut T, id: String) {
        (self.set)(item, id)
    }

    pub fn matches(&self, item: &T, id: &str) -> bool {
        self.get(item).as_deref() == Some(id)
    }
}

impl<T: HasId + 'static> Default for IdField<T> {
    fn default() -> Self {
        Self::new("id", |item: &T| item.id().map(str::to_string), T::set_id)
    }
}

impl IdField<Value> {
    /// Identifier stored under `name` in a JSON object.
    ///
    /// String and numeric ids are both recognised; generated ids are written
    /// as strings. Non-object values have no id and ignore writes.
    pub fn json(name: impl Into<String>) -> Self {
        let name = name.into();
        let key = name.clone();
        let get = move |item: &Value| match item.get(&key) {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };
        let key = name.clone();
        let set = move |item: &mut Value, id: String| {
            if let Some(object) = item.as_object_mut() {
                object.insert(key.clone(), Value::String(id));
            }
        };
        Self::new(name, get, set)
    }
}

/// Target of a remove/edit: position or identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ItemRef {
    Index(usize),
    Id(String),
}

impl From<usize> for ItemRef {
    fn from(index: usize) -> Self {
        ItemRef::Index(index)
    }
}

impl From<&str> for ItemRef {
    fn from(id: &str) -> Self {
        ItemRef::Id(id.to_string())
    }
}

impl From<String> for ItemRef {
    fn from(id: String) -> Self {
        ItemRef::Id(id)
    }
}

impl core::fmt::Display for ItemRef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ItemRef::Index(i) => write!(f, "#{i}"),
            ItemRef::Id(id) => f.write_str(id),
        }
    }
}
