//! The persisted document: a map of named sections.
//!
//! Section schemas are owned by the section controllers; this type only knows
//! that a document is a JSON object whose top-level keys are section names.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::PersistenceError;

/// Serialized form of a [`Document`].
pub type RawDocument = Value;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(Map<String, Value>);

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a raw document; anything but a JSON object is rejected.
    pub fn from_raw(raw: RawDocument) -> Result<Self, PersistenceError> {
        match raw {
            Value::Object(map) => Ok(Self(map)),
            other => Err(PersistenceError::validation([format!(
                "document: expected an object, found {}",
                json_kind(&other)
            )])),
        }
    }

    pub fn to_json(&self) -> RawDocument {
        Value::Object(self.0.clone())
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn set_field(&mut self, name: impl Into<String>, value: Value) {
        self.0.insert(name.into(), value);
    }

    pub fn remove_field(&mut self, name: &str) -> Option<Value> {
        self.0.remove(name)
    }

    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Typed view of a section. A missing (or `null`) section is `None`.
    pub fn section<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, PersistenceError> {
        match self.0.get(name) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => Ok(Some(serde_json::from_value(value.clone())?)),
        }
    }

    pub fn set_section<T: Serialize + ?Sized>(&mut self, name: impl Into<String>, value: &T) -> Result<(), PersistenceError> {
        let value = serde_json::to_value(value)?;
        self.0.insert(name.into(), value);
        Ok(())
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
