//! Translation collaborator.
//!
//! The aggregator never bakes translated text into stored errors. It asks an
//! [`I18n`] handle to resolve each message on read, and treats a write to the
//! locale signal as a reason to recompute its derived views.

use std::collections::HashMap;
use std::sync::Arc;

use resumeforge_core::{I18nParams, Signal, ValidationError};

/// Translation lookup implemented outside this workspace.
pub trait Translator: Send + Sync {
    fn translate(&self, key: &str, params: &I18nParams) -> String;

    fn exists(&self, key: &str) -> bool;
}

/// Translator paired with the locale signal it follows.
#[derive(Clone)]
pub struct I18n {
    translator: Arc<dyn Translator>,
    locale: Signal<String>,
}

impl core::fmt::Debug for I18n {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("I18n")
            .field("locale", &self.locale.get())
            .finish_non_exhaustive()
    }
}

impl I18n {
    pub fn new(translator: Arc<dyn Translator>, locale: Signal<String>) -> Self {
        Self { translator, locale }
    }

    pub fn locale(&self) -> &Signal<String> {
        &self.locale
    }

    pub fn locale_version(&self) -> u64 {
        self.locale.version()
    }

    /// Message to display for `error` under the current locale.
    ///
    /// Uses the translation of `i18n_key` when the key is present and known
    /// to the translator, the raw message otherwise.
    pub fn resolve(&self, error: &ValidationError) -> String {
        match &error.i18n_key {
            Some(key) if self.translator.exists(key) => {
                self.translator.translate(key, &error.i18n_params)
            }
            _ => error.message.clone(),
        }
    }

    /// Copy of `error` with its message resolved.
    pub fn localize(&self, error: &ValidationError) -> ValidationError {
        let mut localized = error.clone();
        localized.message = self.resolve(error);
        localized
    }
}

/// In-process catalog translator with `{param}` interpolation.
///
/// Looks up the current locale first, then the fallback locale. Unknown keys
/// translate to the key itself.
#[derive(Debug)]
pub struct CatalogTranslator {
    locale: Signal<String>,
    fallback_locale: String,
    catalogs: HashMap<String, HashMap<String, String>>,
}

impl CatalogTranslator {
    pub fn new(locale: Signal<String>, fallback_locale: impl Into<String>) -> Self {
        Self {
            locale,
            fallback_locale: fallback_locale.into(),
            catalogs: HashMap::new(),
        }
    }

    pub fn with_message(
        mut self,
        locale: impl Into<String>,
        key: impl Into<String>,
        template: impl Into<String>,
    ) -> Self {
        self.catalogs
            .entry(locale.into())
            .or_default()
            .insert(key.into(), template.into());
        self
    }

    fn lookup(&self, key: &str) -> Option<&str> {
        let current = self.locale.get();
        [current.as_str(), self.fallback_locale.as_str()]
            .into_iter()
            .find_map(|locale| self.catalogs.get(locale)?.get(key))
            .map(String::as_str)
    }
}

impl Translator for CatalogTranslator {
    fn translate(&self, key: &str, params: &I18nParams) -> String {
        let Some(template) = self.lookup(key) else {
            return key.to_string();
        };

        params.iter().fold(template.to_string(), |text, (name, value)| {
            let rendered = match value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            text.replace(&format!("{{{name}}}"), &rendered)
        })
    }

    fn exists(&self, key: &str) -> bool {
        self.lookup(key).is_some()
    }
}
