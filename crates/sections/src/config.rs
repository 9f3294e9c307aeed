//! Section-layer configuration.

use resumeforge_errors::ExecuteOptions;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionsConfig {
    /// Initial locale of the translation collaborator.
    pub locale: String,
    /// Return persistence failures to the caller after recording them.
    pub rethrow_errors: bool,
    /// Identifier field of JSON-backed collections.
    pub id_field: String,
}

impl Default for SectionsConfig {
    fn default() -> Self {
        Self {
            locale: "en".to_string(),
            rethrow_errors: false,
            id_field: "id".to_string(),
        }
    }
}

impl SectionsConfig {
    /// Read `RESUMEFORGE_LOCALE`, `RESUMEFORGE_RETHROW_ERRORS` and
    /// `RESUMEFORGE_ID_FIELD`, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let locale = match lookup("RESUMEFORGE_LOCALE") {
            Some(raw) if is_locale(raw.trim()) => raw.trim().to_string(),
            Some(raw) => {
                tracing::warn!(value = %raw, "invalid RESUMEFORGE_LOCALE; using default");
                defaults.locale
            }
            None => defaults.locale,
        };

        let rethrow_errors = match lookup("RESUMEFORGE_RETHROW_ERRORS").as_deref().map(str::trim) {
            Some("true") | Some("1") => true,
            Some("false") | Some("0") | Some("") | None => false,
            Some(other) => {
                tracing::warn!(value = other, "invalid RESUMEFORGE_RETHROW_ERRORS; using false");
                false
            }
        };

        let id_field = match lookup("RESUMEFORGE_ID_FIELD") {
            Some(raw) if !raw.trim().is_empty() => raw.trim().to_string(),
            Some(_) => {
                tracing::warn!("empty RESUMEFORGE_ID_FIELD; using default");
                defaults.id_field
            }
            None => defaults.id_field,
        };

        Self {
            locale,
            rethrow_errors,
            id_field,
        }
    }

    /// Options every section operation passes to the error store.
    pub fn execute_options(&self) -> ExecuteOptions {
        ExecuteOptions {
            show_toast: true,
            rethrow: self.rethrow_errors,
        }
    }
}

// BCP 47-ish: "en", "pt-BR", "zh-Hant".
fn is_locale(raw: &str) -> bool {
    !raw.is_empty()
        && raw
            .split('-')
            .all(|part| (2..=8).contains(&part.len()) && part.chars().all(|c| c.is_ascii_alphanumeric()))
}
