//! Persistence collaborator contract.

use async_trait::async_trait;

use crate::document::Document;
use crate::error::PersistenceError;

/// Loads and stores the whole document.
///
/// Implementations fail with [`PersistenceError::Storage`] on IO problems and
/// [`PersistenceError::Validation`] when the document violates its schema.
/// Section controllers never call this directly; every call goes through the
/// error store's `execute_with_error_handling` chokepoint.
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    async fn load(&self) -> Result<Document, PersistenceError>;

    async fn save(&self, document: &Document) -> Result<(), PersistenceError>;

    /// Serialize the stored document as pretty JSON.
    async fn export(&self) -> Result<String, PersistenceError> {
        let document = self.load().await?;
        Ok(serde_json::to_string_pretty(&document.to_json())?)
    }

    /// Replace the stored document with `json`, returning what was stored.
    async fn import(&self, json: &str) -> Result<Document, PersistenceError> {
        let raw = serde_json::from_str(json)?;
        let document = Document::from_raw(raw)?;
        self.save(&document).await?;
        Ok(document)
    }
}
