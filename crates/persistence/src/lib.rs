//! `resumeforge-persistence`: persistence collaborator interface.
//!
//! Section controllers depend on the [`DocumentRepository`] trait only; the
//! storage medium is chosen by the embedding application. The in-memory
//! implementation backs tests and development builds.

pub mod document;
pub mod error;
pub mod in_memory;
pub mod repository;

pub use document::{Document, RawDocument};
pub use error::PersistenceError;
pub use in_memory::InMemoryRepository;
pub use repository::DocumentRepository;
