//! `resumeforge-sections`: resume sections wired to the error substrate.
//!
//! - [`models`]: typed sections with validating constructors
//! - [`CollectionSection`]: list sections with optimistic update + rollback
//! - [`BasicsSection`]: the single-object basics section
//! - [`ResumeEditor`]: one shared document, every section

pub mod basics;
pub mod config;
pub mod editor;
pub mod models;
pub mod section;

pub use basics::BasicsSection;
pub use config::SectionsConfig;
pub use editor::ResumeEditor;
pub use models::{
    AwardEntry, Basics, EducationEntry, Location, SectionItem, SkillEntry, WorkEntry,
    parse_partial_date,
};
pub use section::{CollectionSection, SectionContext};
