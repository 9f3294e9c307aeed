//! `resumeforge-core`: validation substrate building blocks.
//!
//! This crate contains the pure primitives every section controller builds on:
//! the [`ValidationResult`] algebra, the [`ValidationError`] taxonomy,
//! identifiers, and the [`Signal`] reactive cell. No IO lives here.

pub mod error;
pub mod id;
pub mod outcome;
pub mod reactive;

pub use error::{
    ErrorLayer, GLOBAL_FIELD, I18nParams, Severity, ValidationError, codes, split_field_message,
};
pub use id::{ErrorId, IdGenerator, InvalidId, SequentialIdGenerator, UuidGenerator};
pub use outcome::{ValidationResult, create_failure, create_success};
pub use reactive::{Signal, SubscriptionId};
