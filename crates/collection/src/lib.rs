//! `resumeforge-collection`: generic controller for list fields.
//!
//! The controller never owns the canonical list: it reads through an
//! [`ItemsSource`] and writes by handing a fresh copy to the caller's
//! update callback.

pub mod controller;
pub mod item;

pub use controller::{CollectionController, ItemsSource};
pub use item::{HasId, IdField, ItemRef};
