//! Template registries: [`Library`] and [`LibraryManager`].
//!
//! A library holds the component, system and composition templates of one
//! namespace. The manager aggregates libraries and turns templates into live
//! instances.
//!
//! # Invariants
//! - Libraries are append-only; a template id is registered at most once.
//! - One library per namespace within a manager.
//! - Instantiation always returns a deep copy; templates are never mutated.

mod error;
mod library;
mod manager;

pub use error::{LibraryError, TemplateKind};
pub use library::Library;
pub use manager::LibraryManager;
