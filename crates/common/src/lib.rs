//! Shared identity types for the tessera runtime.
//!
//! # Invariants
//! - An [`Identifier`] is equal to another iff their `namespace:path` forms are equal.
//! - A [`Composition`] never holds the same component id twice.

mod composition;
mod types;

pub use composition::Composition;
pub use types::{ClientId, EntityId, Identifier, IdentifierError, Side};
