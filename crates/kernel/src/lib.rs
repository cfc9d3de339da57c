//! World kernel: the live, lock-guarded store of entities and systems.
//!
//! # Invariants
//! - Entity ids are unique within a world; component ids are unique within an entity.
//! - Every entity read or write goes through the same exclusive lock.
//! - A failed mutation leaves the world exactly as it was.
//! - Systems run one after another, in registration order.

mod entity;
mod error;
mod record;
mod sync;
mod system;
pub mod world;

pub use entity::Entity;
pub use error::{EntityError, WorldError};
pub use record::EntityRecord;
pub use sync::lock;
pub use system::{SharedSystem, System, SystemClone, SystemCore};
pub use world::{World, WorldHandle};

pub use tessera_common::{ClientId, Composition, EntityId, Identifier, Side};
pub use tessera_ecs::{Component, EventError, EventTable};
