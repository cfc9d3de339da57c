//! Persistence adapter for worlds.
//!
//! The live entity graph holds back-references and is never serialized
//! directly. A [`WorldSnapshot`] flattens it into [`EntityRecord`]s and seals
//! them with a SHA-256 content hash.
//!
//! # Invariants
//! - A snapshot whose hash does not match its content is never restored.
//! - Systems are behavior, not data; they are not captured.
//!
//! [`EntityRecord`]: tessera_kernel::EntityRecord

mod error;
mod snapshot;
mod store;

pub use error::PersistError;
pub use snapshot::{SNAPSHOT_SCHEMA_VERSION, WorldSnapshot};
pub use store::{load_json, save_json};
