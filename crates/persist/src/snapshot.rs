use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tessera_common::Identifier;
use tessera_kernel::{EntityRecord, World};

use crate::error::PersistError;

/// Version of the snapshot layout written by this crate.
pub const SNAPSHOT_SCHEMA_VERSION: u32 = 1;

/// A content-addressed copy of a world's entities.
///
/// The hash covers the world id and every record, so any edit to the
/// payload is caught by [`WorldSnapshot::verify`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub schema_version: u32,
    pub world_id: Identifier,
    pub entities: Vec<EntityRecord>,
    /// Lowercase hex SHA-256 over the JSON-encoded world id and records.
    pub hash: String,
}

#[derive(Serialize)]
struct Sealed<'a> {
    world_id: &'a Identifier,
    entities: &'a [EntityRecord],
}

impl WorldSnapshot {
    pub fn capture(world: &World) -> Result<Self, PersistError> {
        let world_id = world.id().clone();
        let entities = world.entity_records();
        let hash = content_hash(&world_id, &entities)?;
        tracing::debug!(world = %world_id, entities = entities.len(), %hash, "snapshot captured");
        Ok(Self {
            schema_version: SNAPSHOT_SCHEMA_VERSION,
            world_id,
            entities,
            hash,
        })
    }

    /// Recompute the hash and compare it with the stored one.
    pub fn verify(&self) -> Result<(), PersistError> {
        let actual = content_hash(&self.world_id, &self.entities)?;
        if actual != self.hash {
            tracing::warn!(op = "verify", world = %self.world_id, expected = %self.hash, %actual, "snapshot hash mismatch");
            return Err(PersistError::IntegrityMismatch {
                expected: self.hash.clone(),
                actual,
            });
        }
        Ok(())
    }

    /// Build a fresh world holding the captured entities.
    ///
    /// The snapshot is verified first; the new world has no systems.
    pub fn restore(&self) -> Result<Arc<World>, PersistError> {
        self.verify()?;
        let world = World::new(self.world_id.clone());
        world.add_entity_records(self.entities.iter().cloned())?;
        tracing::info!(world = %self.world_id, entities = self.entities.len(), "world restored from snapshot");
        Ok(world)
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }
}

fn content_hash(world_id: &Identifier, entities: &[EntityRecord]) -> Result<String, PersistError> {
    let bytes = serde_json::to_vec(&Sealed { world_id, entities })?;
    Ok(sha256_hex(&bytes))
}

fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tessera_kernel::{ClientId, Component, Entity, EntityId};

    fn populated() -> Arc<World> {
        let world = World::new(Identifier::new("core", "overworld"));
        let pos = Identifier::new("core", "pos");
        world
            .add_entities([
                Entity::with_components(EntityId::new(), [Component::new(pos.clone(), json!({"x": 1}))])
                    .unwrap()
                    .owned_by(ClientId::new()),
                Entity::with_components(EntityId::new(), [Component::new(pos, json!({"x": 2}))])
                    .unwrap(),
            ])
            .unwrap();
        world
    }

    #[test]
    fn capture_and_verify() {
        let snap = WorldSnapshot::capture(&populated()).unwrap();
        assert_eq!(snap.entity_count(), 2);
        assert_eq!(snap.hash.len(), 64);
        snap.verify().unwrap();
    }

    #[test]
    fn tampering_is_detected() {
        let mut snap = WorldSnapshot::capture(&populated()).unwrap();
        snap.entities[0].components[0].set_data(json!({"x": 999}));

        let err = snap.verify().unwrap_err();
        assert_eq!(err.label(), "IntegrityMismatch");
        assert!(snap.restore().is_err());
    }

    #[test]
    fn restore_rebuilds_entities_and_links() {
        let world = populated();
        let snap = WorldSnapshot::capture(&world).unwrap();
        let restored = snap.restore().unwrap();

        assert_eq!(restored.id(), world.id());
        assert_eq!(restored.entity_records(), world.entity_records());
        for entity in restored.entities() {
            assert!(Arc::ptr_eq(&entity.world().unwrap(), &restored));
        }
    }

    #[test]
    fn identical_worlds_hash_identically() {
        let world = populated();
        let a = WorldSnapshot::capture(&world).unwrap();
        let b = WorldSnapshot::capture(&a.restore().unwrap()).unwrap();
        assert_eq!(a.hash, b.hash);
    }
}
