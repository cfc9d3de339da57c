use serde::{Deserialize, Serialize};
use tessera_common::{ClientId, EntityId};
use tessera_ecs::Component;

use crate::entity::Entity;
use crate::error::EntityError;

/// Cycle-free flattened form of an [`Entity`], without the world back-reference.
///
/// This is the only shape that crosses a transport or persistence boundary;
/// the live entity graph is never serialized directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub id: EntityId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<ClientId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub possessed_id: Option<ClientId>,
    pub components: Vec<Component>,
}

impl From<&Entity> for EntityRecord {
    fn from(entity: &Entity) -> Self {
        Self {
            id: entity.id(),
            owner_id: entity.owner_id(),
            possessed_id: entity.possessed_id(),
            components: entity.components().to_vec(),
        }
    }
}

impl TryFrom<EntityRecord> for Entity {
    type Error = EntityError;

    fn try_from(record: EntityRecord) -> Result<Self, Self::Error> {
        let mut entity = Entity::with_components(record.id, record.components)?;
        entity.set_owner(record.owner_id);
        entity.set_possessor(record.possessed_id);
        Ok(entity)
    }
}
