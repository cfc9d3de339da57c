use tessera_common::{EntityId, Identifier};

/// Errors from mutating or reading a single entity's components.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EntityError {
    #[error("entity {entity} already has a component {component}")]
    DuplicateComponent {
        entity: EntityId,
        component: Identifier,
    },
    #[error("entity {entity} has no component {component}")]
    ComponentNotFound {
        entity: EntityId,
        component: Identifier,
    },
}

impl EntityError {
    pub fn label(&self) -> &'static str {
        match self {
            EntityError::DuplicateComponent { .. } => "DuplicateComponent",
            EntityError::ComponentNotFound { .. } => "ComponentNotFound",
        }
    }
}

/// Errors from world-level entity and system management.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorldError {
    #[error("an entity with id {0} already exists")]
    DuplicateEntity(EntityId),
    #[error("entity ids already in use: {0:?}")]
    DuplicateEntities(Vec<EntityId>),
    #[error("entity {0} does not exist")]
    EntityNotFound(EntityId),
    #[error("a system with id {0} is already registered")]
    DuplicateSystem(Identifier),
    #[error("system {0} does not exist")]
    SystemNotFound(Identifier),
    #[error(transparent)]
    Entity(#[from] EntityError),
}

impl WorldError {
    pub fn label(&self) -> &'static str {
        match self {
            WorldError::DuplicateEntity(_) | WorldError::DuplicateEntities(_) => "DuplicateEntity",
            WorldError::EntityNotFound(_) => "EntityNotFound",
            WorldError::DuplicateSystem(_) => "DuplicateSystem",
            WorldError::SystemNotFound(_) => "SystemNotFound",
            WorldError::Entity(err) => err.label(),
        }
    }
}
