use std::sync::Arc;

use tessera_common::{ClientId, Composition, EntityId, Identifier};
use tessera_ecs::Component;

use crate::error::EntityError;
use crate::world::{World, WorldHandle};

/// A unique identity owning an insertion-ordered set of components.
///
/// The owner is the external controller the entity belongs to (typically a
/// connected client); the possessor is whoever controls it right now. The
/// world reference is a non-owning back-reference set when a world admits
/// the entity, and is only used for lookups.
#[derive(Debug, Clone)]
pub struct Entity {
    id: EntityId,
    owner_id: Option<ClientId>,
    possessed_id: Option<ClientId>,
    components: Vec<Component>,
    world: WorldHandle,
}

impl Entity {
    /// An empty entity with a freshly generated id.
    pub fn new() -> Self {
        Self::with_id(EntityId::new())
    }

    /// An empty entity with the given id, e.g. one received from a peer.
    pub fn with_id(id: EntityId) -> Self {
        Self {
            id,
            owner_id: None,
            possessed_id: None,
            components: Vec::new(),
            world: WorldHandle::default(),
        }
    }

    /// Build an entity from a component list, rejecting repeated ids.
    pub fn with_components(
        id: EntityId,
        components: impl IntoIterator<Item = Component>,
    ) -> Result<Self, EntityError> {
        let mut entity = Self::with_id(id);
        for component in components {
            entity.add_component(component)?;
        }
        Ok(entity)
    }

    /// Builder form of [`Entity::set_owner`].
    pub fn owned_by(mut self, owner: ClientId) -> Self {
        self.owner_id = Some(owner);
        self
    }

    /// Builder form of [`Entity::set_possessor`].
    pub fn possessed_by(mut self, possessor: ClientId) -> Self {
        self.possessed_id = Some(possessor);
        self
    }

    /// The entity id. Fixed for the entity's lifetime.
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// The client that owns this entity, if any.
    pub fn owner_id(&self) -> Option<ClientId> {
        self.owner_id
    }

    /// The client currently controlling this entity, if any.
    pub fn possessed_id(&self) -> Option<ClientId> {
        self.possessed_id
    }

    /// Replace or clear the owner.
    pub fn set_owner(&mut self, owner: Option<ClientId>) {
        self.owner_id = owner;
    }

    /// Replace or clear the possessor.
    pub fn set_possessor(&mut self, possessor: Option<ClientId>) {
        self.possessed_id = possessor;
    }

    /// The world holding this entity, if it is still alive.
    pub fn world(&self) -> Option<Arc<World>> {
        self.world.upgrade()
    }

    pub(crate) fn bind(&mut self, world: WorldHandle) {
        self.world = world;
    }

    /// Append a component. Fails if one with the same id is already present.
    pub fn add_component(&mut self, component: Component) -> Result<(), EntityError> {
        if self.has_component(component.id()) {
            return Err(EntityError::DuplicateComponent {
                entity: self.id,
                component: component.id().clone(),
            });
        }
        self.components.push(component);
        Ok(())
    }

    /// Whether a component with this id is attached.
    pub fn has_component(&self, id: &Identifier) -> bool {
        self.components.iter().any(|c| c.id() == id)
    }

    /// Same as [`Entity::has_component`] but keyed by the `namespace:path` string.
    pub fn has_component_str(&self, id: &str) -> bool {
        self.components.iter().any(|c| c.id().matches_str(id))
    }

    /// First component whose namespace and path both match.
    pub fn component(&self, id: &Identifier) -> Option<&Component> {
        self.components.iter().find(|c| c.id() == id)
    }

    /// Mutable access to the component with this id.
    pub fn component_mut(&mut self, id: &Identifier) -> Option<&mut Component> {
        self.components.iter_mut().find(|c| c.id() == id)
    }

    /// Like [`Entity::component`], failing with [`EntityError::ComponentNotFound`].
    pub fn get_component(&self, id: &Identifier) -> Result<&Component, EntityError> {
        self.component(id).ok_or_else(|| EntityError::ComponentNotFound {
            entity: self.id,
            component: id.clone(),
        })
    }

    /// All components, in insertion order.
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// Number of attached components.
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Detach and return a component, keeping the order of the rest.
    pub fn remove_component(&mut self, id: &Identifier) -> Result<Component, EntityError> {
        let index = self
            .components
            .iter()
            .position(|c| c.id() == id)
            .ok_or_else(|| EntityError::ComponentNotFound {
                entity: self.id,
                component: id.clone(),
            })?;
        Ok(self.components.remove(index))
    }

    /// Upsert: replace the data of components that share an id, append the rest.
    ///
    /// This is the sync path for applying external updates, so unlike
    /// [`Entity::add_component`] it never rejects a known id.
    pub fn update_components(&mut self, components: impl IntoIterator<Item = Component>) {
        for incoming in components {
            match self.component_mut(incoming.id()) {
                Some(existing) => existing.set_data(incoming.data().clone()),
                None => self.components.push(incoming),
            }
        }
    }

    /// Component ids in insertion order, as `namespace:path` strings.
    pub fn composition(&self) -> Vec<String> {
        self.components.iter().map(|c| c.id().to_string()).collect()
    }

    /// True when every id of `target` is present; extra components are allowed.
    pub fn has_composition(&self, target: &Composition) -> bool {
        target.iter().all(|id| self.has_component_str(id))
    }

    /// True when every listed id is present.
    pub fn has_components(&self, ids: &[Identifier]) -> bool {
        ids.iter().all(|id| self.has_component(id))
    }

    /// True when the entity carries exactly the ids of `target`, nothing more.
    pub fn has_strict_composition(&self, target: &Composition) -> bool {
        self.components.len() == target.len() && self.has_composition(target)
    }
}

impl Default for Entity {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pos() -> Identifier {
        Identifier::new("core", "pos")
    }

    fn hp() -> Identifier {
        Identifier::new("core", "hp")
    }

    #[test]
    fn add_component_rejects_duplicate() {
        let mut entity = Entity::new();
        entity.add_component(Component::new(pos(), json!({"x": 0}))).unwrap();

        let err = entity
            .add_component(Component::new(pos(), json!({"x": 9})))
            .unwrap_err();
        assert_eq!(err.label(), "DuplicateComponent");
        assert_eq!(entity.component_count(), 1);
        assert_eq!(entity.get_component(&pos()).unwrap().data(), &json!({"x": 0}));
    }

    #[test]
    fn update_components_upserts() {
        let mut entity = Entity::new();
        entity.add_component(Component::new(pos(), json!({"x": 0}))).unwrap();

        entity.update_components([
            Component::new(pos(), json!({"x": 5})),
            Component::new(hp(), json!({"value": 10})),
        ]);

        assert_eq!(entity.component_count(), 2);
        assert_eq!(entity.get_component(&pos()).unwrap().data(), &json!({"x": 5}));
        assert_eq!(entity.composition(), vec!["core:pos", "core:hp"]);
    }

    #[test]
    fn lookup_needs_namespace_and_path() {
        let mut entity = Entity::new();
        entity.add_component(Component::empty(pos())).unwrap();

        assert!(entity.component(&Identifier::new("other", "pos")).is_none());
        assert!(entity.has_component_str("core:pos"));
        assert!(!entity.has_component_str("other:pos"));
        assert!(matches!(
            entity.get_component(&hp()),
            Err(EntityError::ComponentNotFound { .. })
        ));
    }

    #[test]
    fn composition_preserves_insertion_order() {
        let entity =
            Entity::with_components(EntityId::new(), [Component::empty(hp()), Component::empty(pos())])
                .unwrap();
        assert_eq!(entity.composition(), vec!["core:hp", "core:pos"]);
    }

    #[test]
    fn with_components_rejects_repeats() {
        let result =
            Entity::with_components(EntityId::new(), [Component::empty(pos()), Component::empty(pos())]);
        assert!(matches!(result, Err(EntityError::DuplicateComponent { .. })));
    }

    #[test]
    fn has_composition_is_at_least() {
        let entity =
            Entity::with_components(EntityId::new(), [Component::empty(pos()), Component::empty(hp())])
                .unwrap();
        let only_pos = Composition::new(Identifier::new("t", "p"), ["core:pos"]);
        let both = Composition::new(Identifier::new("t", "b"), ["core:hp", "core:pos"]);
        let with_vel = Composition::new(Identifier::new("t", "v"), ["core:pos", "core:vel"]);

        assert!(entity.has_composition(&only_pos));
        assert!(entity.has_composition(&both));
        assert!(!entity.has_composition(&with_vel));

        assert!(!entity.has_strict_composition(&only_pos));
        assert!(entity.has_strict_composition(&both));
    }

    #[test]
    fn remove_component() {
        let mut entity = Entity::with_components(EntityId::new(), [Component::empty(pos())]).unwrap();
        let removed = entity.remove_component(&pos()).unwrap();
        assert_eq!(removed.id(), &pos());
        assert!(entity.remove_component(&pos()).is_err());
    }

    #[test]
    fn unbound_entity_has_no_world() {
        let owner = ClientId::new();
        let entity = Entity::new().owned_by(owner).possessed_by(owner);
        assert!(entity.world().is_none());
        assert_eq!(entity.owner_id(), Some(owner));
        assert_eq!(entity.possessed_id(), Some(owner));
    }
}
