use std::fmt;
use std::sync::{Arc, Mutex, Weak};

use tessera_common::{ClientId, Composition, EntityId, Identifier};
use tessera_ecs::Component;

use crate::entity::Entity;
use crate::error::WorldError;
use crate::record::EntityRecord;
use crate::sync::lock;
use crate::system::{SharedSystem, System};

/// Non-owning reference to a [`World`], held by entities and systems.
#[derive(Clone, Default)]
pub struct WorldHandle(Weak<World>);

impl WorldHandle {
    /// The world, if it has not been dropped.
    pub fn upgrade(&self) -> Option<Arc<World>> {
        self.0.upgrade()
    }

    /// True when this handle refers to `world`.
    pub fn points_to(&self, world: &World) -> bool {
        std::ptr::eq(self.0.as_ptr(), world)
    }
}

impl From<&Arc<World>> for WorldHandle {
    fn from(world: &Arc<World>) -> Self {
        Self(Arc::downgrade(world))
    }
}

impl fmt::Debug for WorldHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.upgrade() {
            Some(world) => write!(f, "WorldHandle({})", world.id()),
            None => f.write_str("WorldHandle(unbound)"),
        }
    }
}

struct SystemSlot {
    id: Identifier,
    system: SharedSystem,
}

#[derive(Debug, Clone, Copy)]
enum Pass {
    Client,
    Server,
}

/// The live store of entities and systems.
///
/// Worlds are always created behind an [`Arc`] so entities and systems can
/// hold a back-reference. Every entity operation, reads included, takes the
/// same exclusive lock. Queries hand back owned snapshots; live changes go
/// through [`World::modify_entity`] or [`World::update_entity_components`].
pub struct World {
    id: Identifier,
    handle: Weak<World>,
    entities: Mutex<Vec<Entity>>,
    systems: Mutex<Vec<SystemSlot>>,
}

impl World {
    /// An empty world. Always returned behind an [`Arc`] so members can point back to it.
    pub fn new(id: Identifier) -> Arc<Self> {
        Arc::new_cyclic(|handle| Self {
            id,
            handle: handle.clone(),
            entities: Mutex::new(Vec::new()),
            systems: Mutex::new(Vec::new()),
        })
    }

    /// The identifier this world was created with.
    pub fn id(&self) -> &Identifier {
        &self.id
    }

    /// A non-owning handle to this world.
    pub fn handle(&self) -> WorldHandle {
        WorldHandle(self.handle.clone())
    }

    // --- Entities ---

    /// Admit one entity and bind it to this world.
    ///
    /// Fails with [`WorldError::DuplicateEntity`] if the id is taken; the world is left unchanged.
    pub fn add_entity(&self, mut entity: Entity) -> Result<(), WorldError> {
        let mut entities = lock(&self.entities);
        if entities.iter().any(|e| e.id() == entity.id()) {
            tracing::warn!(op = "add_entity", world = %self.id, entity = %entity.id(), "duplicate entity id");
            return Err(WorldError::DuplicateEntity(entity.id()));
        }
        entity.bind(self.handle());
        tracing::debug!(world = %self.id, entity = %entity.id(), "entity added");
        entities.push(entity);
        Ok(())
    }

    /// Add a batch of entities. Nothing is added if any id collides with an
    /// existing entity or with another entity of the batch.
    pub fn add_entities(&self, batch: impl IntoIterator<Item = Entity>) -> Result<(), WorldError> {
        let batch: Vec<Entity> = batch.into_iter().collect();
        let mut entities = lock(&self.entities);

        let mut rejected = Vec::new();
        for (index, entity) in batch.iter().enumerate() {
            let in_world = entities.iter().any(|e| e.id() == entity.id());
            let earlier_in_batch = batch[..index].iter().any(|e| e.id() == entity.id());
            if in_world || earlier_in_batch {
                rejected.push(entity.id());
            }
        }
        if !rejected.is_empty() {
            tracing::warn!(op = "add_entities", world = %self.id, rejected = rejected.len(), "duplicate entity ids");
            return Err(WorldError::DuplicateEntities(rejected));
        }

        let count = batch.len();
        entities.extend(batch.into_iter().map(|mut entity| {
            entity.bind(self.handle());
            entity
        }));
        tracing::debug!(world = %self.id, count, "entities added");
        Ok(())
    }

    /// Snapshot of one entity.
    pub fn entity(&self, id: EntityId) -> Option<Entity> {
        lock(&self.entities).iter().find(|e| e.id() == id).cloned()
    }

    /// Whether an entity with this id is present.
    pub fn contains_entity(&self, id: EntityId) -> bool {
        lock(&self.entities).iter().any(|e| e.id() == id)
    }

    /// Snapshot of every entity, in insertion order.
    pub fn entities(&self) -> Vec<Entity> {
        lock(&self.entities).clone()
    }

    /// Number of entities in the world.
    pub fn entity_count(&self) -> usize {
        lock(&self.entities).len()
    }

    /// Remove an entity and hand it back unbound.
    ///
    /// Fails with [`WorldError::EntityNotFound`] if no entity has this id.
    pub fn remove_entity(&self, id: EntityId) -> Result<Entity, WorldError> {
        let mut entities = lock(&self.entities);
        let Some(index) = entities.iter().position(|e| e.id() == id) else {
            tracing::warn!(op = "remove_entity", world = %self.id, entity = %id, "entity does not exist");
            return Err(WorldError::EntityNotFound(id));
        };
        let mut removed = entities.remove(index);
        removed.bind(WorldHandle::default());
        tracing::debug!(world = %self.id, entity = %id, "entity removed");
        Ok(removed)
    }

    /// Mutate one entity in place while holding the entity lock.
    ///
    /// The closure must not call back into this world.
    pub fn modify_entity<R>(
        &self,
        id: EntityId,
        f: impl FnOnce(&mut Entity) -> R,
    ) -> Result<R, WorldError> {
        let mut entities = lock(&self.entities);
        let entity = entities
            .iter_mut()
            .find(|e| e.id() == id)
            .ok_or(WorldError::EntityNotFound(id))?;
        Ok(f(entity))
    }

    /// Upsert components on one entity; see [`Entity::update_components`].
    pub fn update_entity_components(
        &self,
        id: EntityId,
        components: impl IntoIterator<Item = Component>,
    ) -> Result<(), WorldError> {
        self.modify_entity(id, |entity| entity.update_components(components))
            .inspect_err(|_| {
                tracing::warn!(op = "update_entity_components", world = %self.id, entity = %id, "entity does not exist");
            })
    }

    // --- Queries ---

    fn query(&self, predicate: impl Fn(&Entity) -> bool) -> Vec<Entity> {
        lock(&self.entities)
            .iter()
            .filter(|e| predicate(e))
            .cloned()
            .collect()
    }

    /// Entities carrying a component with this id.
    pub fn entities_by_component_id(&self, id: &Identifier) -> Vec<Entity> {
        self.query(|e| e.has_component(id))
    }

    /// Entities carrying all of the listed components, in any order.
    pub fn entities_with_components(&self, ids: &[Identifier]) -> Vec<Entity> {
        self.query(|e| e.has_components(ids))
    }

    /// Same as [`World::entities_with_components`], keyed by `namespace:path` strings.
    pub fn entities_with_component_names<S: AsRef<str>>(&self, ids: &[S]) -> Vec<Entity> {
        self.query(|e| ids.iter().all(|id| e.has_component_str(id.as_ref())))
    }

    /// Entities carrying at least the components of `composition`.
    pub fn entities_with_composition(&self, composition: &Composition) -> Vec<Entity> {
        self.query(|e| e.has_composition(composition))
    }

    /// Entities carrying exactly the components of `composition`.
    pub fn entities_with_strict_composition(&self, composition: &Composition) -> Vec<Entity> {
        self.query(|e| e.has_strict_composition(composition))
    }

    /// Entities currently possessed by `possessor`.
    pub fn entities_possessed_by(&self, possessor: ClientId) -> Vec<Entity> {
        self.query(|e| e.possessed_id() == Some(possessor))
    }

    /// Entities owned by `owner`.
    pub fn entities_owned_by(&self, owner: ClientId) -> Vec<Entity> {
        self.query(|e| e.owner_id() == Some(owner))
    }

    // --- Flattened records ---

    /// Cycle-free copies of every entity, in insertion order.
    pub fn entity_records(&self) -> Vec<EntityRecord> {
        lock(&self.entities).iter().map(EntityRecord::from).collect()
    }

    /// Rebuild entities from records and add them as one batch.
    pub fn add_entity_records(
        &self,
        records: impl IntoIterator<Item = EntityRecord>,
    ) -> Result<(), WorldError> {
        let batch = records
            .into_iter()
            .map(Entity::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        self.add_entities(batch)
    }

    // --- Systems ---

    /// Bind a system to this world and append it to the update order.
    pub fn add_system(&self, mut system: Box<dyn System>) -> Result<SharedSystem, WorldError> {
        let id = system.id().clone();
        if self.system(&id).is_some() {
            tracing::warn!(op = "add_system", world = %self.id, system = %id, "duplicate system id");
            return Err(WorldError::DuplicateSystem(id));
        }
        // Bind outside the list lock: `on_bind` may look up other systems.
        if !system.core().world_handle().points_to(self)
            && let Some(world) = self.handle.upgrade()
        {
            system.bind(&world);
        }

        let mut systems = lock(&self.systems);
        if systems.iter().any(|slot| slot.id == id) {
            tracing::warn!(op = "add_system", world = %self.id, system = %id, "duplicate system id");
            return Err(WorldError::DuplicateSystem(id));
        }
        let shared: SharedSystem = Arc::new(Mutex::new(system));
        systems.push(SystemSlot {
            id: id.clone(),
            system: Arc::clone(&shared),
        });
        tracing::debug!(world = %self.id, system = %id, "system added");
        Ok(shared)
    }

    /// Take a system out of the update order. The returned instance stays bound.
    pub fn remove_system(&self, id: &Identifier) -> Result<SharedSystem, WorldError> {
        let mut systems = lock(&self.systems);
        let Some(index) = systems.iter().position(|slot| &slot.id == id) else {
            tracing::warn!(op = "remove_system", world = %self.id, system = %id, "system does not exist");
            return Err(WorldError::SystemNotFound(id.clone()));
        };
        let slot = systems.remove(index);
        tracing::debug!(world = %self.id, system = %id, "system removed");
        Ok(slot.system)
    }

    /// Look up a system to call into it. Does not lock the system itself.
    pub fn system(&self, id: &Identifier) -> Option<SharedSystem> {
        lock(&self.systems)
            .iter()
            .find(|slot| &slot.id == id)
            .map(|slot| Arc::clone(&slot.system))
    }

    /// Systems in update order.
    pub fn systems(&self) -> Vec<SharedSystem> {
        lock(&self.systems)
            .iter()
            .map(|slot| Arc::clone(&slot.system))
            .collect()
    }

    /// Ids of the registered systems, in update order.
    pub fn system_ids(&self) -> Vec<Identifier> {
        lock(&self.systems).iter().map(|slot| slot.id.clone()).collect()
    }

    // --- Update passes ---

    /// Run the client hook of every client or hybrid system, in registration order.
    pub fn update_client(&self) {
        self.run_pass(Pass::Client);
    }

    /// Run the server hook of every server or hybrid system, in registration order.
    pub fn update_server(&self) {
        self.run_pass(Pass::Server);
    }

    fn run_pass(&self, pass: Pass) {
        let _span = tracing::info_span!("update", world = %self.id, pass = ?pass).entered();
        // The list lock is released before any hook runs so systems can look
        // each other up, and add or remove systems, mid-pass.
        let systems = self.systems();
        for shared in systems {
            let mut system = lock(&shared);
            match pass {
                Pass::Client if system.side().runs_client() => system.update_client(self),
                Pass::Server if system.side().runs_server() => system.update_server(self),
                _ => {}
            }
        }
    }
}

impl fmt::Debug for World {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("World")
            .field("id", &self.id)
            .field("entities", &self.entity_count())
            .field("systems", &self.system_ids())
            .finish()
    }
}
