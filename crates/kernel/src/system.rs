use serde_json::Value;
use std::sync::{Arc, Mutex};

use tessera_common::{Identifier, Side};
use tessera_ecs::{EventError, EventTable, HandlerError};

use crate::world::{World, WorldHandle};

/// A system instance as stored by a world. Each system sits behind its own
/// mutex so a running system can look up and call another one.
pub type SharedSystem = Arc<Mutex<Box<dyn System>>>;

/// State every system carries: identity, side, private events, world binding.
#[derive(Debug, Clone)]
pub struct SystemCore {
    id: Identifier,
    name: String,
    side: Side,
    events: EventTable,
    world: WorldHandle,
}

impl SystemCore {
    /// Unbound core with an empty event table.
    pub fn new(id: Identifier, name: impl Into<String>, side: Side) -> Self {
        Self {
            id,
            name: name.into(),
            side,
            events: EventTable::new(),
            world: WorldHandle::default(),
        }
    }

    pub fn id(&self) -> &Identifier {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn events(&self) -> &EventTable {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut EventTable {
        &mut self.events
    }

    /// Register an event handler on this system; see [`EventTable::listen`].
    pub fn listen<F>(&mut self, name: impl Into<String>, handler: F) -> Result<(), EventError>
    where
        F: Fn(&[Value]) -> Result<Value, HandlerError> + Send + Sync + 'static,
    {
        self.events.listen(name, handler)
    }

    pub fn world_handle(&self) -> &WorldHandle {
        &self.world
    }

    pub fn bind(&mut self, world: WorldHandle) {
        self.world = world;
    }
}

/// Deep-copies a boxed system. Implemented for every `System + Clone`.
pub trait SystemClone {
    fn clone_box(&self) -> Box<dyn System>;
}

impl<T: System + Clone> SystemClone for T {
    fn clone_box(&self) -> Box<dyn System> {
        Box::new(self.clone())
    }
}

/// A named behavior unit bound to one world.
///
/// Only [`System::core`], [`System::core_mut`] and the hooks a system cares
/// about need implementing. The world only calls the hook matching its pass
/// when the system's [`Side`] takes part in that pass.
pub trait System: SystemClone + Send + 'static {
    fn core(&self) -> &SystemCore;

    fn core_mut(&mut self) -> &mut SystemCore;

    /// Called once the system has been bound to a world.
    fn on_bind(&mut self) {}

    fn update_client(&mut self, _world: &World) {}

    fn update_server(&mut self, _world: &World) {}

    fn id(&self) -> &Identifier {
        self.core().id()
    }

    fn name(&self) -> &str {
        self.core().name()
    }

    fn side(&self) -> Side {
        self.core().side()
    }

    /// The world this system is bound to, if it is still alive.
    fn world(&self) -> Option<Arc<World>> {
        self.core().world_handle().upgrade()
    }

    fn bind(&mut self, world: &Arc<World>) {
        self.core_mut().bind(WorldHandle::from(world));
        self.on_bind();
    }

    fn events(&self) -> &EventTable {
        self.core().events()
    }

    fn events_mut(&mut self) -> &mut EventTable {
        self.core_mut().events_mut()
    }

    /// Invoke one of this system's own event handlers.
    fn call(&self, name: &str, args: &[Value]) -> Result<Value, EventError> {
        self.core().events().call(name, args)
    }
}

impl Clone for Box<dyn System> {
    fn clone(&self) -> Self {
        (**self).clone_box()
    }
}
