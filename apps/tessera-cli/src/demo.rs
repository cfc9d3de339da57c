//! The built-in `core` library the host loads before every run.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;
use tessera_kernel::{
    Component, Composition, Entity, EntityId, EventError, Identifier, Side, System, SystemCore,
    World, lock,
};
use tessera_library::{Library, LibraryManager};

pub const NAMESPACE: &str = "core";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Velocity {
    pub dx: f64,
    pub dy: f64,
}

pub fn id(path: &str) -> Identifier {
    Identifier::new(NAMESPACE, path)
}

/// Moves every mobile entity by its velocity once per server tick.
#[derive(Clone)]
struct Movement {
    core: SystemCore,
    mobile: Composition,
    step: f64,
}

impl Movement {
    fn template(mobile: Composition, step: f64) -> Result<Self, EventError> {
        let mut core = SystemCore::new(id("movement"), "Movement", Side::Server);
        // Other systems ask for the integration step instead of hard-coding it.
        core.listen("step_size", move |_| Ok(json!(step)))?;
        Ok(Self { core, mobile, step })
    }
}

fn advance(entity: &mut Entity, step: f64) -> Result<(), serde_json::Error> {
    let Some(velocity) = entity.component(&id("velocity")) else {
        return Ok(());
    };
    let v: Velocity = velocity.decode()?;
    if let Some(position) = entity.component_mut(&id("position")) {
        let p: Position = position.decode()?;
        position.set_data(serde_json::to_value(Position {
            x: p.x + v.dx * step,
            y: p.y + v.dy * step,
        })?);
    }
    Ok(())
}

impl System for Movement {
    fn core(&self) -> &SystemCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut SystemCore {
        &mut self.core
    }

    fn update_server(&mut self, world: &World) {
        for entity in world.entities_with_composition(&self.mobile) {
            match world.modify_entity(entity.id(), |e| advance(e, self.step)) {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    tracing::warn!(entity = %entity.id(), error = %err, "malformed movement data");
                }
                // Removed by an earlier system this tick.
                Err(_) => {}
            }
        }
    }
}

/// Client-side reporter: logs where mobile entities are after each tick.
#[derive(Clone)]
struct Telemetry {
    core: SystemCore,
}

impl System for Telemetry {
    fn core(&self) -> &SystemCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut SystemCore {
        &mut self.core
    }

    fn update_client(&mut self, world: &World) {
        let step = match world.system(&id("movement")) {
            Some(movement) => {
                let reply = lock(&movement).call("step_size", &[]);
                reply.unwrap_or_else(|err| {
                    tracing::warn!(op = "call", system = "core:movement", event = "step_size", error = %err, "step size unavailable");
                    Value::Null
                })
            }
            None => Value::Null,
        };
        for entity in world.entities_by_component_id(&id("position")) {
            if let Some(Ok(p)) = entity
                .component(&id("position"))
                .map(Component::decode::<Position>)
            {
                tracing::info!(entity = %entity.id(), x = p.x, y = p.y, %step, "position");
            }
        }
    }
}

/// Component, system and composition templates of the `core` namespace.
pub fn core_library() -> anyhow::Result<Library> {
    let mut library = Library::new(id("library"));
    library.register_components(vec![
        Component::new(id("position"), json!({"x": 0.0, "y": 0.0})),
        Component::new(id("velocity"), json!({"dx": 0.0, "dy": 0.0})),
        Component::new(id("health"), json!({"hp": 100})),
    ])?;

    let mobile = Composition::from_identifiers(id("mobile"), &[id("position"), id("velocity")]);
    library.register_composition(mobile.clone())?;
    library.register_systems(vec![
        Box::new(Movement::template(mobile, 1.0)?) as Box<dyn System>,
        Box::new(Telemetry {
            core: SystemCore::new(id("telemetry"), "Telemetry", Side::Client),
        }),
    ])?;
    Ok(library)
}

pub fn library_manager() -> anyhow::Result<LibraryManager> {
    let mut manager = LibraryManager::new();
    manager.load_library(core_library()?)?;
    Ok(manager)
}

/// Instantiate every system template of the `core` library into `world`.
pub fn install_systems(manager: &LibraryManager, world: &Arc<World>) -> anyhow::Result<()> {
    let ids: Vec<Identifier> = manager
        .library(NAMESPACE)
        .map(|lib| lib.systems().iter().map(|s| s.id().clone()).collect())
        .unwrap_or_default();
    for system_id in ids {
        let system = manager.instantiate_system(&system_id, world)?;
        world.add_system(system)?;
    }
    Ok(())
}

/// Spawn `count` entities: even ones are mobile, all have health.
pub fn spawn_entities(manager: &LibraryManager, world: &World, count: usize) -> anyhow::Result<()> {
    let mut batch = Vec::with_capacity(count);
    for i in 0..count {
        let mut components = vec![
            manager.instantiate_component(
                &id("position"),
                serde_json::to_value(Position { x: i as f64, y: 0.0 })?,
            )?,
            manager.instantiate_component(&id("health"), json!({"hp": 100}))?,
        ];
        if i % 2 == 0 {
            components.push(manager.instantiate_component(
                &id("velocity"),
                serde_json::to_value(Velocity { dx: 1.0, dy: 0.5 })?,
            )?);
        }
        batch.push(Entity::with_components(EntityId::new(), components)?);
    }
    world.add_entities(batch)?;
    Ok(())
}
