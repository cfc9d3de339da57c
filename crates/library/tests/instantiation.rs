use std::sync::Arc;

use serde_json::{Value, json};
use tessera_common::{Identifier, Side};
use tessera_ecs::Component;
use tessera_kernel::{Entity, EntityId, System, SystemCore, World};
use tessera_library::{Library, LibraryManager};

/// Server system that drains one hit point per tick from every health component.
#[derive(Clone)]
struct Decay {
    core: SystemCore,
}

impl Decay {
    fn template() -> Self {
        let mut core = SystemCore::new(Identifier::new("core", "decay"), "Decay", Side::Server);
        core.listen("ping", |_| Ok(json!("pong"))).unwrap();
        Self { core }
    }
}

impl System for Decay {
    fn core(&self) -> &SystemCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut SystemCore {
        &mut self.core
    }

    fn update_server(&mut self, world: &World) {
        let health = Identifier::new("core", "health");
        for entity in world.entities_by_component_id(&health) {
            world
                .modify_entity(entity.id(), |e| {
                    if let Some(c) = e.component_mut(&health) {
                        let hp = c.field("hp").and_then(Value::as_i64).unwrap_or(0);
                        c.set_field("hp", json!(hp - 1));
                    }
                })
                .unwrap();
        }
    }
}

fn manager() -> LibraryManager {
    let mut lib = Library::new(Identifier::new("core", "library"));
    lib.register_component(Component::new(
        Identifier::new("core", "health"),
        json!({"hp": 10}),
    ))
    .unwrap();
    lib.register_system(Box::new(Decay::template())).unwrap();

    let mut manager = LibraryManager::new();
    manager.load_library(lib).unwrap();
    manager
}

#[test]
fn instances_bound_to_different_worlds_stay_independent() {
    let manager = manager();
    let id = Identifier::new("core", "decay");
    let first = World::new(Identifier::new("test", "first"));
    let second = World::new(Identifier::new("test", "second"));

    let mut a = manager.instantiate_system(&id, &first).unwrap();
    let b = manager.instantiate_system(&id, &second).unwrap();

    assert!(Arc::ptr_eq(&a.world().unwrap(), &first));
    assert!(Arc::ptr_eq(&b.world().unwrap(), &second));
    assert!(manager.system(&id).unwrap().world().is_none());

    a.events_mut().listen("extra", |_| Ok(Value::Null)).unwrap();
    assert!(a.events().has_listener("extra"));
    assert!(!b.events().has_listener("extra"));
    assert!(!manager.system(&id).unwrap().events().has_listener("extra"));
    assert_eq!(b.call("ping", &[]).unwrap(), json!("pong"));
}

#[test]
fn instantiated_system_runs_inside_its_world() {
    let manager = manager();
    let world = World::new(Identifier::new("test", "overworld"));
    let health = Identifier::new("core", "health");

    for hp in [3, 7] {
        let component = manager.instantiate_component(&health, json!({"hp": hp})).unwrap();
        world
            .add_entity(Entity::with_components(EntityId::new(), [component]).unwrap())
            .unwrap();
    }

    let system = manager
        .instantiate_system(&Identifier::new("core", "decay"), &world)
        .unwrap();
    let shared = world.add_system(system).unwrap();
    world.update_server();

    let hp: Vec<i64> = world
        .entities_by_component_id(&health)
        .iter()
        .filter_map(|e| e.component(&health)?.field("hp")?.as_i64())
        .collect();
    assert_eq!(hp.len(), 2);
    assert!(hp.contains(&2) && hp.contains(&6));

    assert_eq!(shared.lock().unwrap().id(), &Identifier::new("core", "decay"));
    assert!(
        manager
            .component(&health)
            .unwrap()
            .field("hp")
            .is_some_and(|hp| hp == &json!(10))
    );
}
