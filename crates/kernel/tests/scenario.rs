use std::sync::{Arc, Mutex};

use serde_json::{Value, json};
use tessera_kernel::{
    Component, Composition, Entity, EntityId, Identifier, Side, System, SystemCore, World,
    WorldError, lock,
};

fn pos() -> Identifier {
    Identifier::new("core", "pos")
}

fn hp() -> Identifier {
    Identifier::new("core", "hp")
}

#[test]
fn composition_queries_over_two_entities() {
    let world = World::new(Identifier::new("core", "overworld"));
    let a = Entity::with_components(
        EntityId::new(),
        [
            Component::new(pos(), json!({"x": 0, "y": 0})),
            Component::new(hp(), json!({"value": 10})),
        ],
    )
    .unwrap();
    let b = Entity::with_components(EntityId::new(), [Component::new(pos(), json!({"x": 4}))])
        .unwrap();
    let (a_id, b_id) = (a.id(), b.id());
    world.add_entities([a, b]).unwrap();

    let mut with_pos: Vec<EntityId> = world
        .entities_with_components(&[pos()])
        .iter()
        .map(Entity::id)
        .collect();
    with_pos.sort_by_key(|id| id.0);
    let mut expected = vec![a_id, b_id];
    expected.sort_by_key(|id| id.0);
    assert_eq!(with_pos, expected);

    let both: Vec<EntityId> = world
        .entities_with_components(&[pos(), hp()])
        .iter()
        .map(Entity::id)
        .collect();
    assert_eq!(both, vec![a_id]);

    let only_pos = Composition::new(Identifier::new("core", "marker"), ["core:pos"]);
    let strict: Vec<EntityId> = world
        .entities_with_strict_composition(&only_pos)
        .iter()
        .map(Entity::id)
        .collect();
    assert_eq!(strict, vec![b_id]);

    assert_eq!(world.entities_with_composition(&only_pos).len(), 2);
    assert!(matches!(
        world.add_entity(Entity::with_id(a_id)),
        Err(WorldError::DuplicateEntity(id)) if id == a_id
    ));
}

/// Client system exposing a `damage` event, so other systems can call it.
#[derive(Clone)]
struct Ledger {
    core: SystemCore,
}

impl Ledger {
    fn new(log: Arc<Mutex<Vec<i64>>>) -> Self {
        let mut core = SystemCore::new(Identifier::new("core", "ledger"), "Ledger", Side::Client);
        core.listen("damage", move |args| {
            let amount = args.first().and_then(Value::as_i64).unwrap_or(0);
            lock(&log).push(amount);
            Ok(json!(amount))
        })
        .unwrap();
        Self { core }
    }
}

impl System for Ledger {
    fn core(&self) -> &SystemCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut SystemCore {
        &mut self.core
    }
}

/// Server system that reports damage through the ledger during its pass.
#[derive(Clone)]
struct Combat {
    core: SystemCore,
    replies: Vec<Value>,
}

impl System for Combat {
    fn core(&self) -> &SystemCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut SystemCore {
        &mut self.core
    }

    fn update_server(&mut self, world: &World) {
        let Some(ledger) = world.system(&Identifier::new("core", "ledger")) else {
            return;
        };
        let reply = lock(&ledger).call("damage", &[json!(3)]).unwrap();
        self.replies.push(reply);
    }
}

#[test]
fn system_calls_another_system_mid_pass() {
    let world = World::new(Identifier::new("core", "overworld"));
    let log = Arc::new(Mutex::new(Vec::new()));

    world.add_system(Box::new(Ledger::new(Arc::clone(&log)))).unwrap();
    let combat = world
        .add_system(Box::new(Combat {
            core: SystemCore::new(Identifier::new("core", "combat"), "Combat", Side::Server),
            replies: Vec::new(),
        }))
        .unwrap();

    world.update_server();
    world.update_server();
    // Combat is server-only, so the client pass does not drive it.
    world.update_client();

    assert_eq!(*lock(&log), vec![3, 3]);
    assert!(lock(&combat).world().is_some());
    assert_eq!(
        world.system_ids(),
        vec![Identifier::new("core", "ledger"), Identifier::new("core", "combat")]
    );
}

#[test]
fn dropping_the_world_leaves_handles_dangling() {
    let world = World::new(Identifier::new("core", "overworld"));
    let id = EntityId::new();
    world.add_entity(Entity::with_id(id)).unwrap();
    let snapshot = world.entity(id).unwrap();
    assert!(snapshot.world().is_some());

    drop(world);
    assert!(snapshot.world().is_none());
}
