use std::sync::Arc;
use std::thread;

use serde_json::json;
use tessera_kernel::{Component, Entity, EntityId, Identifier, World};

const THREADS: usize = 8;
const PER_THREAD: usize = 50;

fn tag() -> Identifier {
    Identifier::new("core", "tag")
}

#[test]
fn concurrent_adds_and_queries_stay_consistent() {
    let world = World::new(Identifier::new("core", "shared"));

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let world = Arc::clone(&world);
            thread::spawn(move || {
                for i in 0..PER_THREAD {
                    let entity = Entity::with_components(
                        EntityId::new(),
                        [Component::new(tag(), json!({"thread": t, "index": i}))],
                    )
                    .unwrap();
                    world.add_entity(entity).unwrap();
                    // Every snapshot must be internally consistent.
                    for e in world.entities_by_component_id(&tag()) {
                        assert_eq!(e.component_count(), 1);
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(world.entity_count(), THREADS * PER_THREAD);
    assert_eq!(world.entities_by_component_id(&tag()).len(), THREADS * PER_THREAD);
}

#[test]
fn racing_duplicate_inserts_admit_exactly_one() {
    let world = World::new(Identifier::new("core", "shared"));
    let id = EntityId::new();

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let world = Arc::clone(&world);
            thread::spawn(move || world.add_entity(Entity::with_id(id)).is_ok())
        })
        .collect();

    let admitted = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|ok| *ok)
        .count();
    assert_eq!(admitted, 1);
    assert_eq!(world.entity_count(), 1);
}

#[test]
fn concurrent_modifications_are_not_lost() {
    let world = World::new(Identifier::new("core", "shared"));
    let counter = Identifier::new("core", "counter");
    let id = EntityId::new();
    world
        .add_entity(
            Entity::with_components(id, [Component::new(counter.clone(), json!({"n": 0}))])
                .unwrap(),
        )
        .unwrap();

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let world = Arc::clone(&world);
            let counter = counter.clone();
            thread::spawn(move || {
                for _ in 0..PER_THREAD {
                    world
                        .modify_entity(id, |e| {
                            let c = e.component_mut(&counter).unwrap();
                            let n = c.field("n").and_then(|v| v.as_u64()).unwrap();
                            c.set_field("n", json!(n + 1));
                        })
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let entity = world.entity(id).unwrap();
    let n = entity.component(&counter).unwrap().field("n").cloned();
    assert_eq!(n, Some(json!(THREADS * PER_THREAD)));
}
