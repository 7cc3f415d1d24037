use schemstamp::{
    place, ActorId, BlockPosition, ChunkPos, Dimensions, PendingActions, PlacementSnapshot,
    Rotation, SchematicDocument, SparseWorld,
};
use std::sync::{Arc, Barrier};
use std::thread;

fn snapshot_at(x: i32) -> PlacementSnapshot {
    let doc = SchematicDocument::new("dot", Dimensions::new(1, 1, 1), "Alpha", vec![1], vec![0])
        .unwrap();
    let mut world = SparseWorld::default();
    world.load_chunk(ChunkPos::new(0, 0));
    place(&doc, BlockPosition::new(x, 0, 0), Rotation::None, &mut world).unwrap()
}

/// Many actors writing at once each end up with exactly their own last placement.
#[test]
fn concurrent_actors_keep_their_own_slot() {
    let store = Arc::new(PendingActions::new());
    let barrier = Arc::new(Barrier::new(8));

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let store = Arc::clone(&store);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let actor = ActorId::new(format!("player{}", t));
                barrier.wait();
                for x in 0..10 {
                    store.put(actor.clone(), snapshot_at(x));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(store.len(), 8);
    for t in 0..8 {
        let snapshot = store.take(&ActorId::new(format!("player{}", t))).unwrap();
        assert_eq!(snapshot.origin.x, 9);
    }
    assert!(store.is_empty());
}

/// Racing takes on one slot hand the snapshot to exactly one winner.
#[test]
fn take_is_exclusive() {
    for _ in 0..20 {
        let store = Arc::new(PendingActions::new());
        let actor = ActorId::from("steve");
        store.put(actor.clone(), snapshot_at(3));
        let barrier = Arc::new(Barrier::new(4));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let store = Arc::clone(&store);
                let barrier = Arc::clone(&barrier);
                let actor = actor.clone();
                thread::spawn(move || {
                    barrier.wait();
                    store.take(&actor).is_some()
                })
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|&won| won)
            .count();
        assert_eq!(winners, 1);
    }
}

/// Undo completions racing with fresh placements leave the slot empty or holding the latest
/// placement, never an older one.
#[test]
fn completion_never_removes_a_newer_placement() {
    let store = Arc::new(PendingActions::new());
    let actor = ActorId::from("alex");

    let writer = {
        let store = Arc::clone(&store);
        let actor = actor.clone();
        thread::spawn(move || {
            for x in 0..200 {
                store.put(actor.clone(), snapshot_at(x % 16));
            }
        })
    };
    let completer = {
        let store = Arc::clone(&store);
        let actor = actor.clone();
        thread::spawn(move || {
            for _ in 0..200 {
                if let Some(current) = store.get(&actor) {
                    store.remove_if_current(&actor, &current);
                }
            }
        })
    };
    writer.join().unwrap();
    completer.join().unwrap();

    assert!(store.len() <= 1);
    if let Some(snapshot) = store.take(&actor) {
        assert_eq!(snapshot.origin.x, 199 % 16);
    }
}
