use schemstamp::pending::SessionEndReason;
use schemstamp::{
    ActorId, BlockPosition, BlockState, ChunkPos, CommandError, CommandReply, Dimensions,
    Invocation, PendingActions, SchematicCommands, SchematicDocument, SchematicLibrary,
    SchematicsConfig, SessionEnd, SparseWorld, WorldAccess,
};
use std::sync::Arc;
use tempfile::TempDir;

struct Fixture {
    _dir: TempDir,
    commands: SchematicCommands,
    pending: Arc<PendingActions>,
    world: SparseWorld,
}

fn fixture() -> Fixture {
    let dir = TempDir::new().unwrap();
    let config = SchematicsConfig::default().with_storage_root(dir.path());
    let library = SchematicLibrary::from_config(&config);
    library
        .save(
            &SchematicDocument::new(
                "hut",
                Dimensions::new(3, 2, 3),
                "Alpha",
                vec![4; 18],
                vec![1; 18],
            )
            .unwrap(),
        )
        .unwrap();

    let pending = Arc::new(PendingActions::new());
    let commands = SchematicCommands::from_config(&config, Arc::clone(&pending));
    let mut world = SparseWorld::with_settings(&config.world);
    world.load_area(ChunkPos::new(-1, -1), ChunkPos::new(1, 1));
    Fixture {
        _dir: dir,
        commands,
        pending,
        world,
    }
}

fn run(fx: &mut Fixture, actor: &ActorId, at: BlockPosition, line: &str) -> Result<CommandReply, CommandError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let invocation = Invocation {
        actor,
        position: at,
    };
    fx.commands.dispatch(&invocation, &tokens, &mut fx.world)
}

/// place, info and undo report the same block count and restore the terrain.
#[test]
fn place_info_undo_flow() {
    let mut fx = fixture();
    let steve = ActorId::from("steve");
    let at = BlockPosition::new(4, 60, 4);
    fx.world.set_block(at, BlockState::new(2));

    let reply = run(&mut fx, &steve, at, "place hut xz").unwrap();
    assert_eq!(reply.to_string(), "Schematic hut (18 blocks) has been placed");
    assert_eq!(fx.world.get_block(at), Some(BlockState::new(4).with_meta(1)));
    assert_eq!(fx.world.get_block(BlockPosition::new(2, 61, 2)), Some(BlockState::new(4).with_meta(1)));
    assert!(fx.pending.contains(&steve));

    let info = run(&mut fx, &steve, at, "info hut").unwrap();
    assert_eq!(
        info.to_string(),
        "Width(X) x Height(Y) x Length(Z): 3 x 2 x 3 (18 blocks)"
    );

    let reverted = run(&mut fx, &steve, at, "undo").unwrap();
    assert_eq!(
        reverted.to_string(),
        "Schematic placement has been successfully reverted (18 blocks)"
    );
    assert_eq!(fx.world.get_block(at), Some(BlockState::new(2)));
    assert_eq!(fx.world.get_block(BlockPosition::new(2, 61, 2)), Some(BlockState::AIR));
    assert!(fx.pending.is_empty());
}

/// Undo with nothing pending, unknown names and unknown rotations map to their chat messages.
#[test]
fn user_facing_errors() {
    let mut fx = fixture();
    let alex = ActorId::from("alex");
    let at = BlockPosition::new(0, 60, 0);

    let err = run(&mut fx, &alex, at, "undo").unwrap_err();
    assert_eq!(err.to_string(), "No changes were made by you");

    let err = run(&mut fx, &alex, at, "place castle").unwrap_err();
    assert_eq!(err.to_string(), "Schematic file is not found: castle");

    let err = run(&mut fx, &alex, at, "place hut y").unwrap_err();
    assert!(matches!(err, CommandError::UnknownRotation(ref token) if token == "y"));
    assert!(fx.pending.is_empty());
}

#[test]
fn incomplete_commands_show_help() {
    let mut fx = fixture();
    let alex = ActorId::from("alex");
    let at = BlockPosition::new(0, 60, 0);
    for line in ["", "place", "info", "dance"] {
        assert_eq!(run(&mut fx, &alex, at, line).unwrap(), CommandReply::Help, "{:?}", line);
    }
}

/// A placement reaching into unloaded chunks is refused and nothing becomes pending.
#[test]
fn place_outside_loaded_area() {
    let mut fx = fixture();
    let alex = ActorId::from("alex");
    // Chunk (2, 0) is not loaded.
    let at = BlockPosition::new(31, 60, 4);

    let err = run(&mut fx, &alex, at, "place hut").unwrap_err();
    assert_eq!(
        err.to_string(),
        "The schematic is too big - required chunks are not loaded/created yet"
    );
    assert!(!fx.pending.contains(&alex));
}

/// When undo cannot run, the pending placement survives for a later retry.
#[test]
fn failed_undo_keeps_the_snapshot() {
    let mut fx = fixture();
    let alex = ActorId::from("alex");
    let at = BlockPosition::new(15, 60, 15);
    run(&mut fx, &alex, at, "place hut").unwrap();

    fx.world.unload_chunk(ChunkPos::new(1, 1));
    let err = run(&mut fx, &alex, at, "undo").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Can not revert the changes - required chunks are not loaded"
    );
    assert!(fx.pending.contains(&alex));

    fx.world.load_chunk(ChunkPos::new(1, 1));
    assert!(run(&mut fx, &alex, at, "undo").is_ok());
    assert!(!fx.pending.contains(&alex));
}

/// A second placement replaces the first as the pending undo; only one undo is available.
#[test]
fn second_place_replaces_pending_undo() {
    let mut fx = fixture();
    let steve = ActorId::from("steve");
    let first = BlockPosition::new(0, 60, 0);
    let second = BlockPosition::new(8, 60, 8);

    run(&mut fx, &steve, first, "place hut").unwrap();
    run(&mut fx, &steve, second, "place hut").unwrap();
    run(&mut fx, &steve, second, "undo").unwrap();

    assert_eq!(fx.world.get_block(second), Some(BlockState::AIR));
    assert_eq!(fx.world.get_block(first), Some(BlockState::new(4).with_meta(1)));
    assert!(run(&mut fx, &steve, second, "undo").is_err());
}

/// Leaving drops the pending undo; a cancelled kick does not.
#[test]
fn session_end_discards_pending() {
    let mut fx = fixture();
    let steve = ActorId::from("steve");
    run(&mut fx, &steve, BlockPosition::new(0, 60, 0), "place hut").unwrap();

    let mut kick = SessionEnd::new(steve.clone(), SessionEndReason::Kicked);
    kick.cancelled = true;
    fx.pending.on_session_end(&kick);
    assert!(fx.pending.contains(&steve));

    fx.pending
        .on_session_end(&SessionEnd::new(steve.clone(), SessionEndReason::Left));
    assert!(!fx.pending.contains(&steve));
}

#[test]
fn listing_paginates() {
    let mut fx = fixture();
    let alex = ActorId::from("alex");
    let at = BlockPosition::new(0, 60, 0);

    let reply = run(&mut fx, &alex, at, "list").unwrap();
    assert_eq!(reply.lines(), vec!["Schematics [1/1]:", "1: hut"]);

    let err = run(&mut fx, &alex, at, "list 2").unwrap_err();
    assert_eq!(err.to_string(), "Only page is available");

    // Non-numeric page falls back to the first page.
    assert!(run(&mut fx, &alex, at, "list two").is_ok());
}

/// A world whose chunk queries end the actor's session, then report the chunk as missing.
struct DisconnectingWorld<'a> {
    inner: &'a mut SparseWorld,
    pending: Arc<PendingActions>,
    actor: ActorId,
}

impl WorldAccess for DisconnectingWorld<'_> {
    fn max_height(&self) -> i32 {
        self.inner.max_height()
    }

    fn is_chunk_loaded(&self, _chunk: ChunkPos) -> bool {
        self.pending
            .on_session_end(&SessionEnd::new(self.actor.clone(), SessionEndReason::Left));
        false
    }

    fn get_block(&self, pos: BlockPosition) -> Option<BlockState> {
        self.inner.get_block(pos)
    }

    fn set_block(&mut self, pos: BlockPosition, block: BlockState) -> bool {
        self.inner.set_block(pos, block)
    }
}

/// A session that ends while an undo is failing stays ended: the snapshot is not put back.
#[test]
fn session_end_during_failed_undo_discards_snapshot() {
    let mut fx = fixture();
    let alex = ActorId::from("alex");
    // Spans four chunks, so the residency check has to query the world.
    let at = BlockPosition::new(15, 60, 15);
    run(&mut fx, &alex, at, "place hut").unwrap();
    assert!(fx.pending.contains(&alex));

    let mut world = DisconnectingWorld {
        inner: &mut fx.world,
        pending: Arc::clone(&fx.pending),
        actor: alex.clone(),
    };
    let err = fx.commands.undo(&alex, &mut world).unwrap_err();
    assert!(matches!(err, CommandError::UndoRegionNotReady(_)));
    assert!(!fx.pending.contains(&alex));
    assert!(fx.pending.is_empty());
}

/// A placement made while an undo is running is not removed when that undo completes.
#[test]
fn undo_does_not_remove_a_newer_placement() {
    let mut fx = fixture();
    let steve = ActorId::from("steve");
    let at = BlockPosition::new(0, 60, 0);
    run(&mut fx, &steve, at, "place hut").unwrap();

    let older = fx.pending.get(&steve).unwrap();
    run(&mut fx, &steve, BlockPosition::new(8, 60, 8), "place hut").unwrap();
    assert!(!fx.pending.remove_if_current(&steve, &older));
    assert!(fx.pending.contains(&steve));
}

/// Origins at the edge of the coordinate range are refused instead of overflowing.
#[test]
fn place_at_coordinate_limit_is_refused() {
    let mut fx = fixture();
    let alex = ActorId::from("alex");

    for at in [
        BlockPosition::new(i32::MAX, 60, 0),
        BlockPosition::new(0, 60, i32::MAX - 1),
    ] {
        let err = run(&mut fx, &alex, at, "place hut").unwrap_err();
        assert!(matches!(err, CommandError::PlaceRegionNotReady(_)), "{}", at);
    }
    let err = run(&mut fx, &alex, BlockPosition::new(i32::MIN, 60, 0), "place hut x").unwrap_err();
    assert!(matches!(err, CommandError::PlaceRegionNotReady(_)));
    assert!(!fx.pending.contains(&alex));
}
