//! Per-actor undo slots.
//!
//! Each actor has at most one pending placement. Placing again replaces it, undoing or ending
//! the session removes it. The map is sharded, so actors on different shards never contend and
//! no world access ever happens while a shard is locked.

use crate::placement::PlacementSnapshot;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Identity of whoever issued a placement, normally the player name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorId(SmolStr);

impl ActorId {
    pub fn new(id: impl Into<SmolStr>) -> Self {
        ActorId(id.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ActorId {
    fn from(id: &str) -> Self {
        ActorId::new(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEndReason {
    Left,
    Kicked,
}

/// Session-end notification delivered by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionEnd {
    pub actor: ActorId,
    pub reason: SessionEndReason,
    /// Another listener vetoed the event.
    pub cancelled: bool,
}

impl SessionEnd {
    pub fn new(actor: ActorId, reason: SessionEndReason) -> Self {
        SessionEnd {
            actor,
            reason,
            cancelled: false,
        }
    }
}

#[derive(Debug, Default)]
pub struct PendingActions {
    actions: DashMap<ActorId, Arc<PlacementSnapshot>>,
}

impl PendingActions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `snapshot` as the actor's pending action, returning the one it replaced.
    pub fn put(
        &self,
        actor: ActorId,
        snapshot: PlacementSnapshot,
    ) -> Option<Arc<PlacementSnapshot>> {
        let replaced = self.actions.insert(actor.clone(), Arc::new(snapshot));
        if replaced.is_some() {
            debug!(actor = %actor, "Discarded previous pending placement");
        }
        replaced
    }

    /// The actor's pending action, left in place.
    pub fn get(&self, actor: &ActorId) -> Option<Arc<PlacementSnapshot>> {
        self.actions.get(actor).map(|entry| Arc::clone(entry.value()))
    }

    pub fn take(&self, actor: &ActorId) -> Option<Arc<PlacementSnapshot>> {
        self.actions.remove(actor).map(|(_, snapshot)| snapshot)
    }

    pub fn remove(&self, actor: &ActorId) {
        self.actions.remove(actor);
    }

    /// Removes the actor's entry only if it is still `snapshot`.
    ///
    /// Returns `false` when the slot is empty or holds a newer placement; either way the slot is
    /// left untouched.
    pub fn remove_if_current(&self, actor: &ActorId, snapshot: &Arc<PlacementSnapshot>) -> bool {
        self.actions
            .remove_if(actor, |_, current| Arc::ptr_eq(current, snapshot))
            .is_some()
    }

    pub fn contains(&self, actor: &ActorId) -> bool {
        self.actions.contains_key(actor)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn on_session_end(&self, event: &SessionEnd) {
        if event.cancelled || event.actor.is_empty() {
            return;
        }
        if self.actions.remove(&event.actor).is_some() {
            debug!(actor = %event.actor, reason = ?event.reason, "Dropped pending placement");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block_position::{BlockPosition, ChunkPos};
    use crate::placement::place;
    use crate::schematic::SchematicDocument;
    use crate::volume::{Dimensions, Rotation};
    use crate::world::SparseWorld;

    fn snapshot_at(x: i32) -> PlacementSnapshot {
        let doc =
            SchematicDocument::new("one", Dimensions::new(1, 1, 1), "Alpha", vec![1], vec![0])
                .unwrap();
        let mut world = SparseWorld::default();
        world.load_chunk(ChunkPos::new(0, 0));
        place(&doc, BlockPosition::new(x, 0, 0), Rotation::None, &mut world).unwrap()
    }

    #[test]
    fn test_put_replaces() {
        let store = PendingActions::new();
        let steve = ActorId::from("steve");

        assert!(store.put(steve.clone(), snapshot_at(1)).is_none());
        let replaced = store.put(steve.clone(), snapshot_at(2)).unwrap();
        assert_eq!(replaced.origin.x, 1);
        assert_eq!(store.len(), 1);

        assert_eq!(store.take(&steve).unwrap().origin.x, 2);
        assert!(store.take(&steve).is_none());
    }

    #[test]
    fn test_get_leaves_entry_in_place() {
        let store = PendingActions::new();
        let alex = ActorId::from("alex");
        assert!(store.get(&alex).is_none());

        store.put(alex.clone(), snapshot_at(4));
        assert_eq!(store.get(&alex).unwrap().origin.x, 4);
        assert!(store.contains(&alex));
    }

    #[test]
    fn test_remove_if_current_keeps_newer() {
        let store = PendingActions::new();
        let alex = ActorId::from("alex");

        store.put(alex.clone(), snapshot_at(1));
        let first = store.get(&alex).unwrap();
        store.put(alex.clone(), snapshot_at(2));
        assert!(!store.remove_if_current(&alex, &first));
        assert_eq!(store.get(&alex).unwrap().origin.x, 2);

        let second = store.get(&alex).unwrap();
        assert!(store.remove_if_current(&alex, &second));
        assert!(!store.contains(&alex));
        assert!(!store.remove_if_current(&alex, &second));
    }

    #[test]
    fn test_session_end() {
        let store = PendingActions::new();
        let alex = ActorId::from("alex");
        store.put(alex.clone(), snapshot_at(1));

        let mut event = SessionEnd::new(alex.clone(), SessionEndReason::Kicked);
        event.cancelled = true;
        store.on_session_end(&event);
        assert!(store.contains(&alex));

        event.cancelled = false;
        store.on_session_end(&event);
        assert!(!store.contains(&alex));
        assert!(store.is_empty());
    }
}
