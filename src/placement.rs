//! Stamping a schematic into the world and reverting it.
//!
//! Both directions first check that every chunk the volume spans is loaded; a volume is never
//! half-written into chunks that could still be generated later. Once the walk starts, a cell
//! whose chunk has gone missing is skipped and the operation still reports the full volume.

use crate::block_position::BlockPosition;
use crate::block_state::BlockState;
use crate::error::PlaceError;
use crate::schematic::SchematicDocument;
use crate::volume::{signed_extent, world_offset, Dimensions, Rotation};
use crate::world::WorldAccess;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Everything needed to undo one placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementSnapshot {
    /// World cell of local (0, 0, 0).
    pub origin: BlockPosition,
    pub rotation: Rotation,
    /// Unsigned extents of the placed schematic.
    pub dimensions: Dimensions,
    pub prior_blocks: Vec<u8>,
    pub prior_data: Vec<u8>,
    /// Cells that were actually overwritten.
    touched: Vec<bool>,
}

impl PlacementSnapshot {
    fn empty(origin: BlockPosition, rotation: Rotation, dimensions: Dimensions) -> Self {
        let volume = dimensions.volume();
        PlacementSnapshot {
            origin,
            rotation,
            dimensions,
            prior_blocks: vec![0; volume],
            prior_data: vec![0; volume],
            touched: vec![false; volume],
        }
    }

    pub fn rotate_x(&self) -> bool {
        self.rotation.rotate_x()
    }

    pub fn rotate_z(&self) -> bool {
        self.rotation.rotate_z()
    }

    pub fn rotate_both(&self) -> bool {
        self.rotation.rotate_both()
    }

    pub fn volume(&self) -> usize {
        self.dimensions.volume()
    }

    /// Number of cells that held a loaded chunk at placement time.
    pub fn touched_count(&self) -> usize {
        self.touched.iter().filter(|&&t| t).count()
    }

    pub fn prior_block(&self, index: usize) -> BlockState {
        BlockState {
            id: self.prior_blocks[index],
            meta: self.prior_data[index],
        }
    }

    fn record(&mut self, index: usize, prior: BlockState) {
        self.prior_blocks[index] = prior.id;
        self.prior_data[index] = prior.meta;
        self.touched[index] = true;
    }
}

fn ensure_resident<W: WorldAccess + ?Sized>(
    world: &W,
    origin: BlockPosition,
    rotation: Rotation,
    dimensions: Dimensions,
) -> Result<(), PlaceError> {
    let (signed_width, signed_length) =
        signed_extent(rotation, dimensions.width, dimensions.length);
    if world.is_region_resident(origin, signed_width, dimensions.height, signed_length) {
        Ok(())
    } else {
        Err(PlaceError::RegionNotReady {
            origin,
            signed_width,
            height: dimensions.height,
            signed_length,
        })
    }
}

/// Writes `document` into `world` with local (0, 0, 0) at `origin`, returning the overwritten state.
pub fn place<W: WorldAccess + ?Sized>(
    document: &SchematicDocument,
    origin: BlockPosition,
    rotation: Rotation,
    world: &mut W,
) -> Result<PlacementSnapshot, PlaceError> {
    let dimensions = document.dimensions();
    ensure_resident(world, origin, rotation, dimensions)?;

    let mut snapshot = PlacementSnapshot::empty(origin, rotation, dimensions);
    let mut skipped = 0usize;
    for (x, y, z) in dimensions.local_offsets() {
        let (dx, dy, dz) = world_offset(x, y, z, rotation);
        let pos = origin.offset(dx, dy, dz);
        let Some(prior) = world.get_block(pos) else {
            skipped += 1;
            continue;
        };
        let index = dimensions.index(x, y, z);
        snapshot.record(index, prior);
        if !world.set_block(pos, document.block_at_index(index)) {
            skipped += 1;
        }
    }

    debug!(
        schematic = document.name(),
        origin = %origin,
        rotation = %rotation,
        volume = dimensions.volume(),
        skipped,
        "Placed schematic"
    );
    Ok(snapshot)
}

/// Restores the state captured by `snapshot`. Returns the nominal volume of the placement.
pub fn undo<W: WorldAccess + ?Sized>(
    snapshot: &PlacementSnapshot,
    world: &mut W,
) -> Result<usize, PlaceError> {
    let PlacementSnapshot {
        origin,
        rotation,
        dimensions,
        ..
    } = *snapshot;
    ensure_resident(world, origin, rotation, dimensions)?;

    let mut skipped = 0usize;
    for (x, y, z) in dimensions.local_offsets() {
        let index = dimensions.index(x, y, z);
        if !snapshot.touched[index] {
            continue;
        }
        let (dx, dy, dz) = world_offset(x, y, z, rotation);
        if !world.set_block(origin.offset(dx, dy, dz), snapshot.prior_block(index)) {
            skipped += 1;
        }
    }

    debug!(
        origin = %origin,
        rotation = %rotation,
        volume = dimensions.volume(),
        skipped,
        "Reverted placement"
    );
    Ok(dimensions.volume())
}
