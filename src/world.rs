use crate::block_position::{floor_mod, BlockPosition, ChunkPos};
use crate::block_state::BlockState;
use crate::config::WorldSettings;
use rustc_hash::FxHashMap;

pub const DEFAULT_CHUNK_SIZE: i32 = 16;
pub const DEFAULT_MAX_HEIGHT: i32 = 128;

// ─── World Interface ────────────────────────────────────────────────────────

/// Block storage the placement engine writes into.
///
/// The world is owned by the host and may load or unload chunks at any time, so reads and
/// writes report an absent chunk instead of failing.
pub trait WorldAccess {
    /// Horizontal edge length of a chunk, in blocks.
    fn chunk_size(&self) -> i32 {
        DEFAULT_CHUNK_SIZE
    }

    /// Exclusive upper bound of valid Y coordinates. The lower bound is 0.
    fn max_height(&self) -> i32;

    fn is_chunk_loaded(&self, chunk: ChunkPos) -> bool;

    /// `None` if the containing chunk is not loaded.
    fn get_block(&self, pos: BlockPosition) -> Option<BlockState>;

    /// Returns `false` without writing if the containing chunk is not loaded.
    fn set_block(&mut self, pos: BlockPosition, block: BlockState) -> bool;

    fn chunk_of(&self, pos: BlockPosition) -> ChunkPos {
        pos.chunk(self.chunk_size())
    }

    /// Whether every chunk spanned by a volume anchored at `origin` is loaded.
    ///
    /// Negative extents grow the volume toward negative X/Z. The volume must also fit
    /// between Y = 0 and [`max_height`](Self::max_height), and every cell must have a
    /// representable coordinate.
    fn is_region_resident(
        &self,
        origin: BlockPosition,
        signed_width: i32,
        height: i32,
        signed_length: i32,
    ) -> bool {
        let top = origin.y as i64 + height as i64;
        if origin.y < 0 || top > self.max_height() as i64 {
            return false;
        }

        let Some(corner) = far_corner(origin, signed_width, signed_length) else {
            return false;
        };
        let start = self.chunk_of(origin);
        let end = self.chunk_of(corner);
        if start == end {
            return true;
        }

        let (min_x, max_x) = (start.x.min(end.x), start.x.max(end.x));
        let (min_z, max_z) = (start.z.min(end.z), start.z.max(end.z));
        for x in min_x..=max_x {
            for z in min_z..=max_z {
                if !self.is_chunk_loaded(ChunkPos::new(x, z)) {
                    return false;
                }
            }
        }
        true
    }
}

/// Last cell touched on the origin's Y layer when walking `signed_width` x `signed_length`.
/// `None` when that cell lies outside the `i32` coordinate range.
pub fn far_corner(
    origin: BlockPosition,
    signed_width: i32,
    signed_length: i32,
) -> Option<BlockPosition> {
    origin.checked_offset(
        signed_width - signed_width.signum(),
        0,
        signed_length - signed_length.signum(),
    )
}

// ─── In-memory World ────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct Chunk {
    blocks: Vec<u8>,
    data: Vec<u8>,
}

impl Chunk {
    fn empty(cells: usize) -> Self {
        Chunk {
            blocks: vec![0; cells],
            data: vec![0; cells],
        }
    }
}

/// Sparse chunk map. Unloaded chunks hold no storage and reject reads and writes.
#[derive(Debug, Clone)]
pub struct SparseWorld {
    chunk_size: i32,
    max_height: i32,
    chunks: FxHashMap<ChunkPos, Chunk>,
}

impl Default for SparseWorld {
    fn default() -> Self {
        SparseWorld::new(DEFAULT_CHUNK_SIZE, DEFAULT_MAX_HEIGHT)
    }
}

impl SparseWorld {
    pub fn new(chunk_size: i32, max_height: i32) -> Self {
        SparseWorld {
            chunk_size: chunk_size.max(1),
            max_height: max_height.max(1),
            chunks: FxHashMap::default(),
        }
    }

    pub fn with_settings(settings: &WorldSettings) -> Self {
        SparseWorld::new(settings.chunk_size, settings.max_height)
    }

    fn cells_per_chunk(&self) -> usize {
        (self.chunk_size as usize) * (self.chunk_size as usize) * (self.max_height as usize)
    }

    /// Loads an all-air chunk. Returns `false` if it was already loaded.
    pub fn load_chunk(&mut self, pos: ChunkPos) -> bool {
        if self.chunks.contains_key(&pos) {
            return false;
        }
        let cells = self.cells_per_chunk();
        self.chunks.insert(pos, Chunk::empty(cells));
        true
    }

    /// Loads every chunk in the inclusive rectangle between `a` and `b`.
    pub fn load_area(&mut self, a: ChunkPos, b: ChunkPos) {
        for x in a.x.min(b.x)..=a.x.max(b.x) {
            for z in a.z.min(b.z)..=a.z.max(b.z) {
                self.load_chunk(ChunkPos::new(x, z));
            }
        }
    }

    /// Drops a chunk and its contents.
    pub fn unload_chunk(&mut self, pos: ChunkPos) -> bool {
        self.chunks.remove(&pos).is_some()
    }

    pub fn loaded_chunks(&self) -> Vec<ChunkPos> {
        let mut chunks: Vec<ChunkPos> = self.chunks.keys().copied().collect();
        chunks.sort();
        chunks
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Chunk key and cell index, `None` when `y` is outside the world.
    fn locate(&self, pos: BlockPosition) -> Option<(ChunkPos, usize)> {
        if !(0..self.max_height).contains(&pos.y) {
            return None;
        }
        let size = self.chunk_size as usize;
        let local_x = floor_mod(pos.x, self.chunk_size) as usize;
        let local_z = floor_mod(pos.z, self.chunk_size) as usize;
        let index = (pos.y as usize * size + local_z) * size + local_x;
        Some((pos.chunk(self.chunk_size), index))
    }
}

impl WorldAccess for SparseWorld {
    fn chunk_size(&self) -> i32 {
        self.chunk_size
    }

    fn max_height(&self) -> i32 {
        self.max_height
    }

    fn is_chunk_loaded(&self, chunk: ChunkPos) -> bool {
        self.chunks.contains_key(&chunk)
    }

    fn get_block(&self, pos: BlockPosition) -> Option<BlockState> {
        let (key, index) = self.locate(pos)?;
        let chunk = self.chunks.get(&key)?;
        Some(BlockState {
            id: chunk.blocks[index],
            meta: chunk.data[index],
        })
    }

    fn set_block(&mut self, pos: BlockPosition, block: BlockState) -> bool {
        let Some((key, index)) = self.locate(pos) else {
            return false;
        };
        match self.chunks.get_mut(&key) {
            Some(chunk) => {
                chunk.blocks[index] = block.id;
                chunk.data[index] = block.meta;
                true
            }
            None => false,
        }
    }
}
