use serde::{Deserialize, Serialize};
use std::fmt;

/// Absolute block coordinate in the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct BlockPosition {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPosition {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        BlockPosition { x, y, z }
    }

    pub fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        BlockPosition {
            x: self.x + dx,
            y: self.y + dy,
            z: self.z + dz,
        }
    }

    /// `None` if any coordinate would leave the `i32` range.
    pub fn checked_offset(self, dx: i32, dy: i32, dz: i32) -> Option<Self> {
        Some(BlockPosition {
            x: self.x.checked_add(dx)?,
            y: self.y.checked_add(dy)?,
            z: self.z.checked_add(dz)?,
        })
    }

    /// The horizontal partition containing this block.
    pub fn chunk(self, chunk_size: i32) -> ChunkPos {
        ChunkPos {
            x: floor_div(self.x, chunk_size),
            z: floor_div(self.z, chunk_size),
        }
    }
}

impl From<(i32, i32, i32)> for BlockPosition {
    fn from((x, y, z): (i32, i32, i32)) -> Self {
        BlockPosition { x, y, z }
    }
}

impl fmt::Display for BlockPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Horizontal chunk coordinate. Chunks span the full world height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkPos {
    pub x: i32,
    pub z: i32,
}

impl ChunkPos {
    pub fn new(x: i32, z: i32) -> Self {
        ChunkPos { x, z }
    }
}

impl fmt::Display for ChunkPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.x, self.z)
    }
}

/// Floor division that handles negative numbers correctly.
/// Rust's integer division truncates toward zero, but we need toward negative infinity.
pub fn floor_div(a: i32, b: i32) -> i32 {
    let d = a / b;
    let r = a % b;
    if (r != 0) && ((r ^ b) < 0) {
        d - 1
    } else {
        d
    }
}

/// Floor modulo that handles negative numbers correctly.
pub fn floor_mod(a: i32, b: i32) -> i32 {
    ((a % b) + b) % b
}
