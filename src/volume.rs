//! Index math shared by schematics and placement snapshots.
//!
//! Volumes are stored as flat arrays with Y outermost and X innermost:
//! `index = width * (y * length + z) + x`. Rotation mirrors a volume about the
//! vertical axis by walking X and/or Z in the negative direction from the origin.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Extents of a volume along X (width), Y (height) and Z (length).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: i32,
    pub height: i32,
    pub length: i32,
}

impl Dimensions {
    pub fn new(width: i32, height: i32, length: i32) -> Self {
        Dimensions {
            width,
            height,
            length,
        }
    }

    /// Number of cells, or `None` if any extent is non-positive or the product overflows.
    pub fn checked_volume(&self) -> Option<usize> {
        if self.width <= 0 || self.height <= 0 || self.length <= 0 {
            return None;
        }
        (self.width as usize)
            .checked_mul(self.height as usize)?
            .checked_mul(self.length as usize)
    }

    pub fn volume(&self) -> usize {
        self.checked_volume().unwrap_or(0)
    }

    #[inline(always)]
    pub fn index(&self, x: i32, y: i32, z: i32) -> usize {
        flat_index(x, y, z, self.width, self.length)
    }

    /// Every local offset in storage order.
    pub fn local_offsets(&self) -> impl Iterator<Item = (i32, i32, i32)> {
        let (w, h, l) = (self.width.max(0), self.height.max(0), self.length.max(0));
        (0..h).flat_map(move |y| (0..l).flat_map(move |z| (0..w).map(move |x| (x, y, z))))
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} x {} x {}", self.width, self.height, self.length)
    }
}

/// Mirroring applied when stamping a volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Rotation {
    #[default]
    None,
    X,
    Z,
    XZ,
}

impl Rotation {
    pub const ALL: [Rotation; 4] = [Rotation::None, Rotation::X, Rotation::Z, Rotation::XZ];

    /// Maps the legacy `(rotate_x, rotate_z, rotate_both)` triple. At most one flag may be set.
    pub fn from_flags(rotate_x: bool, rotate_z: bool, rotate_both: bool) -> Option<Self> {
        match (rotate_x, rotate_z, rotate_both) {
            (false, false, false) => Some(Rotation::None),
            (true, false, false) => Some(Rotation::X),
            (false, true, false) => Some(Rotation::Z),
            (false, false, true) => Some(Rotation::XZ),
            _ => None,
        }
    }

    pub fn rotate_x(self) -> bool {
        self == Rotation::X
    }

    pub fn rotate_z(self) -> bool {
        self == Rotation::Z
    }

    pub fn rotate_both(self) -> bool {
        self == Rotation::XZ
    }

    #[inline(always)]
    pub fn flips_x(self) -> bool {
        matches!(self, Rotation::X | Rotation::XZ)
    }

    #[inline(always)]
    pub fn flips_z(self) -> bool {
        matches!(self, Rotation::Z | Rotation::XZ)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Rotation::None => "none",
            Rotation::X => "x",
            Rotation::Z => "z",
            Rotation::XZ => "xz",
        }
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRotation(pub String);

impl fmt::Display for UnknownRotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown rotation token `{}`", self.0)
    }
}

impl std::error::Error for UnknownRotation {}

impl FromStr for Rotation {
    type Err = UnknownRotation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Ok(Rotation::None),
            "x" => Ok(Rotation::X),
            "z" => Ok(Rotation::Z),
            "xz" => Ok(Rotation::XZ),
            _ => Err(UnknownRotation(s.trim().to_string())),
        }
    }
}

/// Flat storage slot of a local offset.
///
/// Inputs must satisfy `0 <= x < width`, `0 <= z < length` and `y >= 0`; callers
/// iterate within the volume, so this is only checked in debug builds.
#[inline(always)]
pub fn flat_index(x: i32, y: i32, z: i32, width: i32, length: i32) -> usize {
    debug_assert!(
        (0..width).contains(&x) && (0..length).contains(&z) && y >= 0,
        "local offset ({x}, {y}, {z}) outside {width} x ? x {length}"
    );
    (width as usize) * ((y as usize) * (length as usize) + (z as usize)) + (x as usize)
}

/// Width and length as seen from the origin once the rotation is applied. Height is never negated.
pub fn signed_extent(rotation: Rotation, width: i32, length: i32) -> (i32, i32) {
    let signed_width = if rotation.flips_x() { -width } else { width };
    let signed_length = if rotation.flips_z() { -length } else { length };
    (signed_width, signed_length)
}

/// World-space delta from the origin for a local offset.
#[inline(always)]
pub fn world_offset(local_x: i32, local_y: i32, local_z: i32, rotation: Rotation) -> (i32, i32, i32) {
    let dx = if rotation.flips_x() { -local_x } else { local_x };
    let dz = if rotation.flips_z() { -local_z } else { local_z };
    (dx, local_y, dz)
}
