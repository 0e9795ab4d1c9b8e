//! Integer tile-grid coordinates.

use std::fmt;

/// Position of a tile in the world grid.
///
/// `x` runs along world X and `z` along world Z. Equality and hashing are by value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridPosition {
    /// Grid X coordinate.
    pub x: i32,
    /// Grid Z coordinate.
    pub z: i32,
}

impl GridPosition {
    /// The grid origin.
    pub const ZERO: Self = Self { x: 0, z: 0 };

    /// Creates a grid position.
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// The tile containing the world-space point `(world_x, world_z)`, using floor division.
    pub fn from_world(world_x: f64, world_z: f64, length: f64) -> Self {
        Self {
            x: (world_x / length).floor() as i32,
            z: (world_z / length).floor() as i32,
        }
    }

    /// The grid position nearest to `(world_x, world_z)` in units of `length`.
    pub fn from_world_rounded(world_x: f64, world_z: f64, length: f64) -> Self {
        Self {
            x: (world_x / length).round() as i32,
            z: (world_z / length).round() as i32,
        }
    }

    /// The four axis-aligned neighbors, ordered Top, Right, Bottom, Left.
    ///
    /// Coordinates saturate at the `i32` range, so at the edge of the grid a neighbor
    /// may equal `self`.
    pub fn neighbors(self) -> [Self; 4] {
        [
            self.offset(0, 1),
            self.offset(1, 0),
            self.offset(0, -1),
            self.offset(-1, 0),
        ]
    }

    /// Euclidean distance in grid units.
    pub fn distance(self, other: Self) -> f64 {
        let dx = (self.x as i64 - other.x as i64) as f64;
        let dz = (self.z as i64 - other.z as i64) as f64;
        dx.hypot(dz)
    }

    /// Squared Euclidean distance in grid units, saturating at `i64::MAX`.
    pub fn distance_sq(self, other: Self) -> i64 {
        let dx = self.x as i64 - other.x as i64;
        let dz = self.z as i64 - other.z as i64;
        dx.saturating_mul(dx).saturating_add(dz.saturating_mul(dz))
    }

    /// Returns this position shifted by `(dx, dz)`, saturating at the `i32` range.
    pub fn offset(self, dx: i32, dz: i32) -> Self {
        Self::new(self.x.saturating_add(dx), self.z.saturating_add(dz))
    }

    /// Returns this position shifted by `(dx, dz)`, or `None` if it leaves the grid.
    pub fn checked_offset(self, dx: i32, dz: i32) -> Option<Self> {
        Some(Self::new(self.x.checked_add(dx)?, self.z.checked_add(dz)?))
    }
}

impl fmt::Display for GridPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.x, self.z)
    }
}
