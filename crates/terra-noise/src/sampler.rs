//! Maps tile-local sample indices to world space and queries a generator.

use glam::DVec2;

use crate::{GeneratorRef, GridPosition};

/// Samples a generator on the grid of a single tile.
///
/// The world coordinate of sample `(x, y)` in the tile at `position` is
/// `position * length + (index / resolution) * length`, which makes sampling
/// resolution-independent: indices `i` at resolution `r` and `2i` at `2r` land on
/// exactly the same world point, so neighboring tiles meet without seams.
#[derive(Clone)]
pub struct GeneratorSampler {
    generator: GeneratorRef,
}

impl GeneratorSampler {
    /// Wraps a resolved generator tree.
    pub fn new(generator: GeneratorRef) -> Self {
        Self { generator }
    }

    /// The wrapped generator.
    pub fn generator(&self) -> &GeneratorRef {
        &self.generator
    }

    /// World-space XZ coordinate of sample `(x, y)`, before spread is applied.
    pub fn world_coordinates(
        x: u32,
        y: u32,
        position: GridPosition,
        resolution: u32,
        length: f64,
    ) -> DVec2 {
        let resolution = resolution.max(1) as f64;
        DVec2::new(
            position.x as f64 * length + (x as f64 / resolution) * length,
            position.z as f64 * length + (y as f64 / resolution) * length,
        )
    }

    /// Value of the generator at sample `(x, y)` of the tile at `position`.
    ///
    /// World coordinates are divided by `spread`; a non-positive spread is treated as 1.
    pub fn value(
        &self,
        x: u32,
        y: u32,
        position: GridPosition,
        resolution: u32,
        spread: f64,
        length: f64,
    ) -> f64 {
        let world = Self::world_coordinates(x, y, position, resolution, length);
        let spread = if spread > 0.0 { spread } else { 1.0 };
        self.generator.sample_2d(world.x / spread, world.y / spread)
    }
}
