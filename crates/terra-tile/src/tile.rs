//! Generated tile content.

use terra_biome::{SplatMap, VegetationInstance};
use terra_noise::GridPosition;

/// Everything sampled for one tile, handed to the external mesh/texture builder.
#[derive(Clone, Debug, PartialEq)]
pub struct TileData {
    /// Grid cell this tile covers.
    pub position: GridPosition,
    /// Samples per tile edge.
    pub resolution: u32,
    /// Height samples, row-major (`y * resolution + x`).
    pub heights: Vec<f64>,
    /// Normalized biome weights, if the graph has biomes.
    pub splat: Option<SplatMap>,
    /// Scattered vegetation.
    pub vegetation: Vec<VegetationInstance>,
}

impl TileData {
    /// Height at sample `(x, y)`.
    pub fn height(&self, x: u32, y: u32) -> f64 {
        self.heights[(y * self.resolution + x) as usize]
    }

    /// Lowest and highest height sample, or `None` for an empty tile.
    pub fn height_range(&self) -> Option<(f64, f64)> {
        let mut iter = self.heights.iter().copied();
        let first = iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), h| (lo.min(h), hi.max(h))))
    }
}

/// A tile owned by either the active set or the cache pool.
#[derive(Clone, Debug)]
pub struct Tile {
    data: TileData,
    cached_at: Option<u64>,
}

impl Tile {
    /// Wraps freshly built data.
    pub fn new(data: TileData) -> Self {
        Self {
            data,
            cached_at: None,
        }
    }

    /// Grid cell this tile covers.
    pub fn position(&self) -> GridPosition {
        self.data.position
    }

    /// The sampled content.
    pub fn data(&self) -> &TileData {
        &self.data
    }

    /// Consumes the tile, returning its content.
    pub fn into_data(self) -> TileData {
        self.data
    }

    /// Cache clock value when the tile last entered the pool; `None` while active.
    pub fn cached_at(&self) -> Option<u64> {
        self.cached_at
    }

    pub(crate) fn set_cached_at(&mut self, stamp: Option<u64>) {
        self.cached_at = stamp;
    }
}
