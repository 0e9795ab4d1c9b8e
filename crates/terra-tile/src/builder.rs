//! Building tile content from a resolved graph.

use terra_biome::{Biome, SplatMap, scatter_vegetation};
use terra_config::GeneratorConfig;
use terra_graph::Graph;
use terra_noise::{GeneratorRef, GeneratorSampler, GridPosition};

use crate::TileData;

/// Errors raised while building tiles.
#[derive(Debug, thiserror::Error)]
pub enum TileError {
    /// The graph has no usable end node.
    #[error("graph has no terrain generator")]
    NoGenerator,

    /// A tile needs at least one sample per edge.
    #[error("invalid tile resolution {0}")]
    InvalidResolution(u32),

    /// The worker pool has shut down.
    #[error("tile workers are not running")]
    WorkersStopped,

    /// A builder failed for one position.
    #[error("failed to build tile {position}: {reason}")]
    Build {
        /// Tile that failed.
        position: GridPosition,
        /// Builder-supplied reason.
        reason: String,
    },
}

/// Produces tile content for a grid position. Called from worker threads.
pub trait TileBuilder: Send + Sync {
    /// Builds the tile at `position` with `resolution` samples per edge.
    fn build(&self, position: GridPosition, resolution: u32) -> Result<TileData, TileError>;
}

/// Samples a graph's terrain generator and biomes.
///
/// Holds generators resolved once from the graph, so building never walks the graph.
pub struct GraphTileBuilder {
    height: GeneratorSampler,
    biomes: Vec<Biome>,
    settings: GeneratorConfig,
}

impl GraphTileBuilder {
    /// Builds from an already resolved generator and biome set.
    pub fn new(height: GeneratorRef, biomes: Vec<Biome>, settings: GeneratorConfig) -> Self {
        Self {
            height: GeneratorSampler::new(height),
            biomes,
            settings,
        }
    }

    /// Resolves the graph's final generator and biomes.
    pub fn from_graph(graph: &Graph, settings: &GeneratorConfig) -> Result<Self, TileError> {
        let height = graph.graph_generator().ok_or(TileError::NoGenerator)?;
        Ok(Self::new(height, graph.biomes(), settings.clone()))
    }

    /// Sampling settings in use.
    pub fn settings(&self) -> &GeneratorConfig {
        &self.settings
    }

    /// Biomes sampled into each tile's splat map.
    pub fn biomes(&self) -> &[Biome] {
        &self.biomes
    }
}

impl TileBuilder for GraphTileBuilder {
    fn build(&self, position: GridPosition, resolution: u32) -> Result<TileData, TileError> {
        if resolution == 0 {
            return Err(TileError::InvalidResolution(resolution));
        }
        let GeneratorConfig {
            length,
            spread,
            seed,
            ..
        } = self.settings;

        let mut heights = Vec::with_capacity((resolution * resolution) as usize);
        for y in 0..resolution {
            for x in 0..resolution {
                heights.push(self.height.value(x, y, position, resolution, spread, length));
            }
        }

        let (splat, vegetation) = if self.biomes.is_empty() {
            (None, Vec::new())
        } else {
            let splat = SplatMap::from_biomes(&self.biomes, position, resolution, spread, length);
            let vegetation = scatter_vegetation(&self.biomes, &splat, position, length, seed);
            (Some(splat), vegetation)
        };

        Ok(TileData {
            position,
            resolution,
            heights,
            splat,
            vegetation,
        })
    }
}
