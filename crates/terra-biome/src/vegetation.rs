//! Deterministic per-tile vegetation scattering.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use glam::DVec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use terra_noise::GridPosition;

use crate::{Biome, SplatMap};

/// A single placed plant or tree.
#[derive(Clone, Debug, PartialEq)]
pub struct VegetationInstance {
    /// World-space XZ position.
    pub position: DVec2,
    /// Index of the biome that placed it.
    pub biome: usize,
    /// Archetype from the biome's settings.
    pub tree_type: String,
}

/// Derive a u64 seed for a tile from the world seed and its grid position.
pub fn derive_tile_seed(world_seed: u64, position: GridPosition) -> u64 {
    let mut hasher = DefaultHasher::new();
    world_seed.hash(&mut hasher);
    position.x.hash(&mut hasher);
    position.z.hash(&mut hasher);
    hasher.finish()
}

/// Deterministic RNG for a specific tile.
pub fn tile_rng(world_seed: u64, position: GridPosition) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(derive_tile_seed(world_seed, position))
}

/// Scatters vegetation over one tile.
///
/// Each cell draws from the tile RNG in a fixed order, so the result depends only on
/// the seed, the tile position, and the splat weights. A cell sprouts the dominant
/// biome's tree type with probability `vegetation_density * weight`.
pub fn scatter_vegetation(
    biomes: &[Biome],
    splat: &SplatMap,
    position: GridPosition,
    length: f64,
    world_seed: u64,
) -> Vec<VegetationInstance> {
    let mut rng = tile_rng(world_seed, position);
    let resolution = splat.resolution();
    let cell = length / resolution.max(1) as f64;
    let origin = DVec2::new(position.x as f64 * length, position.z as f64 * length);

    let mut instances = Vec::new();
    for y in 0..resolution {
        for x in 0..resolution {
            let roll: f64 = rng.random();
            let jitter = DVec2::new(rng.random(), rng.random());

            let Some((index, weight)) = splat.dominant(x, y) else {
                continue;
            };
            let Some(biome) = biomes.get(index) else {
                continue;
            };
            let settings = biome.settings();
            let Some(tree_type) = settings.tree_type.as_ref() else {
                continue;
            };

            if roll < settings.vegetation_density.clamp(0.0, 1.0) * weight {
                instances.push(VegetationInstance {
                    position: origin + (DVec2::new(x as f64, y as f64) + jitter) * cell,
                    biome: index,
                    tree_type: tree_type.clone(),
                });
            }
        }
    }

    tracing::trace!(tile = %position, count = instances.len(), "scattered vegetation");
    instances
}
