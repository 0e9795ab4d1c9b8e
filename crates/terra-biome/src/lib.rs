//! Biome classification over sampled noise channels.
//!
//! A biome reads up to three channels (height, temperature, moisture), normalizes them
//! onto a shared range, and scores each cell by how comfortably the values sit inside
//! per-channel [`Constraint`]s. Several biomes together produce a [`SplatMap`].

mod biome;
mod constraint;
mod map;
mod preview;
mod splat;
mod vegetation;

pub use biome::{Biome, BiomeChannel, BiomeSamplers, BiomeSettings, Channel};
pub use constraint::Constraint;
pub use map::{MapValues, WeightMap};
pub use preview::{PreviewError, PreviewImage};
pub use splat::SplatMap;
pub use vegetation::{VegetationInstance, derive_tile_seed, scatter_vegetation, tile_rng};
