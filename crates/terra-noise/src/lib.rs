//! Scalar noise fields and their composition.
//!
//! A [`Generator`] is a pure function from coordinates to a value. Primitive sources wrap
//! the `noise` crate; combinators build trees out of them; [`GeneratorSampler`] maps
//! tile-grid sample indices into world space and queries a tree.

mod combine;
mod generator;
mod grid;
mod sampler;
mod sources;

pub use combine::{Arithmetic, ArithmeticOp, Blend, blend, combine, lerp};
pub use generator::{Constant, Generator, GeneratorRef};
pub use grid::GridPosition;
pub use sampler::GeneratorSampler;
pub use sources::{FractalNoise, FractalParams, NoiseKind};
