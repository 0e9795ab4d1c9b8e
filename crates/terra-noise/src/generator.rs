//! The generator trait and the trivial constant field.

use std::sync::Arc;

use glam::DVec3;

/// A deterministic scalar field.
///
/// Implementations must be pure: the same point always yields the same value, and
/// sampling never mutates shared state, so a tree can be queried from any thread.
pub trait Generator: Send + Sync {
    /// Value of the field at a 3D point.
    fn sample(&self, point: DVec3) -> f64;

    /// Value of the field on the `z = 0` plane.
    fn sample_2d(&self, x: f64, y: f64) -> f64 {
        self.sample(DVec3::new(x, y, 0.0))
    }
}

/// Shared handle to a generator tree. Cheap to clone and safe to send to workers.
pub type GeneratorRef = Arc<dyn Generator>;

/// A field with the same value everywhere.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Constant(pub f64);

impl Constant {
    /// Wrap the constant as a shared generator.
    pub fn shared(value: f64) -> GeneratorRef {
        Arc::new(Self(value))
    }
}

impl Generator for Constant {
    fn sample(&self, _point: DVec3) -> f64 {
        self.0
    }
}
