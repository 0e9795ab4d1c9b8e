//! Combinators that compose generators into trees.
//!
//! The `Option`-returning constructors encode the unset-input rule: if any operand is
//! missing, the composite is missing too. Callers never see a silent zero.

use std::sync::Arc;

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::{Generator, GeneratorRef};

/// Linear interpolation from `a` (at `t = 0`) to `b` (at `t = 1`). `t` is not clamped.
#[inline]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Binary arithmetic applied point-wise to two fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArithmeticOp {
    /// `lhs + rhs`
    Add,
    /// `lhs - rhs`
    Subtract,
    /// `lhs * rhs`
    Multiply,
}

impl ArithmeticOp {
    /// Applies the operation to two scalars.
    #[inline]
    pub fn apply(self, lhs: f64, rhs: f64) -> f64 {
        match self {
            Self::Add => lhs + rhs,
            Self::Subtract => lhs - rhs,
            Self::Multiply => lhs * rhs,
        }
    }
}

/// Point-wise arithmetic over two child generators.
pub struct Arithmetic {
    op: ArithmeticOp,
    lhs: GeneratorRef,
    rhs: GeneratorRef,
}

impl Arithmetic {
    /// Creates the combinator from two resolved children.
    pub fn new(op: ArithmeticOp, lhs: GeneratorRef, rhs: GeneratorRef) -> Self {
        Self { op, lhs, rhs }
    }
}

impl Generator for Arithmetic {
    fn sample(&self, point: DVec3) -> f64 {
        self.op.apply(self.lhs.sample(point), self.rhs.sample(point))
    }
}

/// Interpolates between two fields using a third as the factor.
pub struct Blend {
    a: GeneratorRef,
    b: GeneratorRef,
    mask: GeneratorRef,
}

impl Blend {
    /// Creates the combinator from three resolved children.
    pub fn new(a: GeneratorRef, b: GeneratorRef, mask: GeneratorRef) -> Self {
        Self { a, b, mask }
    }
}

impl Generator for Blend {
    fn sample(&self, point: DVec3) -> f64 {
        lerp(
            self.a.sample(point),
            self.b.sample(point),
            self.mask.sample(point),
        )
    }
}

/// Combines two optional generators, returning `None` if either is unset.
pub fn combine(
    op: ArithmeticOp,
    lhs: Option<GeneratorRef>,
    rhs: Option<GeneratorRef>,
) -> Option<GeneratorRef> {
    Some(Arc::new(Arithmetic::new(op, lhs?, rhs?)))
}

/// Blends two optional generators by an optional mask, returning `None` if any is unset.
pub fn blend(
    a: Option<GeneratorRef>,
    b: Option<GeneratorRef>,
    mask: Option<GeneratorRef>,
) -> Option<GeneratorRef> {
    Some(Arc::new(Blend::new(a?, b?, mask?)))
}
