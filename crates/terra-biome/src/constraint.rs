//! Normalized value ranges with soft edges.

use serde::{Deserialize, Serialize};

const PLATEAU_EPSILON: f64 = 1e-9;

/// An inclusive `[min, max]` range over the normalized `[0, 1]` domain.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    min: f64,
    max: f64,
}

impl Constraint {
    /// The whole normalized domain.
    pub const FULL: Self = Self { min: 0.0, max: 1.0 };

    /// Creates a constraint. Bounds are clamped to `[0, 1]` and swapped if reversed.
    pub fn new(min: f64, max: f64) -> Self {
        let a = min.clamp(0.0, 1.0);
        let b = max.clamp(0.0, 1.0);
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Lower bound.
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Upper bound.
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Whether `value` lies in `[min, max]`, bounds included.
    pub fn fits(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }

    /// Soft membership weight of `value`.
    ///
    /// The weight is 1 in the interior and falls linearly to 0 over a margin of `blend`
    /// measured inward from each bound. The margin is capped at half the range, so the
    /// midpoint always weighs 1 and the bounds always weigh 0. Values outside the range
    /// weigh 0. With `blend == 0` every strictly interior value weighs 1.
    pub fn weight(&self, value: f64, blend: f64) -> f64 {
        if !self.fits(value) || value <= self.min || value >= self.max {
            return 0.0;
        }

        let half = (self.max - self.min) * 0.5;
        let margin = blend.max(0.0).min(half);
        if margin <= 0.0 {
            return 1.0;
        }

        let edge = (value - self.min).min(self.max - value);
        let ratio = edge / margin;
        // Absorbs rounding in `half` so the midpoint reaches full weight.
        if ratio >= 1.0 - PLATEAU_EPSILON {
            1.0
        } else {
            ratio.max(0.0)
        }
    }
}

impl Default for Constraint {
    fn default() -> Self {
        Self::FULL
    }
}
