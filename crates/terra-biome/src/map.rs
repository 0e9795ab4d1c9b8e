//! Dense per-cell buffers produced by biome sampling.

/// Raw channel samples for a square tile, three values per cell in the fixed order
/// height, temperature, moisture. Disabled channels hold 0.
#[derive(Clone, Debug, PartialEq)]
pub struct MapValues {
    resolution: u32,
    values: Vec<[f64; 3]>,
}

impl MapValues {
    /// A zero-filled map of `resolution × resolution` cells.
    pub fn zeros(resolution: u32) -> Self {
        let len = (resolution as usize) * (resolution as usize);
        Self {
            resolution,
            values: vec![[0.0; 3]; len],
        }
    }

    /// Builds a map from row-major cell values.
    ///
    /// Returns `None` if `values.len()` is not `resolution²`.
    pub fn from_values(resolution: u32, values: Vec<[f64; 3]>) -> Option<Self> {
        let len = (resolution as usize) * (resolution as usize);
        (values.len() == len).then_some(Self { resolution, values })
    }

    /// Edge length in cells.
    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    /// Channels at cell `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `x` or `y` is out of range.
    pub fn get(&self, x: u32, y: u32) -> [f64; 3] {
        self.values[self.index(x, y)]
    }

    /// Overwrites the channels at cell `(x, y)`.
    pub fn set(&mut self, x: u32, y: u32, channels: [f64; 3]) {
        let idx = self.index(x, y);
        self.values[idx] = channels;
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> &[[f64; 3]] {
        &self.values
    }

    /// Minimum and maximum over every channel of every cell.
    ///
    /// All three channels share one range, so they are compared on a common scale.
    /// An empty map yields `(0.0, 0.0)`.
    pub fn min_max(&self) -> (f64, f64) {
        if self.values.is_empty() {
            return (0.0, 0.0);
        }
        self.values
            .iter()
            .flatten()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            })
    }

    fn index(&self, x: u32, y: u32) -> usize {
        assert!(x < self.resolution && y < self.resolution);
        y as usize * self.resolution as usize + x as usize
    }
}

/// One scalar weight per cell of a square tile, row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct WeightMap {
    resolution: u32,
    weights: Vec<f64>,
}

impl WeightMap {
    /// A map with every weight 0.
    pub fn zeros(resolution: u32) -> Self {
        let len = (resolution as usize) * (resolution as usize);
        Self {
            resolution,
            weights: vec![0.0; len],
        }
    }

    /// Edge length in cells.
    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    /// Weight at cell `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `x` or `y` is out of range.
    pub fn get(&self, x: u32, y: u32) -> f64 {
        self.weights[self.index(x, y)]
    }

    /// Overwrites the weight at cell `(x, y)`.
    pub fn set(&mut self, x: u32, y: u32, weight: f64) {
        let idx = self.index(x, y);
        self.weights[idx] = weight;
    }

    /// All weights in row-major order.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub(crate) fn weights_mut(&mut self) -> &mut [f64] {
        &mut self.weights
    }

    /// Largest weight in the map, or 0 for an empty map.
    pub fn max_weight(&self) -> f64 {
        self.weights.iter().copied().fold(0.0, f64::max)
    }

    /// Whether every weight is exactly zero.
    pub fn is_zero(&self) -> bool {
        self.weights.iter().all(|&w| w == 0.0)
    }

    fn index(&self, x: u32, y: u32) -> usize {
        assert!(x < self.resolution && y < self.resolution);
        y as usize * self.resolution as usize + x as usize
    }
}
