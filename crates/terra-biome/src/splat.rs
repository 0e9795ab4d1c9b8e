//! Aggregation of several biomes into per-cell splat weights.

use terra_noise::GridPosition;

use crate::{Biome, WeightMap};

/// One weight layer per biome, normalized so the layers sum to 1 wherever any biome
/// applies. Cells no biome claims are 0 in every layer.
#[derive(Clone, Debug, PartialEq)]
pub struct SplatMap {
    resolution: u32,
    layers: Vec<WeightMap>,
}

impl SplatMap {
    /// Samples every biome over one tile and normalizes the result.
    pub fn from_biomes(
        biomes: &[Biome],
        position: GridPosition,
        resolution: u32,
        spread: f64,
        length: f64,
    ) -> Self {
        let layers = biomes
            .iter()
            .map(|biome| biome.weight_map(position, resolution, spread, length))
            .collect();
        Self::from_layers(resolution, layers)
    }

    /// Normalizes pre-computed biome weight layers.
    ///
    /// # Panics
    ///
    /// Panics if a layer's resolution differs from `resolution`.
    pub fn from_layers(resolution: u32, mut layers: Vec<WeightMap>) -> Self {
        assert!(
            layers.iter().all(|l| l.resolution() == resolution),
            "splat layers must share one resolution"
        );

        let cells = (resolution as usize) * (resolution as usize);
        for i in 0..cells {
            let total: f64 = layers.iter().map(|l| l.weights()[i]).sum();
            for layer in &mut layers {
                let w = &mut layer.weights_mut()[i];
                *w = if total > 0.0 { *w / total } else { 0.0 };
            }
        }

        Self { resolution, layers }
    }

    /// Edge length in cells.
    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    /// Number of layers (one per biome).
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// The layer for biome `index`.
    pub fn layer(&self, index: usize) -> Option<&WeightMap> {
        self.layers.get(index)
    }

    /// Every layer's weight at cell `(x, y)`.
    pub fn weights_at(&self, x: u32, y: u32) -> Vec<f64> {
        self.layers.iter().map(|l| l.get(x, y)).collect()
    }

    /// Index of the strongest biome at `(x, y)`, or `None` if no biome applies.
    ///
    /// Ties resolve to the lowest index.
    pub fn dominant(&self, x: u32, y: u32) -> Option<(usize, f64)> {
        self.layers
            .iter()
            .enumerate()
            .map(|(i, l)| (i, l.get(x, y)))
            .filter(|&(_, w)| w > 0.0)
            .fold(None, |best, (i, w)| match best {
                Some((_, bw)) if bw >= w => best,
                _ => Some((i, w)),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layer(resolution: u32, values: &[f64]) -> WeightMap {
        let mut map = WeightMap::zeros(resolution);
        for (i, v) in values.iter().enumerate() {
            let i = i as u32;
            map.set(i % resolution, i / resolution, *v);
        }
        map
    }

    #[test]
    fn test_layers_sum_to_one() {
        let splat = SplatMap::from_layers(
            2,
            vec![layer(2, &[1.0, 0.5, 0.0, 0.2]), layer(2, &[1.0, 0.0, 0.0, 0.6])],
        );
        for y in 0..2 {
            for x in 0..2 {
                let sum: f64 = splat.weights_at(x, y).iter().sum();
                if (x, y) == (0, 1) {
                    assert_eq!(sum, 0.0, "unclaimed cell stays empty");
                } else {
                    assert!((sum - 1.0).abs() < 1e-12);
                }
            }
        }
        assert_eq!(splat.layer(0).unwrap().get(0, 0), 0.5);
        assert!((splat.layer(1).unwrap().get(1, 1) - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_dominant() {
        let splat = SplatMap::from_layers(
            2,
            vec![layer(2, &[0.2, 0.5, 0.0, 0.0]), layer(2, &[0.8, 0.5, 0.0, 0.3])],
        );
        assert_eq!(splat.dominant(0, 0).map(|(i, _)| i), Some(1));
        assert_eq!(splat.dominant(1, 0).map(|(i, _)| i), Some(0), "ties go to the first biome");
        assert_eq!(splat.dominant(0, 1), None);
        assert_eq!(splat.dominant(1, 1).map(|(i, _)| i), Some(1));
    }

    #[test]
    fn test_no_biomes() {
        let splat = SplatMap::from_biomes(&[], GridPosition::ZERO, 4, 1.0, 1.0);
        assert_eq!(splat.layer_count(), 0);
        assert_eq!(splat.dominant(0, 0), None);
    }
}
