//! Primitive noise sources built on the `noise` crate.

use glam::DVec3;
use noise::{Billow, Fbm, MultiFractal, NoiseFn, Perlin, RidgedMulti, Simplex};
use serde::{Deserialize, Serialize};

use crate::Generator;

/// The basis function and fractal flavour of a [`FractalNoise`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoiseKind {
    /// Fractal Brownian motion over Perlin noise.
    Perlin,
    /// Billowy (absolute-value) fBm over Perlin noise.
    Billow,
    /// Ridged multifractal over Perlin noise.
    Ridged,
    /// Fractal Brownian motion over simplex noise.
    Simplex,
}

/// Parameters shared by every fractal source.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FractalParams {
    /// Seed for the permutation tables.
    pub seed: u32,
    /// Frequency of the first octave.
    pub frequency: f64,
    /// Number of octaves to composite.
    pub octaves: usize,
    /// Frequency multiplier between successive octaves.
    pub lacunarity: f64,
    /// Amplitude multiplier between successive octaves.
    pub persistence: f64,
}

impl Default for FractalParams {
    fn default() -> Self {
        Self {
            seed: 0,
            frequency: 1.0,
            octaves: 6,
            lacunarity: 2.0,
            persistence: 0.5,
        }
    }
}

enum Source {
    Perlin(Fbm<Perlin>),
    Billow(Billow<Perlin>),
    Ridged(RidgedMulti<Perlin>),
    Simplex(Fbm<Simplex>),
}

/// A multi-octave noise field.
///
/// Output is roughly in `[-1, 1]`; the exact range depends on octave count and persistence.
pub struct FractalNoise {
    kind: NoiseKind,
    params: FractalParams,
    source: Source,
}

impl FractalNoise {
    /// Builds the noise source described by `kind` and `params`.
    pub fn new(kind: NoiseKind, params: &FractalParams) -> Self {
        let octaves = params.octaves.max(1);
        let source = match kind {
            NoiseKind::Perlin => Source::Perlin(
                Fbm::<Perlin>::new(params.seed)
                    .set_octaves(octaves)
                    .set_frequency(params.frequency)
                    .set_lacunarity(params.lacunarity)
                    .set_persistence(params.persistence),
            ),
            NoiseKind::Billow => Source::Billow(
                Billow::<Perlin>::new(params.seed)
                    .set_octaves(octaves)
                    .set_frequency(params.frequency)
                    .set_lacunarity(params.lacunarity)
                    .set_persistence(params.persistence),
            ),
            NoiseKind::Ridged => Source::Ridged(
                RidgedMulti::<Perlin>::new(params.seed)
                    .set_octaves(octaves)
                    .set_frequency(params.frequency)
                    .set_lacunarity(params.lacunarity)
                    .set_persistence(params.persistence),
            ),
            NoiseKind::Simplex => Source::Simplex(
                Fbm::<Simplex>::new(params.seed)
                    .set_octaves(octaves)
                    .set_frequency(params.frequency)
                    .set_lacunarity(params.lacunarity)
                    .set_persistence(params.persistence),
            ),
        };
        Self {
            kind,
            params: params.clone(),
            source,
        }
    }

    /// Which basis this source uses.
    pub fn kind(&self) -> NoiseKind {
        self.kind
    }

    /// The parameters this source was built with.
    pub fn params(&self) -> &FractalParams {
        &self.params
    }
}

impl Generator for FractalNoise {
    fn sample(&self, point: DVec3) -> f64 {
        let p = [point.x, point.y, point.z];
        match &self.source {
            Source::Perlin(n) => n.get(p),
            Source::Billow(n) => n.get(p),
            Source::Ridged(n) => n.get(p),
            Source::Simplex(n) => n.get(p),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KINDS: [NoiseKind; 4] = [
        NoiseKind::Perlin,
        NoiseKind::Billow,
        NoiseKind::Ridged,
        NoiseKind::Simplex,
    ];

    #[test]
    fn test_same_seed_same_value() {
        let params = FractalParams {
            seed: 42,
            ..Default::default()
        };
        for kind in KINDS {
            let a = FractalNoise::new(kind, &params);
            let b = FractalNoise::new(kind, &params);
            let p = DVec3::new(12.34, -5.6, 0.0);
            assert_eq!(a.sample(p), b.sample(p), "{kind:?} is not deterministic");
        }
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = FractalNoise::new(
            NoiseKind::Perlin,
            &FractalParams {
                seed: 1,
                ..Default::default()
            },
        );
        let b = FractalNoise::new(
            NoiseKind::Perlin,
            &FractalParams {
                seed: 999,
                ..Default::default()
            },
        );
        let differs = (0..32)
            .map(|i| DVec3::new(i as f64 * 0.37 + 0.1, i as f64 * 0.21 + 0.3, 0.0))
            .any(|p| (a.sample(p) - b.sample(p)).abs() > 1e-9);
        assert!(differs);
    }

    #[test]
    fn test_values_are_finite() {
        for kind in KINDS {
            let noise = FractalNoise::new(kind, &FractalParams::default());
            for i in 0..200 {
                let v = noise.sample_2d(i as f64 * 0.13, i as f64 * -0.07);
                assert!(v.is_finite(), "{kind:?} produced {v}");
            }
        }
    }

    #[test]
    fn test_zero_octaves_clamped() {
        let noise = FractalNoise::new(
            NoiseKind::Billow,
            &FractalParams {
                octaves: 0,
                ..Default::default()
            },
        );
        assert!(noise.sample_2d(0.3, 0.7).is_finite());
    }
}
