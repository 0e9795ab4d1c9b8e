//! Biome settings, sampler binding, and the weighting pipeline.

use serde::{Deserialize, Serialize};
use terra_noise::{GeneratorRef, GeneratorSampler, GridPosition};

use crate::{Constraint, MapValues, WeightMap};

/// The three inputs a biome can classify on, in their fixed channel order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Terrain height.
    Height = 0,
    /// Temperature field.
    Temperature = 1,
    /// Moisture field.
    Moisture = 2,
}

impl Channel {
    /// All channels, in storage order.
    pub const ALL: [Channel; 3] = [Channel::Height, Channel::Temperature, Channel::Moisture];

    /// Index of this channel within a `[f64; 3]` cell.
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Whether a channel participates in classification, and the range it must fall in.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BiomeChannel {
    /// Whether this channel is considered at all.
    pub enabled: bool,
    /// Lower bound of the normalized range.
    pub min: f64,
    /// Upper bound of the normalized range.
    pub max: f64,
}

impl BiomeChannel {
    /// An enabled channel restricted to `[min, max]`.
    pub fn enabled(min: f64, max: f64) -> Self {
        Self {
            enabled: true,
            min,
            max,
        }
    }

    /// The channel's range as a [`Constraint`].
    pub fn constraint(&self) -> Constraint {
        Constraint::new(self.min, self.max)
    }
}

impl Default for BiomeChannel {
    fn default() -> Self {
        Self {
            enabled: false,
            min: 0.0,
            max: 1.0,
        }
    }
}

/// User-authored description of a biome.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BiomeSettings {
    /// Human-readable biome name (e.g., "alpine_meadow").
    pub name: String,
    /// RGB color used in previews.
    pub color: [u8; 3],
    /// Width of the soft margin at each constraint edge, in normalized units.
    pub blend: f64,
    /// Height channel.
    pub height: BiomeChannel,
    /// Temperature channel.
    pub temperature: BiomeChannel,
    /// Moisture channel.
    pub moisture: BiomeChannel,
    /// Probability of vegetation spawning per cell at full weight, in `[0.0, 1.0]`.
    pub vegetation_density: f64,
    /// Tree/plant archetype scattered in this biome. `None` for barren biomes.
    pub tree_type: Option<String>,
}

impl BiomeSettings {
    /// Settings for a channel by kind.
    pub fn channel(&self, channel: Channel) -> &BiomeChannel {
        match channel {
            Channel::Height => &self.height,
            Channel::Temperature => &self.temperature,
            Channel::Moisture => &self.moisture,
        }
    }
}

impl Default for BiomeSettings {
    fn default() -> Self {
        Self {
            name: "biome".to_string(),
            color: [255, 255, 255],
            blend: 1.0,
            height: BiomeChannel::default(),
            temperature: BiomeChannel::default(),
            moisture: BiomeChannel::default(),
            vegetation_density: 0.0,
            tree_type: None,
        }
    }
}

/// The samplers for one sampling pass, derived fresh from the current generators.
///
/// A channel's sampler is present only when the channel is enabled and a generator is
/// connected; otherwise that channel reads 0 everywhere.
#[derive(Clone, Default)]
pub struct BiomeSamplers {
    /// Height sampler.
    pub height: Option<GeneratorSampler>,
    /// Temperature sampler.
    pub temperature: Option<GeneratorSampler>,
    /// Moisture sampler.
    pub moisture: Option<GeneratorSampler>,
}

impl BiomeSamplers {
    /// Binds the connected generators to the channels enabled in `settings`.
    pub fn bind(
        settings: &BiomeSettings,
        height: Option<GeneratorRef>,
        temperature: Option<GeneratorRef>,
        moisture: Option<GeneratorRef>,
    ) -> Self {
        let wrap = |channel: &BiomeChannel, generator: Option<GeneratorRef>| {
            generator
                .filter(|_| channel.enabled)
                .map(GeneratorSampler::new)
        };
        Self {
            height: wrap(&settings.height, height),
            temperature: wrap(&settings.temperature, temperature),
            moisture: wrap(&settings.moisture, moisture),
        }
    }

    /// Sampler for a channel by kind.
    pub fn get(&self, channel: Channel) -> Option<&GeneratorSampler> {
        match channel {
            Channel::Height => self.height.as_ref(),
            Channel::Temperature => self.temperature.as_ref(),
            Channel::Moisture => self.moisture.as_ref(),
        }
    }
}

/// A biome resolved against the current graph: settings plus bound samplers.
///
/// Immutable once built; rebuild it whenever the graph changes.
#[derive(Clone)]
pub struct Biome {
    settings: BiomeSettings,
    samplers: BiomeSamplers,
}

impl Biome {
    /// Pairs settings with the samplers bound for them.
    pub fn new(settings: BiomeSettings, samplers: BiomeSamplers) -> Self {
        Self { settings, samplers }
    }

    /// The authored settings.
    pub fn settings(&self) -> &BiomeSettings {
        &self.settings
    }

    /// The bound samplers.
    pub fn samplers(&self) -> &BiomeSamplers {
        &self.samplers
    }

    /// Biome name.
    pub fn name(&self) -> &str {
        &self.settings.name
    }

    /// Raw channel values at sample `(x, y)`. Unbound channels read 0.
    pub fn values_at(
        &self,
        x: u32,
        y: u32,
        position: GridPosition,
        resolution: u32,
        spread: f64,
        length: f64,
    ) -> [f64; 3] {
        let mut out = [0.0; 3];
        for channel in Channel::ALL {
            if let Some(sampler) = self.samplers.get(channel) {
                out[channel.index()] = sampler.value(x, y, position, resolution, spread, length);
            }
        }
        out
    }

    /// Samples every channel over a `resolution × resolution` tile.
    pub fn map_values(
        &self,
        position: GridPosition,
        resolution: u32,
        spread: f64,
        length: f64,
    ) -> MapValues {
        let mut values = MapValues::zeros(resolution);
        for y in 0..resolution {
            for x in 0..resolution {
                values.set(
                    x,
                    y,
                    self.values_at(x, y, position, resolution, spread, length),
                );
            }
        }
        values
    }

    /// Converts raw channel values into per-cell biome weights.
    ///
    /// Each value is normalized with the shared range `[min, max]`; every enabled channel
    /// whose normalized value fits its constraint contributes its soft weight, and the
    /// cell weight is the mean of the contributions (0 if none contribute). A degenerate
    /// range (`max <= min`, or non-finite bounds) yields an all-zero map.
    pub fn weighted_values(&self, values: &MapValues, min: f64, max: f64) -> WeightMap {
        let resolution = values.resolution();
        let mut map = WeightMap::zeros(resolution);

        let range = max - min;
        if !(range > 0.0) || !range.is_finite() {
            tracing::trace!(biome = %self.settings.name, min, max, "flat sample range");
            return map;
        }

        let constraints = Channel::ALL.map(|c| {
            let channel = self.settings.channel(c);
            channel.enabled.then(|| channel.constraint())
        });
        let blend = self.settings.blend;

        for (cell, weight) in values.cells().iter().zip(map.weights_mut()) {
            let mut total = 0.0;
            let mut count = 0u32;
            for (raw, constraint) in cell.iter().zip(&constraints) {
                let Some(constraint) = constraint else {
                    continue;
                };
                let normalized = (raw - min) / range;
                if constraint.fits(normalized) {
                    total += constraint.weight(normalized, blend);
                    count += 1;
                }
            }
            *weight = if count > 0 { total / count as f64 } else { 0.0 };
        }

        map
    }

    /// Samples a tile and weights it against the tile's own global range.
    pub fn weight_map(
        &self,
        position: GridPosition,
        resolution: u32,
        spread: f64,
        length: f64,
    ) -> WeightMap {
        let values = self.map_values(position, resolution, spread, length);
        let (min, max) = values.min_max();
        self.weighted_values(&values, min, max)
    }

    /// Weights for a `size × size` preview anchored at the grid origin.
    pub fn preview_weights(&self, size: u32) -> WeightMap {
        self.weight_map(GridPosition::ZERO, size, size as f64, 1.0)
    }
}
