//! # Biomes
//!
//! The closed biome set and its parameter table.
//!
//! Every per-biome decision (height multiplier, noise shape, smoothing,
//! surface block, landmark odds) is a row in [`BiomeTable`], resolved once
//! at world start. There is no per-biome dispatch anywhere else.

use serde::{Deserialize, Serialize};

use crate::block::BlockType;
use crate::error::{ConfigError, ConfigResult};

/// Biome types in the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Biome {
    /// Low rolling grassland.
    Plains = 0,
    /// Medium grassland.
    Forest = 1,
    /// Tall, rough terrain with snow-capped tops.
    Hills = 2,
    /// Sandy dunes.
    Desert = 3,
    /// Cold highlands.
    Snow = 4,
}

impl Biome {
    /// Every biome, in band order.
    pub const ALL: [Self; 5] = [
        Self::Plains,
        Self::Forest,
        Self::Hills,
        Self::Desert,
        Self::Snow,
    ];

    /// Human-readable name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Plains => "plains",
            Self::Forest => "forest",
            Self::Hills => "hills",
            Self::Desert => "desert",
            Self::Snow => "snow",
        }
    }
}

/// Which block replaces the topmost block (`h - 1`) of a column.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum TopBlockRule {
    /// Keep the default surface block (Grass).
    Surface,
    /// Always use this block.
    Fixed {
        /// Replacement block.
        block: BlockType,
    },
    /// Snow when the top block sits above `altitude` (length units),
    /// `below` otherwise.
    SnowAbove {
        /// Snow line in length units.
        altitude: f64,
        /// Block used under the snow line.
        below: BlockType,
    },
}

impl TopBlockRule {
    /// Resolves the top block for a column whose topmost solid block is at `top_y`.
    #[inline]
    #[must_use]
    pub fn resolve(self, top_y: i32, block_size: f64) -> BlockType {
        match self {
            Self::Surface => BlockType::Grass,
            Self::Fixed { block } => block,
            Self::SnowAbove { altitude, below } => {
                if f64::from(top_y) * block_size > altitude {
                    BlockType::Snow
                } else {
                    below
                }
            }
        }
    }
}

/// Parameters for one biome.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BiomeParams {
    /// Multiplier on the global max terrain height.
    pub height_multiplier: f64,
    /// fBm base scale in length units (larger = broader features).
    pub base_scale: f64,
    /// fBm octave count.
    pub octaves: u32,
    /// Frequency growth per octave.
    pub lacunarity: f64,
    /// Amplitude decay per octave.
    pub gain: f64,
    /// Domain-warp noise scale in length units.
    pub warp_scale: f64,
    /// Domain-warp displacement in length units.
    pub warp_strength: f64,
    /// Box-blur passes over the chunk height grid (0 disables smoothing).
    pub smoothing_iterations: u32,
    /// Blend factor toward the 3×3 neighbourhood average, in [0, 1].
    pub smoothing_factor: f64,
    /// Probability that a region of this biome hosts a landmark.
    pub landmark_probability: f64,
    /// Surface block override.
    pub top_block: TopBlockRule,
}

impl BiomeParams {
    /// Flat, heavily smoothed grassland.
    #[must_use]
    pub const fn plains() -> Self {
        Self {
            height_multiplier: 0.65,
            base_scale: 50.0,
            octaves: 5,
            lacunarity: 2.0,
            gain: 0.5,
            warp_scale: 120.0,
            warp_strength: 8.0,
            smoothing_iterations: 3,
            smoothing_factor: 0.6,
            landmark_probability: 0.12,
            top_block: TopBlockRule::Surface,
        }
    }

    /// Unsmoothed medium terrain.
    #[must_use]
    pub const fn forest() -> Self {
        Self {
            height_multiplier: 1.0,
            base_scale: 55.0,
            octaves: 5,
            lacunarity: 2.0,
            gain: 0.5,
            warp_scale: 130.0,
            warp_strength: 10.0,
            smoothing_iterations: 0,
            smoothing_factor: 0.0,
            landmark_probability: 0.09,
            top_block: TopBlockRule::Surface,
        }
    }

    /// Tall rough terrain, stone tops with snow above 16 length units.
    #[must_use]
    pub const fn hills() -> Self {
        Self {
            height_multiplier: 1.35,
            base_scale: 40.0,
            octaves: 6,
            lacunarity: 2.1,
            gain: 0.47,
            warp_scale: 90.0,
            warp_strength: 14.0,
            smoothing_iterations: 1,
            smoothing_factor: 0.4,
            landmark_probability: 0.06,
            top_block: TopBlockRule::SnowAbove {
                altitude: 16.0,
                below: BlockType::Stone,
            },
        }
    }

    /// Broad sandy dunes.
    #[must_use]
    pub const fn desert() -> Self {
        Self {
            height_multiplier: 0.8,
            base_scale: 65.0,
            octaves: 5,
            lacunarity: 2.0,
            gain: 0.55,
            warp_scale: 160.0,
            warp_strength: 10.0,
            smoothing_iterations: 2,
            smoothing_factor: 0.55,
            landmark_probability: 0.05,
            top_block: TopBlockRule::Fixed {
                block: BlockType::Sand,
            },
        }
    }

    /// Cold highlands, always snow-covered.
    #[must_use]
    pub const fn snow() -> Self {
        Self {
            height_multiplier: 1.3,
            base_scale: 45.0,
            octaves: 6,
            lacunarity: 2.05,
            gain: 0.48,
            warp_scale: 100.0,
            warp_strength: 12.0,
            smoothing_iterations: 0,
            smoothing_factor: 0.0,
            landmark_probability: 0.04,
            top_block: TopBlockRule::Fixed {
                block: BlockType::Snow,
            },
        }
    }

    /// Checks every field is usable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBiome`] naming the first bad field.
    pub fn validate(&self, biome: Biome) -> ConfigResult<()> {
        let invalid = |reason: &str| {
            Err(ConfigError::InvalidBiome {
                biome: biome.name(),
                reason: reason.to_string(),
            })
        };

        if !(self.height_multiplier.is_finite() && self.height_multiplier > 0.0) {
            return invalid("height_multiplier must be positive");
        }
        if !(self.base_scale.is_finite() && self.base_scale > 0.0) {
            return invalid("base_scale must be positive");
        }
        if self.octaves == 0 || self.octaves > 16 {
            return invalid("octaves must be in 1..=16");
        }
        if !(self.lacunarity.is_finite() && self.lacunarity > 0.0) {
            return invalid("lacunarity must be positive");
        }
        if !(self.gain.is_finite() && self.gain > 0.0) {
            return invalid("gain must be positive");
        }
        if !(self.warp_scale.is_finite() && self.warp_scale > 0.0) {
            return invalid("warp_scale must be positive");
        }
        if !(self.warp_strength.is_finite() && self.warp_strength >= 0.0) {
            return invalid("warp_strength must be non-negative");
        }
        if !(0.0..=1.0).contains(&self.smoothing_factor) {
            return invalid("smoothing_factor must be in [0, 1]");
        }
        if !(0.0..=1.0).contains(&self.landmark_probability) {
            return invalid("landmark_probability must be in [0, 1]");
        }
        if let TopBlockRule::Fixed { block } | TopBlockRule::SnowAbove { below: block, .. } =
            self.top_block
        {
            if block.is_air() {
                return invalid("top block override cannot be air");
            }
        }
        Ok(())
    }
}

/// One biome row as written in TOML. Missing fields come from the
/// biome's own preset.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(default)]
struct BiomeOverrides {
    height_multiplier: Option<f64>,
    base_scale: Option<f64>,
    octaves: Option<u32>,
    lacunarity: Option<f64>,
    gain: Option<f64>,
    warp_scale: Option<f64>,
    warp_strength: Option<f64>,
    smoothing_iterations: Option<u32>,
    smoothing_factor: Option<f64>,
    landmark_probability: Option<f64>,
    top_block: Option<TopBlockRule>,
}

impl BiomeOverrides {
    fn over(self, preset: BiomeParams) -> BiomeParams {
        BiomeParams {
            height_multiplier: self.height_multiplier.unwrap_or(preset.height_multiplier),
            base_scale: self.base_scale.unwrap_or(preset.base_scale),
            octaves: self.octaves.unwrap_or(preset.octaves),
            lacunarity: self.lacunarity.unwrap_or(preset.lacunarity),
            gain: self.gain.unwrap_or(preset.gain),
            warp_scale: self.warp_scale.unwrap_or(preset.warp_scale),
            warp_strength: self.warp_strength.unwrap_or(preset.warp_strength),
            smoothing_iterations: self
                .smoothing_iterations
                .unwrap_or(preset.smoothing_iterations),
            smoothing_factor: self.smoothing_factor.unwrap_or(preset.smoothing_factor),
            landmark_probability: self
                .landmark_probability
                .unwrap_or(preset.landmark_probability),
            top_block: self.top_block.unwrap_or(preset.top_block),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(default)]
struct BiomeTableOverrides {
    plains: BiomeOverrides,
    forest: BiomeOverrides,
    hills: BiomeOverrides,
    desert: BiomeOverrides,
    snow: BiomeOverrides,
}

impl From<BiomeTableOverrides> for BiomeTable {
    fn from(rows: BiomeTableOverrides) -> Self {
        Self {
            plains: rows.plains.over(BiomeParams::plains()),
            forest: rows.forest.over(BiomeParams::forest()),
            hills: rows.hills.over(BiomeParams::hills()),
            desert: rows.desert.over(BiomeParams::desert()),
            snow: rows.snow.over(BiomeParams::snow()),
        }
    }
}

/// Lookup table `Biome -> BiomeParams`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "BiomeTableOverrides")]
pub struct BiomeTable {
    /// Plains parameters.
    pub plains: BiomeParams,
    /// Forest parameters.
    pub forest: BiomeParams,
    /// Hills parameters.
    pub hills: BiomeParams,
    /// Desert parameters.
    pub desert: BiomeParams,
    /// Snow parameters.
    pub snow: BiomeParams,
}

impl Default for BiomeTable {
    fn default() -> Self {
        Self {
            plains: BiomeParams::plains(),
            forest: BiomeParams::forest(),
            hills: BiomeParams::hills(),
            desert: BiomeParams::desert(),
            snow: BiomeParams::snow(),
        }
    }
}

impl BiomeTable {
    /// Returns the parameters for a biome.
    #[inline]
    #[must_use]
    pub const fn get(&self, biome: Biome) -> &BiomeParams {
        match biome {
            Biome::Plains => &self.plains,
            Biome::Forest => &self.forest,
            Biome::Hills => &self.hills,
            Biome::Desert => &self.desert,
            Biome::Snow => &self.snow,
        }
    }

    /// Validates every row.
    ///
    /// # Errors
    ///
    /// Returns the first row's validation error.
    pub fn validate(&self) -> ConfigResult<()> {
        for biome in Biome::ALL {
            self.get(biome).validate(biome)?;
        }
        Ok(())
    }
}
