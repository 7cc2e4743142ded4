//! # World Configuration
//!
//! One immutable value per world instance. Loaded from TOML (every field
//! optional, defaults below), validated once, then shared as
//! `Arc<WorldConfig>` by the generator, mesher and scheduler.
//!
//! ```toml
//! seed = 42
//! chunk_size = 16
//! chunk_height = 100
//! view_distance = 6
//!
//! [persistence]
//! enabled = true
//! directory = "world/chunks"
//!
//! [biomes.plains]
//! smoothing_iterations = 4
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::biome::BiomeTable;
use crate::error::{ConfigError, ConfigResult};

/// Which mesher turns voxel buffers into geometry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MesherKind {
    /// Merged maximal rectangles.
    #[default]
    Greedy,
    /// One quad per exposed face (debug reference).
    Naive,
}

/// On-disk chunk cache settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistenceConfig {
    /// Load/save chunks at all.
    pub enabled: bool,
    /// Directory holding `c_{x}_{z}.vxb` records.
    pub directory: PathBuf,
    /// LZ4-compress records.
    pub compress: bool,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            directory: PathBuf::from("chunks"),
            compress: true,
        }
    }
}

/// Immutable per-world configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// World seed.
    pub seed: u64,
    /// Chunk width and depth in blocks.
    pub chunk_size: u32,
    /// Chunk height in blocks.
    pub chunk_height: u32,
    /// Edge length of one block in length units.
    pub block_size: f64,
    /// Needed-set radius around the observer, in chunks.
    pub view_distance: u32,
    /// Extra radius added on the first scan only.
    pub preload_margin: u32,
    /// Builds dispatched per scan.
    pub max_builds_per_tick: u32,
    /// Ready meshes applied per scheduler pass.
    pub max_applies_per_tick: u32,
    /// Chebyshev radius (chunks) within which collision is enabled.
    pub collider_distance: u32,
    /// Seconds between scans.
    pub scan_interval_secs: f64,
    /// Global terrain height ceiling in length units.
    pub terrain_max_height: f64,
    /// Region edge in blocks.
    pub region_size_blocks: u32,
    /// Width of the landmark ramp, inward from its outer radius, in length units.
    pub landmark_border_width: f64,
    /// Smallest landmark radius in chunks.
    pub landmark_min_radius_chunks: u32,
    /// Largest landmark radius in chunks.
    pub landmark_max_radius_chunks: u32,
    /// Build worker threads; 0 builds inline on the scheduling thread.
    pub worker_threads: usize,
    /// Released chunk handles kept for reuse before evicting.
    pub max_pooled_handles: usize,
    /// Mesher selection.
    pub mesher: MesherKind,
    /// Chunk persistence.
    pub persistence: PersistenceConfig,
    /// Per-biome parameters.
    pub biomes: BiomeTable,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: 12_345,
            chunk_size: 16,
            chunk_height: 128,
            block_size: 1.0 / 11.0,
            view_distance: 8,
            preload_margin: 2,
            max_builds_per_tick: 4,
            max_applies_per_tick: 4,
            collider_distance: 2,
            scan_interval_secs: 0.15,
            terrain_max_height: 18.0,
            region_size_blocks: 64,
            landmark_border_width: 1.5,
            landmark_min_radius_chunks: 2,
            landmark_max_radius_chunks: 4,
            worker_threads: 2,
            max_pooled_handles: 64,
            mesher: MesherKind::Greedy,
            persistence: PersistenceConfig::default(),
            biomes: BiomeTable::default(),
        }
    }
}

impl WorldConfig {
    /// Smallest accepted chunk width.
    pub const MIN_CHUNK_SIZE: u32 = 8;
    /// Smallest accepted chunk height.
    pub const MIN_CHUNK_HEIGHT: u32 = 16;

    /// Small deterministic world: seed 42, 16×100 chunks, view distance 1,
    /// no preload, inline builds.
    #[must_use]
    pub fn test() -> Self {
        Self {
            seed: 42,
            chunk_size: 16,
            chunk_height: 100,
            view_distance: 1,
            preload_margin: 0,
            collider_distance: 1,
            worker_threads: 0,
            max_pooled_handles: 4,
            ..Self::default()
        }
    }

    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML and any
    /// validation error for out-of-range values.
    pub fn from_toml_str(source: &str) -> ConfigResult<Self> {
        let config: Self =
            toml::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise
    /// as [`WorldConfig::from_toml_str`].
    pub fn from_toml_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&source)
    }

    /// Serializes to TOML.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if serialization fails.
    pub fn to_toml_string(&self) -> ConfigResult<String> {
        toml::to_string(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Checks every field. Call once at world start.
    ///
    /// # Errors
    ///
    /// Returns a descriptive [`ConfigError`] for the first bad field.
    pub fn validate(&self) -> ConfigResult<()> {
        at_least("chunk_size", self.chunk_size, Self::MIN_CHUNK_SIZE)?;
        at_least("chunk_height", self.chunk_height, Self::MIN_CHUNK_HEIGHT)?;
        at_least("max_builds_per_tick", self.max_builds_per_tick, 1)?;
        at_least("max_applies_per_tick", self.max_applies_per_tick, 1)?;
        at_least("region_size_blocks", self.region_size_blocks, self.chunk_size)?;

        positive("block_size", self.block_size)?;
        positive("terrain_max_height", self.terrain_max_height)?;
        positive("scan_interval_secs", self.scan_interval_secs)?;
        positive("landmark_border_width", self.landmark_border_width)?;

        if self.region_size_blocks % self.chunk_size != 0 {
            return Err(ConfigError::RegionNotChunkAligned {
                region: self.region_size_blocks,
                chunk: self.chunk_size,
            });
        }

        at_least(
            "landmark_min_radius_chunks",
            self.landmark_min_radius_chunks,
            1,
        )?;
        if self.landmark_min_radius_chunks > self.landmark_max_radius_chunks {
            return Err(ConfigError::InvalidLandmark(format!(
                "min radius {} exceeds max radius {}",
                self.landmark_min_radius_chunks, self.landmark_max_radius_chunks
            )));
        }
        let radius_blocks =
            u64::from(self.landmark_max_radius_chunks) * u64::from(self.chunk_size);
        if radius_blocks > u64::from(self.region_size_blocks) {
            return Err(ConfigError::LandmarkTooLarge {
                radius_blocks,
                region: self.region_size_blocks,
            });
        }
        let min_radius_length = f64::from(self.landmark_min_radius_chunks)
            * f64::from(self.chunk_size)
            * self.block_size;
        if self.landmark_border_width > min_radius_length {
            return Err(ConfigError::InvalidLandmark(format!(
                "border width {} exceeds smallest radius {min_radius_length}",
                self.landmark_border_width
            )));
        }

        self.biomes.validate()
    }

    /// Global terrain ceiling converted to blocks, clamped to `[1, chunk_height]`.
    #[must_use]
    pub fn terrain_max_height_blocks(&self) -> i32 {
        let blocks = (self.terrain_max_height / self.block_size).round();
        blocks.clamp(1.0, f64::from(self.chunk_height)) as i32
    }

    /// Chunk edge length in length units.
    #[inline]
    #[must_use]
    pub fn chunk_world_size(&self) -> f64 {
        f64::from(self.chunk_size) * self.block_size
    }

    /// Upper bound on builds queued or running at once.
    #[inline]
    #[must_use]
    pub fn max_in_flight_builds(&self) -> usize {
        self.max_builds_per_tick as usize * 3
    }

    /// Scan interval as a `Duration`.
    #[must_use]
    pub fn scan_interval(&self) -> Duration {
        Duration::from_secs_f64(self.scan_interval_secs)
    }
}

fn at_least(field: &'static str, value: u32, min: u32) -> ConfigResult<()> {
    if value < min {
        return Err(ConfigError::TooSmall {
            field,
            min: u64::from(min),
            value: u64::from(value),
        });
    }
    Ok(())
}

fn positive(field: &'static str, value: f64) -> ConfigResult<()> {
    if !(value.is_finite() && value > 0.0) {
        return Err(ConfigError::NotPositive { field, value });
    }
    Ok(())
}
