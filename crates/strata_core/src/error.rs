//! # Error Types
//!
//! Configuration errors are fatal at world start. Storage errors are
//! always recovered by regenerating the chunk; they exist so the cause
//! can be logged.

use thiserror::Error;

/// Errors raised while loading or validating a `WorldConfig`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A size field is below its minimum.
    #[error("{field} must be at least {min}, got {value}")]
    TooSmall {
        /// Field name.
        field: &'static str,
        /// Minimum accepted value.
        min: u64,
        /// Configured value.
        value: u64,
    },

    /// A length or duration field is not a positive finite number.
    #[error("{field} must be a positive finite number, got {value}")]
    NotPositive {
        /// Field name.
        field: &'static str,
        /// Configured value.
        value: f64,
    },

    /// Regions must tile chunks exactly.
    #[error("region size {region} blocks is not a multiple of chunk size {chunk}")]
    RegionNotChunkAligned {
        /// Region size in blocks.
        region: u32,
        /// Chunk size in blocks.
        chunk: u32,
    },

    /// A landmark could reach past the 3×3 region neighbourhood.
    #[error("landmark radius of {radius_blocks} blocks exceeds region size {region} blocks")]
    LandmarkTooLarge {
        /// Maximum landmark radius in blocks.
        radius_blocks: u64,
        /// Region size in blocks.
        region: u32,
    },

    /// Landmark parameters are inconsistent.
    #[error("invalid landmark settings: {0}")]
    InvalidLandmark(String),

    /// A biome row is unusable.
    #[error("invalid {biome} biome: {reason}")]
    InvalidBiome {
        /// Biome name.
        biome: &'static str,
        /// What is wrong.
        reason: String,
    },

    /// The TOML document did not parse.
    #[error("config parse error: {0}")]
    Parse(String),

    /// The config file could not be read.
    #[error("config io error: {0}")]
    Io(String),
}

/// Result alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while reading or writing persisted chunks.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Filesystem failure.
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),

    /// LZ4 payload did not decompress.
    #[error("decompression failed: {0}")]
    Decompress(String),

    /// Record shorter than its header.
    #[error("record truncated: {len} bytes is shorter than the header")]
    TruncatedHeader {
        /// Record length in bytes.
        len: usize,
    },

    /// Persisted chunk dimensions differ from the current configuration.
    #[error("dimension mismatch: expected {expected_width}x{expected_height}, found {found_width}x{found_height}")]
    DimensionMismatch {
        /// Configured chunk width.
        expected_width: u32,
        /// Configured chunk height.
        expected_height: u32,
        /// Persisted width.
        found_width: u32,
        /// Persisted height.
        found_height: u32,
    },

    /// Voxel payload length does not match the header.
    #[error("payload size mismatch: expected {expected} bytes, found {found}")]
    SizeMismatch {
        /// Expected byte count.
        expected: usize,
        /// Actual byte count.
        found: usize,
    },

    /// A voxel byte does not name a block type.
    #[error("unknown block byte {0}")]
    UnknownBlock(u8),
}

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
