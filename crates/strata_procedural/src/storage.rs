//! # Chunk Storage
//!
//! Optional on-disk cache of generated voxel buffers.
//!
//! ## Record Format
//!
//! One file per chunk, `c_{x}_{z}.vxb`:
//!
//! ```text
//! u32 LE   width  (chunk size)
//! u32 LE   height (chunk height)
//! [u8]     width * width * height block bytes
//! ```
//!
//! With compression on, the whole record is LZ4 block-compressed with the
//! uncompressed size prepended. Writes land in a `.tmp` sibling first and
//! are renamed into place, so a crash never leaves a half-written record.
//!
//! Every load failure is reported as a [`StorageError`]; callers regenerate.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use lz4_flex::{compress_prepend_size, decompress_size_prepended};
use strata_core::{ChunkCoord, StorageError, StorageResult, VoxelBuffer, WorldConfig};

/// Header length in bytes.
const HEADER_LEN: usize = 8;

/// Directory of persisted chunk records.
#[derive(Clone, Debug)]
pub struct ChunkStorage {
    directory: PathBuf,
    compress: bool,
    chunk_size: u32,
    chunk_height: u32,
}

impl ChunkStorage {
    /// Opens (creating if needed) the configured chunk directory.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if the directory cannot be created.
    pub fn open(config: &WorldConfig) -> StorageResult<Self> {
        let directory = config.persistence.directory.clone();
        fs::create_dir_all(&directory)?;
        tracing::info!("Chunk storage at {}", directory.display());

        Ok(Self {
            directory,
            compress: config.persistence.compress,
            chunk_size: config.chunk_size,
            chunk_height: config.chunk_height,
        })
    }

    /// Storage directory.
    #[inline]
    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Path of a chunk's record.
    #[must_use]
    pub fn path_for(&self, coord: ChunkCoord) -> PathBuf {
        self.directory.join(format!("c_{}_{}.vxb", coord.x, coord.z))
    }

    /// Loads a chunk, or `Ok(None)` if it was never saved.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] for unreadable, corrupt or
    /// dimension-mismatched records.
    pub fn load(&self, coord: ChunkCoord) -> StorageResult<Option<VoxelBuffer>> {
        let bytes = match fs::read(self.path_for(coord)) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let record = if self.compress {
            decompress_size_prepended(&bytes).map_err(|e| StorageError::Decompress(e.to_string()))?
        } else {
            bytes
        };

        self.decode(&record).map(Some)
    }

    /// Saves a chunk, replacing any previous record.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if the temp file cannot be written or
    /// renamed.
    pub fn save(&self, coord: ChunkCoord, voxels: &VoxelBuffer) -> StorageResult<()> {
        let record = self.encode(voxels);
        let payload = if self.compress {
            compress_prepend_size(&record)
        } else {
            record
        };

        let path = self.path_for(coord);
        let tmp_path = path.with_extension("vxb.tmp");
        fs::write(&tmp_path, payload)?;
        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    /// Deletes a chunk's record if present.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] for failures other than a missing file.
    pub fn remove(&self, coord: ChunkCoord) -> StorageResult<()> {
        match fs::remove_file(self.path_for(coord)) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }

    fn encode(&self, voxels: &VoxelBuffer) -> Vec<u8> {
        let body = voxels.as_bytes();
        let mut record = Vec::with_capacity(HEADER_LEN + body.len());
        record.extend_from_slice(&(voxels.size() as u32).to_le_bytes());
        record.extend_from_slice(&(voxels.height() as u32).to_le_bytes());
        record.extend_from_slice(body);
        record
    }

    fn decode(&self, record: &[u8]) -> StorageResult<VoxelBuffer> {
        if record.len() < HEADER_LEN {
            return Err(StorageError::TruncatedHeader { len: record.len() });
        }

        let (header, body) = record.split_at(HEADER_LEN);
        let width = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
        let height = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);

        if width != self.chunk_size || height != self.chunk_height {
            return Err(StorageError::DimensionMismatch {
                expected_width: self.chunk_size,
                expected_height: self.chunk_height,
                found_width: width,
                found_height: height,
            });
        }

        VoxelBuffer::from_bytes(width as usize, height as usize, body)
    }
}
