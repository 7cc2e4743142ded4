//! # Chunk Host
//!
//! The seam between streaming and whatever owns transforms, GPU buffers and
//! collision shapes. The scheduler decides *what* happens to a chunk; the
//! host decides *how*.
//!
//! Handles of retired chunks go to a [`HandlePool`] so the next chunk can
//! reuse them instead of asking the host for a fresh one.

use strata_core::ChunkCoord;
use strata_meshing::MeshData;

/// Rendering / physics runtime that displays chunks.
pub trait ChunkHost {
    /// Per-chunk resource (scene node, buffer slot, ...).
    type Handle;

    /// Creates a fresh handle.
    fn acquire_chunk_handle(&mut self) -> Self::Handle;

    /// Uploads a chunk's mesh into a handle and places it at `coord`.
    fn apply_mesh(
        &mut self,
        handle: &mut Self::Handle,
        coord: ChunkCoord,
        mesh: &MeshData,
        enable_collision: bool,
    );

    /// Turns a chunk's collision shape on or off.
    fn set_collision(&mut self, handle: &mut Self::Handle, coord: ChunkCoord, enabled: bool);

    /// Hides a handle and frees its contents; the handle will be reused.
    fn release_chunk_handle(&mut self, handle: &mut Self::Handle);

    /// Destroys a handle for good.
    fn destroy_chunk_handle(&mut self, handle: Self::Handle);
}

/// Bounded free list of released handles.
///
/// # Thread Safety
///
/// This pool is NOT thread-safe. It lives on the scheduling thread.
#[derive(Debug)]
pub struct HandlePool<T> {
    /// Released handles, most recent last.
    free_list: Vec<T>,
    /// Maximum retained handles.
    capacity: usize,
}

impl<T> HandlePool<T> {
    /// Creates an empty pool that retains at most `capacity` handles.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            free_list: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Maximum retained handles.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Handles currently retained.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.free_list.len()
    }

    /// Returns true if no handle is retained.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.free_list.is_empty()
    }

    /// Returns true if another handle would be refused.
    #[inline]
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.free_list.len() >= self.capacity
    }

    /// Retains a handle, or gives it back if the pool is full.
    ///
    /// # Errors
    ///
    /// Returns the handle unchanged when the pool is at capacity.
    pub fn put(&mut self, handle: T) -> Result<(), T> {
        if self.is_full() {
            return Err(handle);
        }
        self.free_list.push(handle);
        Ok(())
    }

    /// Takes the most recently released handle.
    pub fn take(&mut self) -> Option<T> {
        self.free_list.pop()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_put_take() {
        let mut pool: HandlePool<u32> = HandlePool::new(2);
        assert!(pool.is_empty());

        assert_eq!(pool.put(1), Ok(()));
        assert_eq!(pool.put(2), Ok(()));
        assert!(pool.is_full());
        assert_eq!(pool.put(3), Err(3));

        assert_eq!(pool.take(), Some(2));
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.take(), Some(1));
        assert_eq!(pool.take(), None);
    }

    #[test]
    fn test_zero_capacity_pool_refuses_everything() {
        let mut pool: HandlePool<&str> = HandlePool::new(0);
        assert_eq!(pool.put("a"), Err("a"));
        assert_eq!(pool.capacity(), 0);
    }
}
