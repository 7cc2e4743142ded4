//! Per-coordinate chunk lifecycle.
//!
//! ```text
//! NotNeeded -> Scheduled -> Building -> Ready -> Active -> Pooled | Evicted
//! ```
//!
//! `Scheduled` chunks that drop out of the needed set go straight back to
//! `NotNeeded`. `Building` and `Ready` chunks that drop out finish and are
//! discarded when drained.

/// Lifecycle state of one chunk coordinate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ChunkState {
    /// Not tracked.
    #[default]
    NotNeeded,
    /// Needed and queued, not dispatched yet.
    Scheduled,
    /// Dispatched to a builder.
    Building,
    /// Built, waiting for an apply slot.
    Ready,
    /// Mesh applied to a host handle.
    Active,
    /// Left the needed set; handle kept for reuse.
    Pooled,
    /// Left the needed set; handle destroyed.
    Evicted,
}

impl ChunkState {
    /// Returns true while a build for the coordinate is outstanding.
    #[inline]
    #[must_use]
    pub const fn is_in_flight(self) -> bool {
        matches!(self, Self::Building | Self::Ready)
    }

    /// Returns true if the coordinate may be queued for a build.
    #[inline]
    #[must_use]
    pub const fn is_schedulable(self) -> bool {
        matches!(
            self,
            Self::NotNeeded | Self::Scheduled | Self::Pooled | Self::Evicted
        )
    }

    /// Returns true once the chunk has been retired from the world.
    #[inline]
    #[must_use]
    pub const fn is_retired(self) -> bool {
        matches!(self, Self::Pooled | Self::Evicted)
    }
}
