//! Streaming counters.

use crate::clock::ScanStats;

/// Cumulative streaming statistics.
///
/// Counters only grow; `active`, `in_flight` and `pooled_handles` are
/// snapshots taken when the stats are read.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StreamingStats {
    /// Scans run.
    pub scans: u64,
    /// Builds handed to the pool.
    pub builds_dispatched: u64,
    /// Builds applied to the host.
    pub builds_applied: u64,
    /// Finished builds thrown away because the chunk was no longer needed.
    pub builds_discarded: u64,
    /// Builds served from chunk storage.
    pub chunks_loaded: u64,
    /// Builds that ran the generator.
    pub chunks_generated: u64,
    /// Chunks retired with their handle kept.
    pub chunks_pooled: u64,
    /// Chunks retired with their handle destroyed.
    pub chunks_evicted: u64,
    /// Fresh handles requested from the host.
    pub handles_acquired: u64,
    /// Pooled handles reused.
    pub handles_reused: u64,
    /// Collision flag changes sent to the host.
    pub collider_changes: u64,
    /// Chunks currently active.
    pub active: usize,
    /// Builds dispatched but not yet received.
    pub in_flight: usize,
    /// Handles currently pooled.
    pub pooled_handles: usize,
    /// Scan timing.
    pub scan: ScanStats,
}

impl StreamingStats {
    /// Builds that finished, applied or not.
    #[inline]
    #[must_use]
    pub const fn builds_completed(&self) -> u64 {
        self.chunks_loaded + self.chunks_generated
    }
}
