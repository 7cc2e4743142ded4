//! # Scan Clock
//!
//! Fixed-interval timer for the streaming scan, driven by frame deltas.
//!
//! The first `should_scan` always fires. A long frame never queues up a
//! burst of scans: at most one interval of debt is carried over.

use std::time::{Duration, Instant};

/// Scan timing statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Minimum scan duration observed.
    pub min_scan_us: u64,
    /// Maximum scan duration observed.
    pub max_scan_us: u64,
    /// Average scan duration (rolling).
    pub avg_scan_us: u64,
    /// Total scans measured.
    pub total_scans: u64,
}

/// Fixed-interval scan controller.
#[derive(Debug)]
pub struct ScanClock {
    /// Target scan interval.
    interval: Duration,
    /// Accumulated time since the last scan.
    accumulator: Duration,
    /// Whether the first scan has happened.
    started: bool,
    /// Duration statistics.
    stats: ScanStats,
}

impl ScanClock {
    /// Creates a clock firing every `interval`.
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self {
            interval,
            accumulator: Duration::ZERO,
            started: false,
            stats: ScanStats {
                min_scan_us: u64::MAX,
                max_scan_us: 0,
                avg_scan_us: 0,
                total_scans: 0,
            },
        }
    }

    /// Adds frame time.
    pub fn advance(&mut self, elapsed: Duration) {
        self.accumulator = self.accumulator.saturating_add(elapsed);
    }

    /// Returns true if a scan is due.
    #[must_use]
    pub fn should_scan(&self) -> bool {
        !self.started || self.accumulator >= self.interval
    }

    /// Marks the start of a scan.
    ///
    /// Returns the scan start time for duration measurement.
    #[must_use]
    pub fn begin_scan(&mut self) -> Instant {
        if self.started {
            self.accumulator = self.accumulator.saturating_sub(self.interval).min(self.interval);
        } else {
            self.started = true;
            self.accumulator = Duration::ZERO;
        }
        Instant::now()
    }

    /// Marks the end of a scan.
    pub fn end_scan(&mut self, start: Instant) {
        let duration_us = start.elapsed().as_micros() as u64;

        self.stats.total_scans += 1;
        self.stats.min_scan_us = self.stats.min_scan_us.min(duration_us);
        self.stats.max_scan_us = self.stats.max_scan_us.max(duration_us);
        self.stats.avg_scan_us = if self.stats.total_scans == 1 {
            duration_us
        } else {
            (self.stats.avg_scan_us * 15 + duration_us) / 16
        };
    }

    /// Returns true once the first scan has begun.
    #[must_use]
    pub const fn started(&self) -> bool {
        self.started
    }

    /// Returns scan statistics.
    #[must_use]
    pub const fn stats(&self) -> &ScanStats {
        &self.stats
    }
}
