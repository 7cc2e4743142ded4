//! # Headless Run
//!
//! Streams a world for a fixed number of ticks with no renderer attached.
//! The [`CountingHost`] keeps tallies instead of GPU buffers.

use std::time::{Duration, Instant};

use strata_core::{ChunkCoord, ConfigResult, WorldConfig};
use strata_meshing::MeshData;
use strata_streaming::{ChunkHost, Observer, StreamingScheduler, StreamingStats, WorkerStats};

/// Host that counts what it is asked to do.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CountingHost {
    /// Handles created.
    pub acquired: u64,
    /// Meshes uploaded.
    pub applied: u64,
    /// Collision toggles.
    pub collision_changes: u64,
    /// Handles released into the pool.
    pub released: u64,
    /// Handles destroyed.
    pub destroyed: u64,
    /// Quads across every uploaded mesh.
    pub quads: u64,
    /// Vertices across every uploaded mesh.
    pub vertices: u64,
}

impl CountingHost {
    /// Handles alive right now.
    #[must_use]
    pub const fn live_handles(&self) -> u64 {
        self.acquired - self.destroyed
    }
}

impl ChunkHost for CountingHost {
    type Handle = u64;

    fn acquire_chunk_handle(&mut self) -> u64 {
        self.acquired += 1;
        self.acquired
    }

    fn apply_mesh(
        &mut self,
        _handle: &mut u64,
        _coord: ChunkCoord,
        mesh: &MeshData,
        _enable_collision: bool,
    ) {
        self.applied += 1;
        self.quads += mesh.quad_count() as u64;
        self.vertices += mesh.positions.len() as u64;
    }

    fn set_collision(&mut self, _handle: &mut u64, _coord: ChunkCoord, _enabled: bool) {
        self.collision_changes += 1;
    }

    fn release_chunk_handle(&mut self, _handle: &mut u64) {
        self.released += 1;
    }

    fn destroy_chunk_handle(&mut self, _handle: u64) {
        self.destroyed += 1;
    }
}

/// Headless run parameters.
#[derive(Clone, Debug)]
pub struct HeadlessOptions {
    /// Ticks to simulate.
    pub ticks: u64,
    /// Simulated frame time.
    pub tick_duration: Duration,
    /// Observer speed along +X in length units per second.
    pub speed: f64,
    /// Wait for the final position to settle before reporting.
    pub settle: Option<Duration>,
}

impl Default for HeadlessOptions {
    fn default() -> Self {
        Self {
            ticks: 600,
            tick_duration: Duration::from_secs_f64(1.0 / 60.0),
            speed: 4.0,
            settle: Some(Duration::from_secs(30)),
        }
    }
}

/// Outcome of a headless run.
#[derive(Clone, Debug)]
pub struct HeadlessSummary {
    /// Scheduler counters at the end of the run.
    pub stats: StreamingStats,
    /// Worker build timings.
    pub workers: WorkerStats,
    /// Host tallies.
    pub host: CountingHost,
    /// Final observer position.
    pub observer: Observer,
    /// Surface height under the spawn point.
    pub spawn_height: Option<i32>,
    /// Whether the final position settled in time.
    pub settled: bool,
    /// Wall-clock duration.
    pub elapsed: Duration,
}

/// Spawns an observer at the origin and walks it along +X.
///
/// # Errors
///
/// Returns the configuration's validation error, if any.
pub fn run(config: WorldConfig, options: &HeadlessOptions) -> ConfigResult<HeadlessSummary> {
    let start = Instant::now();
    let mut scheduler = StreamingScheduler::new(config, CountingHost::default())?;

    let mut observer = Observer::new(0.0, 0.0).facing(1.0, 0.0);
    let spawn_height = scheduler.prepare_spawn(observer);
    let step = options.speed * options.tick_duration.as_secs_f64();

    for _ in 0..options.ticks {
        scheduler.update(observer, options.tick_duration);
        observer = Observer::new(observer.x + step, observer.z).facing(1.0, 0.0);
    }

    let settled = match options.settle {
        Some(timeout) => {
            scheduler.scan(observer);
            scheduler.wait_idle(timeout)
        }
        None => false,
    };

    tracing::info!(
        "Headless run finished: {} ticks, {} chunks active",
        options.ticks,
        scheduler.active_count()
    );

    Ok(HeadlessSummary {
        stats: scheduler.stats(),
        workers: scheduler.worker_stats(),
        host: *scheduler.host(),
        observer,
        spawn_height,
        settled,
        elapsed: start.elapsed(),
    })
}
