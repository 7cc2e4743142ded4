//! # Streaming Scheduler
//!
//! Keeps the chunks around an observer built, applied and retired.
//!
//! ## Scan
//!
//! Runs on the scan clock, not every frame:
//!
//! 1. Needed set: Chebyshev square of `view_distance` around the observer's
//!    chunk (`+ preload_margin` on the first scan only)
//! 2. Retire Active chunks outside it: pooled while the handle pool has
//!    room, evicted after that
//! 3. Re-evaluate collision for Active chunks
//! 4. Queue every needed chunk that is not built or building, by
//!    [`PriorityKey`]
//! 5. Dispatch up to `max_builds_per_tick`, never exceeding
//!    `3 × max_builds_per_tick` in flight
//!
//! ## Drain
//!
//! Runs every `update`: receive finished builds, discard the ones no longer
//! needed, apply at most `max_applies_per_tick` in arrival order.
//!
//! All maps are ordered, so host calls happen in the same order every run.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};

use strata_core::{Biome, BlockType, ChunkCoord, ConfigResult, VoxelBuffer, WorldConfig};
use strata_procedural::{Landmark, LandmarkRegistry, RegionIndex};

use crate::builder::{BuildJob, BuildOutput, BuildPool, BuildSource, WorkerStats};
use crate::clock::ScanClock;
use crate::host::{ChunkHost, HandlePool};
use crate::priority::{build_queue, BuildQueue, Observer, PriorityKey};
use crate::state::ChunkState;
use crate::stats::StreamingStats;

/// Longest single wait on the ready channel inside `wait_idle`.
const IDLE_POLL: Duration = Duration::from_millis(10);

/// Longest wait for an in-flight spawn chunk before building it inline.
const SPAWN_WAIT: Duration = Duration::from_secs(30);

/// A chunk currently shown by the host.
#[derive(Debug)]
struct ActiveChunk<T> {
    handle: T,
    voxels: Arc<VoxelBuffer>,
    collision: bool,
}

/// Chunk lifecycle scheduler.
///
/// # Example
///
/// ```rust,ignore
/// let mut scheduler = StreamingScheduler::new(WorldConfig::default(), host)?;
///
/// // Every frame
/// scheduler.update(Observer::new(x, z).facing(fx, fz), frame_time);
/// ```
pub struct StreamingScheduler<H: ChunkHost> {
    /// Immutable world configuration.
    config: Arc<WorldConfig>,
    /// Rendering / physics collaborator.
    host: H,
    /// Biome and landmark-site lookup.
    regions: Arc<RegionIndex>,
    /// Materialized landmarks.
    landmarks: Arc<LandmarkRegistry>,
    /// Workers and channels.
    pool: BuildPool,
    /// Scan timer.
    clock: ScanClock,
    /// Released host handles.
    handles: HandlePool<H::Handle>,
    /// Tracked coordinates; absent means `NotNeeded`.
    states: BTreeMap<ChunkCoord, ChunkState>,
    /// Chunks applied to the host.
    active: BTreeMap<ChunkCoord, ActiveChunk<H::Handle>>,
    /// Needed set from the last scan.
    needed: BTreeSet<ChunkCoord>,
    /// Received builds waiting for an apply slot.
    ready: VecDeque<BuildOutput>,
    /// Coordinates retired by the last scan.
    retired: Vec<ChunkCoord>,
    /// Last observer seen.
    observer: Observer,
    /// Observer's chunk at the last scan.
    center: ChunkCoord,
    /// Builds dispatched and not yet received.
    in_flight: usize,
    /// Counters.
    stats: StreamingStats,
}

impl<H: ChunkHost> StreamingScheduler<H> {
    /// Validates the configuration and starts the build pool.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`](strata_core::ConfigError) found by
    /// [`WorldConfig::validate`].
    pub fn new(config: WorldConfig, host: H) -> ConfigResult<Self> {
        config.validate()?;
        let config = Arc::new(config);

        let regions = Arc::new(RegionIndex::new(&config));
        let landmarks = Arc::new(LandmarkRegistry::new(Arc::clone(&regions), &config));
        let pool = BuildPool::new(&config);

        tracing::info!(
            "Streaming scheduler started: seed {}, view distance {}, {} build workers",
            config.seed,
            config.view_distance,
            pool.worker_count()
        );

        Ok(Self {
            clock: ScanClock::new(config.scan_interval()),
            handles: HandlePool::new(config.max_pooled_handles),
            config,
            host,
            regions,
            landmarks,
            pool,
            states: BTreeMap::new(),
            active: BTreeMap::new(),
            needed: BTreeSet::new(),
            ready: VecDeque::new(),
            retired: Vec::new(),
            observer: Observer::new(0.0, 0.0),
            center: ChunkCoord::new(0, 0),
            in_flight: 0,
            stats: StreamingStats::default(),
        })
    }

    // ------------------------------------------------------------------
    // Driving
    // ------------------------------------------------------------------

    /// Per-frame entry point: advances the scan clock, scans when due, then
    /// drains ready builds.
    pub fn update(&mut self, observer: Observer, elapsed: Duration) {
        self.observer = observer;
        self.clock.advance(elapsed);
        if self.clock.should_scan() {
            self.scan(observer);
        }
        self.drain_ready();
    }

    /// Runs one scan immediately.
    pub fn scan(&mut self, observer: Observer) {
        let start = self.clock.begin_scan();
        let first = self.stats.scans == 0;

        self.observer = observer;
        self.center = observer.chunk(self.config.chunk_size, self.config.block_size);

        self.forget_retired();

        let radius = if first {
            self.config.view_distance + self.config.preload_margin
        } else {
            self.config.view_distance
        };
        self.needed = square(self.center, radius).collect();

        self.retire_unneeded();
        self.update_colliders();

        // Queued last scan, not needed any more
        let needed = &self.needed;
        self.states
            .retain(|coord, state| *state != ChunkState::Scheduled || needed.contains(coord));

        let candidates: Vec<ChunkCoord> = self
            .needed
            .iter()
            .copied()
            .filter(|&coord| self.state_of(coord).is_schedulable())
            .collect();
        let mut queue = build_queue(candidates, self.center, observer.forward());
        for Reverse(key) in &queue {
            self.states.insert(key.coord, ChunkState::Scheduled);
        }
        let queued = queue.len();

        let dispatched = self.dispatch(&mut queue);

        self.stats.scans += 1;
        self.clock.end_scan(start);

        tracing::debug!(
            "Scan {} at chunk ({}, {}): {} needed, {} active, {} queued, {} dispatched, {} in flight",
            self.stats.scans,
            self.center.x,
            self.center.z,
            self.needed.len(),
            self.active.len(),
            queued,
            dispatched,
            self.in_flight
        );
    }

    /// Receives finished builds and applies up to `max_applies_per_tick`.
    ///
    /// Returns the number of chunks applied.
    pub fn drain_ready(&mut self) -> usize {
        while let Some(output) = self.pool.try_recv() {
            self.receive(output);
        }

        let budget = self.config.max_applies_per_tick as usize;
        let mut applied = 0;
        while applied < budget {
            let Some(output) = self.ready.pop_front() else {
                break;
            };
            if self.needed.contains(&output.coord) && self.state_of(output.coord) == ChunkState::Ready {
                self.apply(output);
                applied += 1;
            } else {
                self.discard(output.coord);
            }
        }
        applied
    }

    /// Scans and drains for the last observer until every needed chunk is
    /// Active and nothing is in flight, or `timeout` passes.
    ///
    /// Returns true if the world settled in time.
    pub fn wait_idle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        if self.stats.scans == 0 {
            self.scan(self.observer);
        }

        loop {
            self.drain_ready();
            if self.is_settled() {
                return true;
            }

            let now = Instant::now();
            if now >= deadline {
                tracing::warn!(
                    "Streaming did not settle: {} of {} needed chunks active, {} in flight",
                    self.needed.iter().filter(|c| self.active.contains_key(*c)).count(),
                    self.needed.len(),
                    self.in_flight
                );
                return false;
            }

            if !self.ready.is_empty() {
                continue;
            }

            let has_scheduled = self.states.values().any(|&s| s == ChunkState::Scheduled);
            if has_scheduled && self.in_flight < self.config.max_in_flight_builds() {
                self.scan(self.observer);
            } else if self.in_flight > 0 {
                if let Some(output) = self.pool.recv_timeout((deadline - now).min(IDLE_POLL)) {
                    self.receive(output);
                }
            } else {
                self.scan(self.observer);
            }
        }
    }

    /// Builds and applies the observer's own chunk right away.
    ///
    /// A build already queued or running for that chunk is waited for and
    /// applied instead of starting a second one.
    ///
    /// Returns the surface height (blocks) under the observer, for placing
    /// a spawning entity on the ground.
    pub fn prepare_spawn(&mut self, observer: Observer) -> Option<i32> {
        self.observer = observer;
        let coord = observer.chunk(self.config.chunk_size, self.config.block_size);

        let state = self.state_of(coord);
        if state != ChunkState::Active {
            self.center = coord;
            let pending = match state {
                ChunkState::Ready => self.take_ready(coord),
                ChunkState::Building => self.await_build(coord),
                _ => None,
            };
            let output = match pending {
                Some(output) => output,
                None => {
                    let job = self.job_for(coord);
                    let output = self.pool.build_now(&job);
                    self.count_source(output.source);
                    self.stats.builds_dispatched += 1;
                    output
                }
            };
            self.apply(output);
            tracing::info!("Spawn chunk ({}, {}) ready", coord.x, coord.z);
        }

        self.surface_height_at(observer.x, observer.z)
    }

    /// Returns true if every chunk within Chebyshev `radius` of `center` is Active.
    #[must_use]
    pub fn is_area_ready(&self, center: ChunkCoord, radius: u32) -> bool {
        square(center, radius).all(|coord| self.active.contains_key(&coord))
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Block at a world position (length units); Air outside Active chunks.
    #[must_use]
    pub fn block_at(&self, position: [f64; 3]) -> BlockType {
        let block_size = self.config.block_size;
        let chunk_size = self.config.chunk_size;
        let bx = (position[0] / block_size).floor() as i32;
        let by = (position[1] / block_size).floor() as i64;
        let bz = (position[2] / block_size).floor() as i32;

        let coord = ChunkCoord::from_block_pos(bx, bz, chunk_size);
        self.active.get(&coord).map_or(BlockType::Air, |chunk| {
            chunk.voxels.get_signed(
                i64::from(bx - coord.world_x(chunk_size)),
                by,
                i64::from(bz - coord.world_z(chunk_size)),
            )
        })
    }

    /// Biome of a chunk.
    #[must_use]
    pub fn biome_at(&self, coord: ChunkCoord) -> Biome {
        self.regions.biome_of_chunk(coord)
    }

    /// Landmark whose footprint contains a world position (length units).
    #[must_use]
    pub fn landmark_at(&self, world_x: f64, world_z: f64) -> Option<Landmark> {
        let block_size = self.config.block_size;
        self.landmarks.landmark_at(
            (world_x / block_size).floor() as i32,
            (world_z / block_size).floor() as i32,
        )
    }

    /// Number of solid blocks in the column under a world position, if its
    /// chunk is Active.
    #[must_use]
    pub fn surface_height_at(&self, world_x: f64, world_z: f64) -> Option<i32> {
        let block_size = self.config.block_size;
        let chunk_size = self.config.chunk_size;
        let bx = (world_x / block_size).floor() as i32;
        let bz = (world_z / block_size).floor() as i32;

        let coord = ChunkCoord::from_block_pos(bx, bz, chunk_size);
        let chunk = self.active.get(&coord)?;
        let lx = (bx - coord.world_x(chunk_size)) as usize;
        let lz = (bz - coord.world_z(chunk_size)) as usize;
        chunk.voxels.top_solid(lx, lz).map(|y| y as i32 + 1)
    }

    /// Lifecycle state of a coordinate.
    #[must_use]
    pub fn state_of(&self, coord: ChunkCoord) -> ChunkState {
        self.states.get(&coord).copied().unwrap_or_default()
    }

    /// Number of Active chunks.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Active coordinates in order.
    pub fn active_coords(&self) -> impl Iterator<Item = ChunkCoord> + '_ {
        self.active.keys().copied()
    }

    /// Voxels of an Active chunk.
    #[must_use]
    pub fn voxels(&self, coord: ChunkCoord) -> Option<&Arc<VoxelBuffer>> {
        self.active.get(&coord).map(|chunk| &chunk.voxels)
    }

    /// Returns true if an Active chunk has collision enabled.
    #[must_use]
    pub fn has_collision(&self, coord: ChunkCoord) -> bool {
        self.active.get(&coord).is_some_and(|chunk| chunk.collision)
    }

    /// Needed set from the last scan, in order.
    pub fn needed_coords(&self) -> impl Iterator<Item = ChunkCoord> + '_ {
        self.needed.iter().copied()
    }

    /// Statistics snapshot.
    #[must_use]
    pub fn stats(&self) -> StreamingStats {
        StreamingStats {
            active: self.active.len(),
            in_flight: self.in_flight,
            pooled_handles: self.handles.len(),
            scan: *self.clock.stats(),
            ..self.stats
        }
    }

    /// World configuration.
    #[must_use]
    pub fn config(&self) -> &Arc<WorldConfig> {
        &self.config
    }

    /// The landmark registry.
    #[must_use]
    pub fn landmarks(&self) -> &Arc<LandmarkRegistry> {
        &self.landmarks
    }

    /// Last observer seen.
    #[must_use]
    pub const fn observer(&self) -> Observer {
        self.observer
    }

    /// The host.
    #[must_use]
    pub const fn host(&self) -> &H {
        &self.host
    }

    /// The host, mutably.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Number of running build workers; 0 means inline builds.
    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.pool.worker_count()
    }

    /// Build timings from the worker threads.
    #[must_use]
    pub fn worker_stats(&self) -> WorkerStats {
        self.pool.stats()
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn is_settled(&self) -> bool {
        self.in_flight == 0
            && self.ready.is_empty()
            && self.needed.iter().all(|coord| self.active.contains_key(coord))
    }

    /// Drops Pooled/Evicted bookkeeping from the previous scan.
    fn forget_retired(&mut self) {
        for coord in self.retired.drain(..) {
            if self.states.get(&coord).is_some_and(|s| s.is_retired()) {
                self.states.remove(&coord);
            }
        }
    }

    fn retire_unneeded(&mut self) {
        let leaving: Vec<ChunkCoord> = self
            .active
            .keys()
            .copied()
            .filter(|coord| !self.needed.contains(coord))
            .collect();

        for coord in leaving {
            if let Some(chunk) = self.active.remove(&coord) {
                self.retire(coord, chunk.handle);
            }
        }
    }

    fn retire(&mut self, coord: ChunkCoord, mut handle: H::Handle) {
        let state = if self.handles.is_full() {
            self.host.destroy_chunk_handle(handle);
            self.stats.chunks_evicted += 1;
            ChunkState::Evicted
        } else {
            self.host.release_chunk_handle(&mut handle);
            if let Err(handle) = self.handles.put(handle) {
                self.host.destroy_chunk_handle(handle);
            }
            self.stats.chunks_pooled += 1;
            ChunkState::Pooled
        };

        tracing::trace!("Chunk ({}, {}) {:?}", coord.x, coord.z, state);
        self.states.insert(coord, state);
        self.retired.push(coord);
    }

    fn update_colliders(&mut self) {
        let center = self.center;
        let reach = self.config.collider_distance;

        for (coord, chunk) in &mut self.active {
            let wanted = coord.chebyshev_distance(center) <= reach;
            if chunk.collision != wanted {
                chunk.collision = wanted;
                self.host.set_collision(&mut chunk.handle, *coord, wanted);
                self.stats.collider_changes += 1;
            }
        }
    }

    fn dispatch(&mut self, queue: &mut BuildQueue) -> usize {
        let budget = self.config.max_builds_per_tick as usize;
        let max_in_flight = self.config.max_in_flight_builds();
        let mut dispatched = 0;

        while dispatched < budget && self.in_flight < max_in_flight {
            let Some(Reverse(PriorityKey { coord, .. })) = queue.pop() else {
                break;
            };

            let job = self.job_for(coord);
            self.states.insert(coord, ChunkState::Building);
            self.in_flight += 1;
            self.stats.builds_dispatched += 1;
            self.pool.submit(job);
            dispatched += 1;
        }

        dispatched
    }

    /// Materializes nearby landmarks and snapshots them into a job.
    fn job_for(&self, coord: ChunkCoord) -> BuildJob {
        BuildJob {
            coord,
            biome: self.regions.biome_of_chunk(coord),
            landmarks: self.landmarks.ensure_around_chunk(coord),
        }
    }

    fn receive(&mut self, output: BuildOutput) {
        self.in_flight = self.in_flight.saturating_sub(1);
        self.count_source(output.source);

        if self.needed.contains(&output.coord) && self.state_of(output.coord) == ChunkState::Building {
            self.states.insert(output.coord, ChunkState::Ready);
            self.ready.push_back(output);
        } else {
            self.discard(output.coord);
        }
    }

    fn take_ready(&mut self, coord: ChunkCoord) -> Option<BuildOutput> {
        let index = self.ready.iter().position(|output| output.coord == coord)?;
        self.ready.remove(index)
    }

    /// Receives finished builds until `coord` leaves Building.
    fn await_build(&mut self, coord: ChunkCoord) -> Option<BuildOutput> {
        while self.state_of(coord) == ChunkState::Building {
            let Some(output) = self.pool.recv_timeout(SPAWN_WAIT) else {
                tracing::warn!(
                    "Spawn chunk ({}, {}) still building after {:?}",
                    coord.x,
                    coord.z,
                    SPAWN_WAIT
                );
                return None;
            };
            self.receive(output);
        }
        self.take_ready(coord)
    }

    fn count_source(&mut self, source: BuildSource) {
        match source {
            BuildSource::Loaded => self.stats.chunks_loaded += 1,
            BuildSource::Generated => self.stats.chunks_generated += 1,
        }
    }

    fn discard(&mut self, coord: ChunkCoord) {
        if self.state_of(coord).is_in_flight() {
            self.states.remove(&coord);
        }
        self.stats.builds_discarded += 1;
        tracing::trace!("Discarded build for chunk ({}, {})", coord.x, coord.z);
    }

    fn apply(&mut self, output: BuildOutput) {
        let coord = output.coord;
        let collision = coord.chebyshev_distance(self.center) <= self.config.collider_distance;

        let mut handle = if let Some(handle) = self.handles.take() {
            self.stats.handles_reused += 1;
            handle
        } else {
            self.stats.handles_acquired += 1;
            self.host.acquire_chunk_handle()
        };

        self.host.apply_mesh(&mut handle, coord, &output.mesh, collision);
        self.active.insert(
            coord,
            ActiveChunk {
                handle,
                voxels: output.voxels,
                collision,
            },
        );
        self.states.insert(coord, ChunkState::Active);
        self.stats.builds_applied += 1;
    }
}

impl<H: ChunkHost> Drop for StreamingScheduler<H> {
    fn drop(&mut self) {
        tracing::info!(
            "Streaming scheduler stopped after {} scans: {} applied, {} discarded, {} active",
            self.stats.scans,
            self.stats.builds_applied,
            self.stats.builds_discarded,
            self.active.len()
        );
    }
}

impl<H: ChunkHost> std::fmt::Debug for StreamingScheduler<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamingScheduler")
            .field("center", &self.center)
            .field("needed", &self.needed.len())
            .field("active", &self.active.len())
            .field("in_flight", &self.in_flight)
            .field("pool", &self.pool)
            .finish_non_exhaustive()
    }
}

/// Chunks within Chebyshev `radius` of `center`, row-major.
fn square(center: ChunkCoord, radius: u32) -> impl Iterator<Item = ChunkCoord> {
    let r = radius as i32;
    (-r..=r).flat_map(move |dz| (-r..=r).map(move |dx| center.offset(dx, dz)))
}
