//! # Build Pool
//!
//! Chunk generation and meshing off the scheduling thread.
//!
//! ## Architecture
//!
//! ```text
//! Scheduler ──job──> [crossbeam channel] ──> Worker 0..N
//!                                              │ load or generate
//!                                              │ mesh
//! Scheduler <──ready── [crossbeam channel] <───┘
//! ```
//!
//! A job carries everything the build reads (coordinate, biome, landmark
//! snapshot); the generator and storage behind the shared [`ChunkBuilder`]
//! are immutable. With zero workers, jobs build inline on `submit`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use parking_lot::Mutex;
use strata_core::{Biome, ChunkCoord, MesherKind, VoxelBuffer, WorldConfig};
use strata_meshing::{mesher_for, MeshData, Mesher};
use strata_procedural::{ChunkGenerator, ChunkStorage, Landmark};

/// How long an idle worker waits before rechecking the shutdown flag.
const WORKER_POLL: Duration = Duration::from_millis(50);

/// Where a build's voxels came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuildSource {
    /// Read from chunk storage.
    Loaded,
    /// Produced by the generator.
    Generated,
}

/// One chunk to build.
#[derive(Clone, Debug)]
pub struct BuildJob {
    /// Chunk to build.
    pub coord: ChunkCoord,
    /// Biome of the chunk's region.
    pub biome: Biome,
    /// Landmarks of the 3×3 regions around the chunk, in region order.
    pub landmarks: Vec<Landmark>,
}

/// A finished build.
#[derive(Debug)]
pub struct BuildOutput {
    /// Chunk that was built.
    pub coord: ChunkCoord,
    /// Voxels, shared read-only from here on.
    pub voxels: Arc<VoxelBuffer>,
    /// Mesh for the host.
    pub mesh: MeshData,
    /// Loaded or generated.
    pub source: BuildSource,
}

/// Worker statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WorkerStats {
    /// Jobs finished on worker threads.
    pub jobs_completed: u64,
    /// Total time spent building on worker threads.
    pub total_build_us: u64,
}

impl WorkerStats {
    /// Mean build time in microseconds.
    #[must_use]
    pub fn avg_build_us(&self) -> f64 {
        if self.jobs_completed == 0 {
            0.0
        } else {
            self.total_build_us as f64 / self.jobs_completed as f64
        }
    }
}

/// Shared, immutable build context.
#[derive(Debug)]
pub struct ChunkBuilder {
    generator: ChunkGenerator,
    storage: Option<ChunkStorage>,
}

impl ChunkBuilder {
    /// Creates a builder, opening chunk storage if persistence is enabled.
    ///
    /// A storage directory that cannot be opened disables persistence.
    #[must_use]
    pub fn new(config: &WorldConfig) -> Self {
        let storage = if config.persistence.enabled {
            match ChunkStorage::open(config) {
                Ok(storage) => Some(storage),
                Err(e) => {
                    tracing::warn!("Chunk storage disabled: {}", e);
                    None
                }
            }
        } else {
            None
        };

        Self {
            generator: ChunkGenerator::new(config),
            storage,
        }
    }

    /// The generator.
    #[inline]
    #[must_use]
    pub const fn generator(&self) -> &ChunkGenerator {
        &self.generator
    }

    /// Chunk storage, if enabled.
    #[inline]
    #[must_use]
    pub const fn storage(&self) -> Option<&ChunkStorage> {
        self.storage.as_ref()
    }

    /// Loads or generates the voxels for a job, then meshes them.
    pub fn build(&self, job: &BuildJob, mesher: &mut dyn Mesher) -> BuildOutput {
        let (voxels, source) = self.voxels_for(job);
        let mesh = mesher.build_mesh(&voxels);

        tracing::debug!(
            "Built chunk ({}, {}): {:?}, {} quads",
            job.coord.x,
            job.coord.z,
            source,
            mesh.quad_count()
        );

        BuildOutput {
            coord: job.coord,
            voxels: Arc::new(voxels),
            mesh,
            source,
        }
    }

    fn voxels_for(&self, job: &BuildJob) -> (VoxelBuffer, BuildSource) {
        let Some(storage) = &self.storage else {
            return (
                self.generator.generate(job.coord, job.biome, &job.landmarks),
                BuildSource::Generated,
            );
        };

        match storage.load(job.coord) {
            Ok(Some(voxels)) => return (voxels, BuildSource::Loaded),
            Ok(None) => {}
            Err(e) => {
                tracing::debug!(
                    "Discarding stored chunk ({}, {}), regenerating: {}",
                    job.coord.x,
                    job.coord.z,
                    e
                );
            }
        }

        let voxels = self.generator.generate(job.coord, job.biome, &job.landmarks);
        if let Err(e) = storage.save(job.coord, &voxels) {
            tracing::warn!("Failed to store chunk ({}, {}): {}", job.coord.x, job.coord.z, e);
        }
        (voxels, BuildSource::Generated)
    }
}

/// Worker threads plus the job and ready channels.
pub struct BuildPool {
    /// Shared build context.
    builder: Arc<ChunkBuilder>,
    /// Job queue; `None` when building inline.
    jobs: Option<Sender<BuildJob>>,
    /// Ready queue, producer side.
    ready_tx: Sender<BuildOutput>,
    /// Ready queue, consumer side.
    ready_rx: Receiver<BuildOutput>,
    /// Mesher for inline builds.
    inline_mesher: Box<dyn Mesher>,
    /// Mesher selection for workers.
    mesher_kind: MesherKind,
    /// Worker thread handles.
    workers: Vec<JoinHandle<()>>,
    /// Shutdown signal.
    shutdown: Arc<AtomicBool>,
    /// Statistics.
    stats: Arc<Mutex<WorkerStats>>,
}

impl BuildPool {
    /// Starts `config.worker_threads` workers (none for inline builds).
    #[must_use]
    pub fn new(config: &WorldConfig) -> Self {
        let builder = Arc::new(ChunkBuilder::new(config));
        let (ready_tx, ready_rx) = unbounded();
        let shutdown = Arc::new(AtomicBool::new(false));
        let stats = Arc::new(Mutex::new(WorkerStats::default()));

        let mut pool = Self {
            builder,
            jobs: None,
            ready_tx,
            ready_rx,
            inline_mesher: mesher_for(config.mesher, config.block_size),
            mesher_kind: config.mesher,
            workers: Vec::with_capacity(config.worker_threads),
            shutdown,
            stats,
        };
        pool.spawn_workers(config.worker_threads, config.block_size);
        pool
    }

    fn spawn_workers(&mut self, count: usize, block_size: f64) {
        if count == 0 {
            return;
        }

        let (job_tx, job_rx) = unbounded::<BuildJob>();
        for index in 0..count {
            let builder = Arc::clone(&self.builder);
            let jobs = job_rx.clone();
            let ready = self.ready_tx.clone();
            let shutdown = Arc::clone(&self.shutdown);
            let stats = Arc::clone(&self.stats);
            let mesher = mesher_for(self.mesher_kind, block_size);

            let spawned = thread::Builder::new()
                .name(format!("strata-build-{index}"))
                .spawn(move || Self::worker_loop(&builder, &jobs, &ready, &shutdown, &stats, mesher));

            match spawned {
                Ok(handle) => self.workers.push(handle),
                Err(e) => tracing::warn!("Failed to spawn build worker {}: {}", index, e),
            }
        }

        if self.workers.is_empty() {
            tracing::warn!("No build workers running, building inline");
        } else {
            self.jobs = Some(job_tx);
            tracing::info!("Build pool started with {} workers", self.workers.len());
        }
    }

    /// Worker thread main loop.
    fn worker_loop(
        builder: &ChunkBuilder,
        jobs: &Receiver<BuildJob>,
        ready: &Sender<BuildOutput>,
        shutdown: &AtomicBool,
        stats: &Mutex<WorkerStats>,
        mut mesher: Box<dyn Mesher>,
    ) {
        while !shutdown.load(Ordering::Relaxed) {
            let job = match jobs.recv_timeout(WORKER_POLL) {
                Ok(job) => job,
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => break,
            };

            let start = Instant::now();
            let output = builder.build(&job, mesher.as_mut());
            {
                let mut s = stats.lock();
                s.jobs_completed += 1;
                s.total_build_us += start.elapsed().as_micros() as u64;
            }

            if ready.send(output).is_err() {
                break;
            }
        }
    }

    /// Number of running workers; 0 means inline builds.
    #[inline]
    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Returns true if jobs build on the calling thread.
    #[inline]
    #[must_use]
    pub fn is_inline(&self) -> bool {
        self.jobs.is_none()
    }

    /// The shared build context.
    #[inline]
    #[must_use]
    pub fn builder(&self) -> &ChunkBuilder {
        &self.builder
    }

    /// Queues a job. Inline pools build it before returning.
    pub fn submit(&mut self, job: BuildJob) {
        let job = if let Some(jobs) = &self.jobs {
            match jobs.send(job) {
                Ok(()) => return,
                Err(err) => err.into_inner(),
            }
        } else {
            job
        };

        if self.jobs.take().is_some() {
            tracing::warn!("Build workers are gone, building inline from now on");
        }

        let output = self.build_now(&job);
        // The pool owns the receiver, so this cannot fail
        let _ = self.ready_tx.send(output);
    }

    /// Builds a job on the calling thread and returns the result directly.
    pub fn build_now(&mut self, job: &BuildJob) -> BuildOutput {
        self.builder.build(job, self.inline_mesher.as_mut())
    }

    /// Takes one finished build without blocking.
    #[must_use]
    pub fn try_recv(&self) -> Option<BuildOutput> {
        self.ready_rx.try_recv().ok()
    }

    /// Waits up to `timeout` for one finished build.
    #[must_use]
    pub fn recv_timeout(&self, timeout: Duration) -> Option<BuildOutput> {
        self.ready_rx.recv_timeout(timeout).ok()
    }

    /// Worker statistics snapshot.
    #[must_use]
    pub fn stats(&self) -> WorkerStats {
        *self.stats.lock()
    }
}

impl std::fmt::Debug for BuildPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildPool")
            .field("workers", &self.workers.len())
            .field("inline", &self.is_inline())
            .field("pending_ready", &self.ready_rx.len())
            .finish_non_exhaustive()
    }
}

impl Drop for BuildPool {
    fn drop(&mut self) {
        // Signal shutdown
        self.shutdown.store(true, Ordering::SeqCst);

        // Disconnect the job queue so idle workers wake up
        self.jobs = None;

        // Wait for workers to finish
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                tracing::warn!("Build worker panicked");
            }
        }
    }
}
