//! # STRATA Streaming
//!
//! Keeps the chunks around a moving observer generated, meshed and shown.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                   StreamingScheduler                     │
//! │  scan: needed set ─► retire ─► colliders ─► queue ─► ... │
//! └───────┬──────────────────────────────────────▲───────────┘
//!         │ BuildJob                             │ BuildOutput
//!         ▼                                      │
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │ strata-build │   │ strata-build │   │ strata-build │
//! │ load/generate│   │ load/generate│   │ load/generate│
//! │    + mesh    │   │    + mesh    │   │    + mesh    │
//! └──────────────┘   └──────────────┘   └──────────────┘
//!         drain_ready ─► ChunkHost::apply_mesh (budgeted)
//! ```
//!
//! ## Chunk Lifecycle
//!
//! `NotNeeded → Scheduled → Building → Ready → Active → Pooled | Evicted`
//!
//! ## Example
//!
//! ```rust,ignore
//! use strata_core::WorldConfig;
//! use strata_streaming::{Observer, StreamingScheduler};
//!
//! let mut scheduler = StreamingScheduler::new(WorldConfig::default(), host)?;
//! scheduler.prepare_spawn(Observer::new(0.0, 0.0));
//!
//! loop {
//!     scheduler.update(Observer::new(x, z).facing(fx, fz), frame_time);
//! }
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod builder;
pub mod clock;
pub mod host;
pub mod priority;
pub mod scheduler;
pub mod state;
pub mod stats;

pub use builder::{BuildJob, BuildOutput, BuildPool, BuildSource, ChunkBuilder, WorkerStats};
pub use clock::{ScanClock, ScanStats};
pub use host::{ChunkHost, HandlePool};
pub use priority::{build_queue, BuildQueue, Observer, PriorityKey};
pub use scheduler::StreamingScheduler;
pub use state::ChunkState;
pub use stats::StreamingStats;
