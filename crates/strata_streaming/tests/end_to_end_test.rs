//! # End-to-End Tests
//!
//! Spawning, world queries and the on-disk chunk cache through a full
//! scheduler.

mod common;

use std::fs;
use std::time::Duration;

use common::{observer_at, square, RecordingHost};
use strata_core::{BlockType, ChunkCoord, WorldConfig};
use strata_procedural::RegionIndex;
use strata_streaming::{ChunkState, Observer, StreamingScheduler};

const SETTLE: Duration = Duration::from_secs(60);

fn scheduler(config: WorldConfig) -> StreamingScheduler<RecordingHost> {
    StreamingScheduler::new(config, RecordingHost::default()).unwrap()
}

/// Test: spawning builds the observer's chunk synchronously and reports the ground.
#[test]
fn test_prepare_spawn_places_observer_on_ground() {
    let config = WorldConfig::test();
    let block = config.block_size;
    let mut scheduler = scheduler(config.clone());

    let height = scheduler.prepare_spawn(Observer::new(0.0, 0.0)).unwrap();
    assert!((1..100).contains(&height));
    assert_eq!(scheduler.active_count(), 1);
    assert_eq!(scheduler.state_of(ChunkCoord::new(0, 0)), ChunkState::Active);

    let ground = f64::from(height);
    assert!(scheduler.block_at([0.0, (ground - 0.5) * block, 0.0]).is_solid());
    assert_eq!(scheduler.block_at([0.0, (ground + 0.5) * block, 0.0]), BlockType::Air);
    assert_eq!(scheduler.block_at([0.0, -0.5 * block, 0.0]), BlockType::Air);
    assert_eq!(scheduler.block_at([100.0, 0.5 * block, 100.0]), BlockType::Air);

    // A second call reuses the Active chunk
    assert_eq!(scheduler.prepare_spawn(Observer::new(0.0, 0.0)), Some(height));
    assert_eq!(scheduler.stats().builds_dispatched, 1);
}

/// Test: the spawn chunk is not rebuilt once streaming starts.
#[test]
fn test_spawn_then_stream() {
    let config = WorldConfig::test();
    let mut scheduler = scheduler(config.clone());

    scheduler.prepare_spawn(observer_at(&config, 0, 0));
    scheduler.scan(observer_at(&config, 0, 0));
    assert!(scheduler.wait_idle(SETTLE));

    let stats = scheduler.stats();
    assert_eq!(stats.builds_dispatched, 9);
    assert_eq!(stats.handles_acquired, 9);
    assert_eq!(stats.builds_discarded, 0);

    let mut applied = scheduler.host().applied();
    applied.sort();
    let mut expected = square(ChunkCoord::new(0, 0), 1);
    expected.sort();
    assert_eq!(applied, expected);
}

/// Test: spawning on a chunk that is already building reuses that build.
#[test]
fn test_stream_then_spawn() {
    let config = WorldConfig::test();
    let mut scheduler = scheduler(config.clone());

    scheduler.scan(observer_at(&config, 0, 0));
    assert_eq!(scheduler.state_of(ChunkCoord::new(0, 0)), ChunkState::Building);

    assert!(scheduler.prepare_spawn(observer_at(&config, 0, 0)).is_some());
    assert_eq!(scheduler.state_of(ChunkCoord::new(0, 0)), ChunkState::Active);
    assert!(scheduler.wait_idle(SETTLE));

    let stats = scheduler.stats();
    assert_eq!(stats.builds_dispatched, 9);
    assert_eq!(stats.chunks_generated, 9);
    assert_eq!(stats.builds_discarded, 0);
    assert_eq!(stats.builds_applied, 9);
}

/// Test: spawning on a finished but unapplied build applies that build.
#[test]
fn test_spawn_takes_ready_build() {
    let config = WorldConfig {
        max_applies_per_tick: 1,
        ..WorldConfig::test()
    };
    let mut scheduler = scheduler(config.clone());

    // Facing -X from (1, 0): (0, 0) is the second build out
    scheduler.scan(observer_at(&config, 1, 0).facing(-1.0, 0.0));
    assert_eq!(scheduler.drain_ready(), 1);
    assert_eq!(scheduler.state_of(ChunkCoord::new(1, 0)), ChunkState::Active);
    assert_eq!(scheduler.state_of(ChunkCoord::new(0, 0)), ChunkState::Ready);

    assert!(scheduler.prepare_spawn(observer_at(&config, 0, 0)).is_some());
    assert_eq!(scheduler.state_of(ChunkCoord::new(0, 0)), ChunkState::Active);
    assert_eq!(scheduler.stats().builds_dispatched, 4);
    assert!(scheduler.wait_idle(SETTLE));

    let stats = scheduler.stats();
    assert_eq!(stats.builds_dispatched, 9);
    assert_eq!(stats.chunks_generated, 9);
    assert_eq!(stats.builds_discarded, 0);
}

/// Test: queries agree with the generator's own region and landmark data.
#[test]
fn test_world_queries() {
    let config = WorldConfig::test();
    let regions = RegionIndex::new(&config);
    let mut scheduler = scheduler(config.clone());

    scheduler.scan(observer_at(&config, 0, 0));
    assert!(scheduler.wait_idle(SETTLE));

    for coord in square(ChunkCoord::new(0, 0), 3) {
        assert_eq!(scheduler.biome_at(coord), regions.biome_of_chunk(coord));
    }

    let size = config.chunk_world_size();
    for coord in square(ChunkCoord::new(0, 0), 1) {
        let x = (f64::from(coord.x) + 0.25) * size;
        let z = (f64::from(coord.z) + 0.75) * size;
        let surface = scheduler.surface_height_at(x, z).unwrap();
        let top = f64::from(surface - 1) * config.block_size + config.block_size * 0.5;
        assert!(scheduler.block_at([x, top, z]).is_solid());

        let block_x = (x / config.block_size).floor() as i32;
        let block_z = (z / config.block_size).floor() as i32;
        assert_eq!(
            scheduler.landmark_at(x, z),
            scheduler.landmarks().landmark_at(block_x, block_z)
        );
    }

    assert_eq!(scheduler.surface_height_at(50.0, 50.0), None);
}

/// Test: a second run over the same directory loads instead of generating.
#[test]
fn test_persisted_chunks_are_loaded() {
    let mut config = WorldConfig::test();
    config.persistence.enabled = true;
    config.persistence.directory =
        std::env::temp_dir().join(format!("strata_streaming_e2e_{}", std::process::id()));

    let first_voxels = {
        let mut first = scheduler(config.clone());
        first.scan(observer_at(&config, 0, 0));
        assert!(first.wait_idle(SETTLE));
        let stats = first.stats();
        assert_eq!(stats.chunks_generated, 9);
        assert_eq!(stats.chunks_loaded, 0);

        square(ChunkCoord::new(0, 0), 1)
            .into_iter()
            .map(|coord| first.voxels(coord).map(|v| v.as_bytes().to_vec()))
            .collect::<Vec<_>>()
    };

    let mut second = scheduler(config.clone());
    second.scan(observer_at(&config, 0, 0));
    assert!(second.wait_idle(SETTLE));
    let stats = second.stats();
    assert_eq!(stats.chunks_loaded, 9);
    assert_eq!(stats.chunks_generated, 0);

    let second_voxels: Vec<_> = square(ChunkCoord::new(0, 0), 1)
        .into_iter()
        .map(|coord| second.voxels(coord).map(|v| v.as_bytes().to_vec()))
        .collect();
    assert_eq!(first_voxels, second_voxels);

    fs::remove_dir_all(&config.persistence.directory).ok();
}

/// Test: a corrupt record is regenerated rather than failing the build.
#[test]
fn test_corrupt_record_is_regenerated() {
    let mut config = WorldConfig::test();
    config.persistence.enabled = true;
    config.persistence.directory =
        std::env::temp_dir().join(format!("strata_streaming_corrupt_{}", std::process::id()));
    fs::create_dir_all(&config.persistence.directory).unwrap();
    fs::write(config.persistence.directory.join("c_0_0.vxb"), [8u8, 0, 0, 0, 0xFF]).unwrap();

    let mut scheduler = scheduler(config.clone());
    let height = scheduler.prepare_spawn(observer_at(&config, 0, 0));
    assert!(height.is_some());

    let stats = scheduler.stats();
    assert_eq!(stats.chunks_generated, 1);
    assert_eq!(stats.chunks_loaded, 0);

    fs::remove_dir_all(&config.persistence.directory).ok();
}
