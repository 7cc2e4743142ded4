//! # Scenario Tests
//!
//! The reference world: seed 42, 16×100 chunks, view distance 1.

use std::time::Duration;

use strata::headless::CountingHost;
use strata::prelude::*;

fn settled_heights() -> Vec<Option<i32>> {
    let config = WorldConfig::test();
    let size = config.chunk_world_size();
    let mut scheduler = StreamingScheduler::new(config, CountingHost::default()).unwrap();

    scheduler.scan(Observer::new(size * 0.5, size * 0.5));
    assert!(scheduler.wait_idle(Duration::from_secs(60)));
    assert_eq!(scheduler.active_count(), 9);

    let block = WorldConfig::test().block_size;
    let mut heights = Vec::new();
    for i in -16..32 {
        for j in -16..32 {
            let x = (f64::from(i) + 0.5) * block;
            let z = (f64::from(j) + 0.5) * block;
            heights.push(scheduler.surface_height_at(x, z));
        }
    }
    heights
}

/// Test: nine chunks settle and every column height reproduces across runs.
#[test]
fn test_reference_world_reproduces() {
    let first = settled_heights();
    assert!(first.iter().all(Option::is_some));
    assert_eq!(first, settled_heights());
}

/// Test: the TOML round trip feeds the same world.
#[test]
fn test_config_round_trip_drives_scheduler() {
    let config = WorldConfig::test();
    let text = config.to_toml_string().unwrap();
    let parsed = WorldConfig::from_toml_str(&text).unwrap();
    assert_eq!(parsed, config);

    let mut scheduler = StreamingScheduler::new(parsed, CountingHost::default()).unwrap();
    assert!(scheduler.prepare_spawn(Observer::new(0.0, 0.0)).is_some());
    assert_eq!(scheduler.state_of(ChunkCoord::new(0, 0)), ChunkState::Active);
}
