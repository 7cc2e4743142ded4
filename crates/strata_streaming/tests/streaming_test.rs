//! # Streaming Tests
//!
//! Needed sets, budgets, pooling, colliders and de-duplication, checked
//! through the calls the scheduler makes on its host.

mod common;

use std::time::Duration;

use common::{observer_at, square, HostEvent, RecordingHost};
use strata_core::{ChunkCoord, WorldConfig};
use strata_streaming::{ChunkState, StreamingScheduler};

const SETTLE: Duration = Duration::from_secs(60);

fn scheduler(config: WorldConfig) -> StreamingScheduler<RecordingHost> {
    StreamingScheduler::new(config, RecordingHost::default()).unwrap()
}

fn sorted(mut coords: Vec<ChunkCoord>) -> Vec<ChunkCoord> {
    coords.sort();
    coords
}

/// Test: the default test world settles into a 3×3 square of colliding chunks.
#[test]
fn test_initial_square_becomes_active() {
    let config = WorldConfig::test();
    let mut scheduler = scheduler(config.clone());
    scheduler.scan(observer_at(&config, 0, 0));

    assert!(scheduler.wait_idle(SETTLE));
    assert_eq!(scheduler.active_count(), 9);
    assert!(scheduler.is_area_ready(ChunkCoord::new(0, 0), 1));
    assert!(!scheduler.is_area_ready(ChunkCoord::new(0, 0), 2));

    for coord in square(ChunkCoord::new(0, 0), 1) {
        assert_eq!(scheduler.state_of(coord), ChunkState::Active);
        assert!(scheduler.has_collision(coord));
    }

    let stats = scheduler.stats();
    assert_eq!(stats.handles_acquired, 9);
    assert_eq!(stats.builds_applied, 9);
    assert_eq!(stats.in_flight, 0);
    assert_eq!(scheduler.host().applied().len(), 9);
}

/// Test: invalid configuration is rejected before anything starts.
#[test]
fn test_invalid_config_is_rejected() {
    let config = WorldConfig {
        max_builds_per_tick: 0,
        ..WorldConfig::test()
    };
    assert!(StreamingScheduler::new(config, RecordingHost::default()).is_err());
}

/// Test: the first build goes to the observer's chunk, then the chunk it faces.
#[test]
fn test_build_order_follows_priority() {
    let config = WorldConfig {
        max_builds_per_tick: 1,
        ..WorldConfig::test()
    };
    let mut scheduler = scheduler(config.clone());
    let east = observer_at(&config, 0, 0).facing(1.0, 0.0);

    scheduler.scan(east);
    scheduler.drain_ready();
    assert_eq!(scheduler.host().applied(), vec![ChunkCoord::new(0, 0)]);

    scheduler.scan(east);
    scheduler.drain_ready();
    assert_eq!(scheduler.host().applied()[1], ChunkCoord::new(1, 0));

    let north = observer_at(&config, 0, 0).facing(0.0, -1.0);
    scheduler.scan(north);
    scheduler.drain_ready();
    assert_eq!(scheduler.host().applied()[2], ChunkCoord::new(0, -1));
}

/// Test: per-scan dispatch and per-pass apply budgets hold.
#[test]
fn test_budgets_limit_work_per_pass() {
    let config = WorldConfig {
        max_builds_per_tick: 3,
        max_applies_per_tick: 2,
        ..WorldConfig::test()
    };
    let mut scheduler = scheduler(config.clone());
    let observer = observer_at(&config, 0, 0);

    scheduler.scan(observer);
    assert_eq!(scheduler.stats().builds_dispatched, 3);
    assert_eq!(scheduler.drain_ready(), 2);
    assert_eq!(scheduler.drain_ready(), 1);
    assert_eq!(scheduler.drain_ready(), 0);
    assert_eq!(scheduler.active_count(), 3);
}

/// Test: repeated scans never dispatch a coordinate that is already building.
#[test]
fn test_no_duplicate_builds() {
    let config = WorldConfig::test();
    let mut scheduler = scheduler(config.clone());
    let observer = observer_at(&config, 0, 0);

    for _ in 0..4 {
        scheduler.scan(observer);
    }
    let stats = scheduler.stats();
    assert_eq!(stats.builds_dispatched, 9);
    assert_eq!(stats.in_flight, 9);

    while scheduler.drain_ready() > 0 {}
    scheduler.scan(observer);

    let applied = scheduler.host().applied();
    assert_eq!(sorted(applied), sorted(square(ChunkCoord::new(0, 0), 1)));
    assert_eq!(scheduler.stats().builds_dispatched, 9);
}

/// Test: the in-flight cap is three scans' worth of builds.
#[test]
fn test_in_flight_is_capped() {
    let config = WorldConfig {
        view_distance: 3,
        max_builds_per_tick: 2,
        ..WorldConfig::test()
    };
    let mut scheduler = scheduler(config.clone());
    let observer = observer_at(&config, 0, 0);

    for _ in 0..10 {
        scheduler.scan(observer);
    }
    assert_eq!(scheduler.stats().in_flight, 6);
    assert_eq!(scheduler.stats().builds_dispatched, 6);
}

/// Test: moving away retires every old chunk exactly once, pooling first.
#[test]
fn test_movement_pools_then_evicts() {
    let config = WorldConfig::test();
    let mut scheduler = scheduler(config.clone());

    scheduler.scan(observer_at(&config, 0, 0));
    assert!(scheduler.wait_idle(SETTLE));

    scheduler.scan(observer_at(&config, 3, 0));
    assert!(scheduler.wait_idle(SETTLE));

    let host = scheduler.host();
    assert_eq!(sorted(host.retired.clone()), sorted(square(ChunkCoord::new(0, 0), 1)));
    assert_eq!(host.count(|e| matches!(e, HostEvent::Release(_))), 4);
    assert_eq!(host.count(|e| matches!(e, HostEvent::Destroy(_))), 5);
    assert_eq!(host.live_handles(), 9);

    let stats = scheduler.stats();
    assert_eq!(stats.chunks_pooled, 4);
    assert_eq!(stats.chunks_evicted, 5);
    assert_eq!(stats.handles_reused, 4);
    assert_eq!(stats.handles_acquired, 14);
    assert_eq!(stats.pooled_handles, 0);

    let active: Vec<ChunkCoord> = scheduler.active_coords().collect();
    assert_eq!(active, sorted(square(ChunkCoord::new(3, 0), 1)));
    for coord in square(ChunkCoord::new(0, 0), 1) {
        assert_eq!(scheduler.state_of(coord), ChunkState::NotNeeded);
    }
}

/// Test: the preload margin only widens the first scan.
#[test]
fn test_preload_margin_applies_once() {
    let config = WorldConfig {
        preload_margin: 1,
        max_builds_per_tick: 25,
        max_applies_per_tick: 25,
        ..WorldConfig::test()
    };
    let mut scheduler = scheduler(config.clone());
    let observer = observer_at(&config, 0, 0);

    scheduler.scan(observer);
    assert_eq!(scheduler.needed_coords().count(), 25);
    assert_eq!(scheduler.drain_ready(), 25);
    assert!(scheduler.is_area_ready(ChunkCoord::new(0, 0), 2));

    scheduler.scan(observer);
    assert_eq!(scheduler.needed_coords().count(), 9);
    assert_eq!(scheduler.active_count(), 9);

    let stats = scheduler.stats();
    assert_eq!(stats.chunks_pooled, 4);
    assert_eq!(stats.chunks_evicted, 12);
    assert_eq!(stats.pooled_handles, 4);
    assert!(scheduler.state_of(ChunkCoord::new(2, 2)).is_retired());
}

/// Test: collision follows the observer's chunk.
#[test]
fn test_colliders_follow_observer() {
    let config = WorldConfig {
        collider_distance: 0,
        ..WorldConfig::test()
    };
    let mut scheduler = scheduler(config.clone());

    scheduler.scan(observer_at(&config, 0, 0));
    assert!(scheduler.wait_idle(SETTLE));
    for coord in square(ChunkCoord::new(0, 0), 1) {
        assert_eq!(scheduler.has_collision(coord), coord == ChunkCoord::new(0, 0));
    }

    scheduler.scan(observer_at(&config, 1, 0));
    assert!(scheduler.wait_idle(SETTLE));
    assert!(!scheduler.has_collision(ChunkCoord::new(0, 0)));
    assert!(scheduler.has_collision(ChunkCoord::new(1, 0)));
    assert!(!scheduler.has_collision(ChunkCoord::new(2, 0)));

    let toggles: Vec<(ChunkCoord, bool)> = scheduler
        .host()
        .events
        .iter()
        .filter_map(|event| match event {
            HostEvent::Collision { coord, enabled, .. } => Some((*coord, *enabled)),
            _ => None,
        })
        .collect();
    assert_eq!(
        toggles,
        vec![(ChunkCoord::new(0, 0), false), (ChunkCoord::new(1, 0), true)]
    );
    assert_eq!(scheduler.stats().collider_changes, 2);
}

/// Test: builds that finish after their chunk left the needed set are dropped.
#[test]
fn test_stale_builds_are_discarded() {
    let config = WorldConfig::test();
    let mut scheduler = scheduler(config.clone());

    scheduler.scan(observer_at(&config, 0, 0));
    let stale: Vec<ChunkCoord> = square(ChunkCoord::new(0, 0), 1)
        .into_iter()
        .filter(|&c| scheduler.state_of(c) == ChunkState::Building)
        .collect();
    assert_eq!(stale.len(), 4);

    scheduler.scan(observer_at(&config, 10, 10));
    scheduler.drain_ready();

    assert_eq!(scheduler.stats().builds_discarded, 4);
    for coord in &stale {
        assert_eq!(scheduler.state_of(*coord), ChunkState::NotNeeded);
    }
    let far = square(ChunkCoord::new(10, 10), 1);
    assert!(scheduler.host().applied().iter().all(|c| far.contains(c)));
}

/// Test: scans run on the clock, not every update.
#[test]
fn test_update_scans_on_interval() {
    let config = WorldConfig::test();
    let mut scheduler = scheduler(config.clone());
    let observer = observer_at(&config, 0, 0);

    scheduler.update(observer, Duration::ZERO);
    assert_eq!(scheduler.stats().scans, 1);

    scheduler.update(observer, Duration::from_millis(50));
    assert_eq!(scheduler.stats().scans, 1);

    scheduler.update(observer, Duration::from_millis(200));
    assert_eq!(scheduler.stats().scans, 2);
    assert_eq!(scheduler.stats().scan.total_scans, 2);
}

/// Test: identical inputs produce identical host call sequences.
#[test]
fn test_host_calls_are_deterministic() {
    fn run() -> Vec<HostEvent> {
        let config = WorldConfig::test();
        let mut scheduler = scheduler(config.clone());
        for (x, z) in [(0, 0), (1, 0), (1, 1), (3, 1), (0, 0)] {
            for _ in 0..4 {
                scheduler.scan(observer_at(&config, x, z).facing(1.0, 0.5));
                scheduler.drain_ready();
            }
        }
        scheduler.host().events.clone()
    }

    let a = run();
    assert!(!a.is_empty());
    assert_eq!(a, run());
}

/// Test: worker threads settle to the same chunks as inline builds.
#[test]
fn test_threaded_matches_inline() {
    let inline_config = WorldConfig::test();
    let threaded_config = WorldConfig {
        worker_threads: 2,
        ..WorldConfig::test()
    };

    let mut inline = scheduler(inline_config.clone());
    let mut threaded = scheduler(threaded_config.clone());
    assert_eq!(inline.worker_count(), 0);
    assert_eq!(threaded.worker_count(), 2);

    inline.scan(observer_at(&inline_config, 0, 0));
    threaded.scan(observer_at(&threaded_config, 0, 0));
    assert!(inline.wait_idle(SETTLE));
    assert!(threaded.wait_idle(SETTLE));

    assert_eq!(threaded.active_count(), 9);
    for coord in square(ChunkCoord::new(0, 0), 1) {
        assert_eq!(inline.voxels(coord), threaded.voxels(coord));
    }
}
