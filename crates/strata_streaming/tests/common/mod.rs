//! Shared fixtures for streaming tests.

#![allow(dead_code)]

use std::collections::HashMap;

use strata_core::{ChunkCoord, WorldConfig};
use strata_meshing::MeshData;
use strata_streaming::{ChunkHost, Observer};

/// One host call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HostEvent {
    Acquire(u32),
    Apply {
        handle: u32,
        coord: ChunkCoord,
        collision: bool,
        quads: usize,
    },
    Collision {
        handle: u32,
        coord: ChunkCoord,
        enabled: bool,
    },
    Release(u32),
    Destroy(u32),
}

/// Host that records every call and tracks which chunk each handle shows.
#[derive(Debug, Default)]
pub struct RecordingHost {
    pub events: Vec<HostEvent>,
    /// Coordinates whose handle was released or destroyed, in call order.
    pub retired: Vec<ChunkCoord>,
    next_handle: u32,
    placed: HashMap<u32, ChunkCoord>,
}

impl RecordingHost {
    /// Coordinates passed to `apply_mesh`, in call order.
    pub fn applied(&self) -> Vec<ChunkCoord> {
        self.events
            .iter()
            .filter_map(|event| match event {
                HostEvent::Apply { coord, .. } => Some(*coord),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, matches: impl Fn(&HostEvent) -> bool) -> usize {
        self.events.iter().filter(|e| matches(e)).count()
    }

    /// Handles acquired and not destroyed.
    pub fn live_handles(&self) -> usize {
        self.count(|e| matches!(e, HostEvent::Acquire(_)))
            - self.count(|e| matches!(e, HostEvent::Destroy(_)))
    }
}

impl ChunkHost for RecordingHost {
    type Handle = u32;

    fn acquire_chunk_handle(&mut self) -> u32 {
        let handle = self.next_handle;
        self.next_handle += 1;
        self.events.push(HostEvent::Acquire(handle));
        handle
    }

    fn apply_mesh(&mut self, handle: &mut u32, coord: ChunkCoord, mesh: &MeshData, enable_collision: bool) {
        self.placed.insert(*handle, coord);
        self.events.push(HostEvent::Apply {
            handle: *handle,
            coord,
            collision: enable_collision,
            quads: mesh.quad_count(),
        });
    }

    fn set_collision(&mut self, handle: &mut u32, coord: ChunkCoord, enabled: bool) {
        self.events.push(HostEvent::Collision {
            handle: *handle,
            coord,
            enabled,
        });
    }

    fn release_chunk_handle(&mut self, handle: &mut u32) {
        if let Some(coord) = self.placed.remove(handle) {
            self.retired.push(coord);
        }
        self.events.push(HostEvent::Release(*handle));
    }

    fn destroy_chunk_handle(&mut self, handle: u32) {
        if let Some(coord) = self.placed.remove(&handle) {
            self.retired.push(coord);
        }
        self.events.push(HostEvent::Destroy(handle));
    }
}

/// Observer standing in the middle of a chunk.
pub fn observer_at(config: &WorldConfig, chunk_x: i32, chunk_z: i32) -> Observer {
    let size = config.chunk_world_size();
    Observer::new(
        (f64::from(chunk_x) + 0.5) * size,
        (f64::from(chunk_z) + 0.5) * size,
    )
}

/// Chunks within Chebyshev `radius` of `center`.
pub fn square(center: ChunkCoord, radius: i32) -> Vec<ChunkCoord> {
    let mut coords = Vec::new();
    for dz in -radius..=radius {
        for dx in -radius..=radius {
            coords.push(center.offset(dx, dz));
        }
    }
    coords
}
