//! Voxel edit notifications.
//!
//! Grid edits made through [`set_voxel`] and [`load_level`] push a
//! [`VoxelEvent`] into a [`VoxelEventBuffer`]; downstream consumers (surface
//! extraction, interior layers) read them once per frame. The buffer is
//! double-buffered: call [`swap`](VoxelEventBuffer::swap) once per frame.

use glam::IVec3;

use crate::grid::VoxelGrid;
use crate::registry::VoxelTypeId;

/// A change to the voxel grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VoxelEvent {
    /// The whole grid was replaced; every derived cache must rebuild from scratch.
    NewLevel,
    /// A single voxel changed material.
    Changed {
        /// Grid coordinate of the edited voxel.
        pos: IVec3,
        /// Material before the edit.
        old_type: VoxelTypeId,
        /// Material after the edit.
        new_type: VoxelTypeId,
    },
}

/// Double-buffered event storage for voxel edits.
///
/// Consumers read the events written since the last
/// [`swap`](VoxelEventBuffer::swap). A swap retains them for one more frame
/// and the second swap drops them.
#[derive(Debug, Default)]
pub struct VoxelEventBuffer {
    /// Events from the previous frame (readable).
    prev: Vec<VoxelEvent>,
    /// Events from the current frame (being written).
    current: Vec<VoxelEvent>,
}

impl VoxelEventBuffer {
    /// Creates a new empty event buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sends an event.
    pub fn send(&mut self, event: VoxelEvent) {
        self.current.push(event);
    }

    /// Returns only the events written since the last swap.
    pub fn read_current(&self) -> impl Iterator<Item = &VoxelEvent> {
        self.current.iter()
    }

    /// Returns the number of readable events.
    pub fn len(&self) -> usize {
        self.prev.len() + self.current.len()
    }

    /// Returns `true` if there are no readable events.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Advances the frame: previous events are dropped, current becomes previous.
    pub fn swap(&mut self) {
        self.prev.clear();
        std::mem::swap(&mut self.prev, &mut self.current);
    }

    /// Clears both buffers.
    pub fn clear(&mut self) {
        self.prev.clear();
        self.current.clear();
    }
}

/// Sets a voxel and emits [`VoxelEvent::Changed`] if the material changed.
///
/// Returns `true` if the voxel was modified. Returns `false` for
/// out-of-bounds coordinates or when the voxel already had the material.
pub fn set_voxel(
    grid: &mut VoxelGrid,
    pos: IVec3,
    new_type: VoxelTypeId,
    events: &mut VoxelEventBuffer,
) -> bool {
    let Some(old_type) = grid.set(pos, new_type) else {
        return false;
    };
    if old_type == new_type {
        return false;
    }

    events.send(VoxelEvent::Changed {
        pos,
        old_type,
        new_type,
    });
    true
}

/// Replaces the grid contents and emits [`VoxelEvent::NewLevel`].
pub fn load_level(grid: &mut VoxelGrid, level: VoxelGrid, events: &mut VoxelEventBuffer) {
    *grid = level;
    events.send(VoxelEvent::NewLevel);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
