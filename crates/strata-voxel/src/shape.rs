//! Grid dimensions and the packed [`VoxelId`] encoding.
//!
//! Every derived cache (surface index, layer membership) is keyed by
//! [`VoxelId`], so [`GridShape::pack`] and [`GridShape::unpack`] must stay exact
//! inverses for every in-bounds coordinate.

use glam::{IVec3, UVec3};
use serde::{Deserialize, Serialize};

/// Packed integer encoding of an in-bounds grid coordinate.
///
/// The layout is `x + y * size_x + z * size_x * size_y`, so ids of one
/// horizontal slice are contiguous.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VoxelId(pub u32);

/// Dimensions of a bounded voxel grid, in voxels.
///
/// `z` is the vertical axis: layers and cut heights index along it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridShape {
    /// Extent along X.
    pub size_x: u32,
    /// Extent along Y.
    pub size_y: u32,
    /// Extent along Z (height).
    pub size_z: u32,
}

impl GridShape {
    /// Creates a shape. Each extent must be non-zero and the volume must fit in a `u32`.
    pub fn new(size_x: u32, size_y: u32, size_z: u32) -> Self {
        debug_assert!(size_x > 0 && size_y > 0 && size_z > 0);
        debug_assert!(
            (size_x as u64) * (size_y as u64) * (size_z as u64) <= u32::MAX as u64,
            "grid volume overflows VoxelId"
        );
        Self {
            size_x,
            size_y,
            size_z,
        }
    }

    /// Total number of voxels.
    pub fn volume(&self) -> usize {
        self.size_x as usize * self.size_y as usize * self.size_z as usize
    }

    /// Returns the extents as a vector.
    pub fn size(&self) -> UVec3 {
        UVec3::new(self.size_x, self.size_y, self.size_z)
    }

    /// Returns `true` if `pos` lies inside the grid.
    pub fn contains(&self, pos: IVec3) -> bool {
        pos.x >= 0
            && pos.y >= 0
            && pos.z >= 0
            && (pos.x as u32) < self.size_x
            && (pos.y as u32) < self.size_y
            && (pos.z as u32) < self.size_z
    }

    /// Packs an in-bounds coordinate into its id.
    pub fn pack(&self, pos: UVec3) -> VoxelId {
        debug_assert!(pos.x < self.size_x && pos.y < self.size_y && pos.z < self.size_z);
        VoxelId(pos.x + self.size_x * (pos.y + self.size_y * pos.z))
    }

    /// Packs a signed coordinate, returning `None` when it is out of bounds.
    pub fn try_pack(&self, pos: IVec3) -> Option<VoxelId> {
        self.contains(pos).then(|| self.pack(pos.as_uvec3()))
    }

    /// Unpacks an id produced by [`pack`](Self::pack).
    pub fn unpack(&self, id: VoxelId) -> UVec3 {
        let plane = self.size_x * self.size_y;
        let z = id.0 / plane;
        let rem = id.0 % plane;
        UVec3::new(rem % self.size_x, rem / self.size_x, z)
    }

    /// Height (`z`) of the voxel with the given id.
    pub fn height_of(&self, id: VoxelId) -> u32 {
        id.0 / (self.size_x * self.size_y)
    }

    /// Iterates every id in the grid in packing order.
    pub fn ids(&self) -> impl Iterator<Item = VoxelId> + use<> {
        (0..self.volume() as u32).map(VoxelId)
    }
}
