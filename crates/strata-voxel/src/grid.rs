//! Bounded voxel grid and the read-only query seam derived caches depend on.
//!
//! [`VoxelGrid`] is the single source of truth for voxel materials. Surface
//! extraction and interior layers read it through [`VoxelGridAccess`], which
//! resolves out-of-range coordinates to air so neighbour sampling at the grid
//! border is always defined.

use glam::{IVec3, UVec3, Vec3};

use crate::face_direction::FaceDirection;
use crate::registry::VoxelTypeId;
use crate::shape::{GridShape, VoxelId};

/// Read-only access to a bounded voxel grid.
pub trait VoxelGridAccess {
    /// Grid dimensions and id packing.
    fn shape(&self) -> GridShape;

    /// World units per voxel along each axis.
    fn scale(&self) -> Vec3;

    /// Returns the material at `pos`, or air when `pos` is out of bounds.
    fn get(&self, pos: IVec3) -> VoxelTypeId;

    /// Returns the material of the voxel with the given id.
    fn get_id(&self, id: VoxelId) -> VoxelTypeId {
        self.get(self.shape().unpack(id).as_ivec3())
    }

    /// Returns `true` if the voxel at `pos` is a solid material.
    fn is_solid(&self, pos: IVec3) -> bool {
        self.get(pos).is_solid()
    }

    /// Calls `f(type, neighbour, direction)` for each in-bounds face neighbour of `pos`.
    fn for_adjacent<F>(&self, pos: IVec3, mut f: F)
    where
        F: FnMut(VoxelTypeId, IVec3, FaceDirection),
    {
        let shape = self.shape();
        for dir in FaceDirection::ALL {
            let n = dir.offset(pos);
            if shape.contains(n) {
                f(self.get(n), n, dir);
            }
        }
    }

    /// Calls `f(type, pos)` for every voxel in the inclusive box
    /// `origin + min_offset ..= origin + max_offset`, clamped to the grid.
    fn for_box<F>(&self, origin: IVec3, min_offset: IVec3, max_offset: IVec3, mut f: F)
    where
        F: FnMut(VoxelTypeId, IVec3),
    {
        let shape = self.shape();
        let upper = shape.size().as_ivec3() - IVec3::ONE;
        let lo = (origin + min_offset).max(IVec3::ZERO);
        let hi = (origin + max_offset).min(upper);
        for z in lo.z..=hi.z {
            for y in lo.y..=hi.y {
                for x in lo.x..=hi.x {
                    let pos = IVec3::new(x, y, z);
                    f(self.get(pos), pos);
                }
            }
        }
    }
}

/// Dense, bounds-checked voxel storage.
#[derive(Clone, Debug)]
pub struct VoxelGrid {
    shape: GridShape,
    scale: Vec3,
    /// One cell per voxel, indexed by [`VoxelId`].
    cells: Vec<VoxelTypeId>,
}

impl VoxelGrid {
    /// Creates a grid filled with air and one world unit per voxel.
    pub fn new(shape: GridShape) -> Self {
        Self::with_scale(shape, Vec3::ONE)
    }

    /// Creates a grid filled with air and the given world units per voxel.
    pub fn with_scale(shape: GridShape, scale: Vec3) -> Self {
        Self {
            shape,
            scale,
            cells: vec![VoxelTypeId::AIR; shape.volume()],
        }
    }

    /// Sets the voxel at `pos` and returns the previous material.
    ///
    /// Out-of-bounds writes are ignored with a warning and return `None`.
    pub fn set(&mut self, pos: IVec3, voxel: VoxelTypeId) -> Option<VoxelTypeId> {
        let Some(id) = self.shape.try_pack(pos) else {
            tracing::warn!("VoxelGrid::set out of bounds: ({}, {}, {})", pos.x, pos.y, pos.z);
            return None;
        };
        Some(std::mem::replace(&mut self.cells[id.0 as usize], voxel))
    }

    /// Fills every voxel with the given material.
    pub fn fill(&mut self, voxel: VoxelTypeId) {
        self.cells.fill(voxel);
    }

    /// Fills the inclusive box `min ..= max`, clamped to the grid.
    pub fn fill_box(&mut self, min: IVec3, max: IVec3, voxel: VoxelTypeId) {
        let upper = self.shape.size().as_ivec3() - IVec3::ONE;
        let lo = min.max(IVec3::ZERO);
        let hi = max.min(upper);
        for z in lo.z..=hi.z {
            for y in lo.y..=hi.y {
                for x in lo.x..=hi.x {
                    let id = self.shape.pack(UVec3::new(x as u32, y as u32, z as u32));
                    self.cells[id.0 as usize] = voxel;
                }
            }
        }
    }

    /// Returns the number of solid voxels.
    pub fn solid_count(&self) -> usize {
        self.cells.iter().filter(|v| v.is_solid()).count()
    }
}

impl VoxelGridAccess for VoxelGrid {
    fn shape(&self) -> GridShape {
        self.shape
    }

    fn scale(&self) -> Vec3 {
        self.scale
    }

    fn get(&self, pos: IVec3) -> VoxelTypeId {
        match self.shape.try_pack(pos) {
            Some(id) => self.cells[id.0 as usize],
            None => VoxelTypeId::AIR,
        }
    }

    fn get_id(&self, id: VoxelId) -> VoxelTypeId {
        self.cells
            .get(id.0 as usize)
            .copied()
            .unwrap_or(VoxelTypeId::AIR)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
