//! The surface index: every boundary air voxel of the grid, keyed by [`VoxelId`].
//!
//! The index holds *exactly* the air voxels with at least one solid face
//! neighbour. [`SurfaceIndex::build_all`] establishes that set from scratch;
//! [`SurfaceIndex::build_local`] restores it after a single-voxel edit by
//! rescanning a fixed box around the edit and reporting what changed as a
//! [`SurfaceDiff`].

use glam::IVec3;
use rustc_hash::{FxHashMap, FxHashSet};
use strata_voxel::{GridShape, VoxelEvent, VoxelGridAccess, VoxelId};

use crate::surface::Surface;

/// Low corner of the local rescan box, relative to the edited voxel.
pub const LOCAL_SCAN_MIN: IVec3 = IVec3::new(-1, -1, -1);

/// High corner (inclusive) of the local rescan box, relative to the edited voxel.
///
/// Classification only looks at face neighbours, so `[-1, +1]` already covers
/// every surface an edit can touch. The extra voxel on the high side keeps
/// the box valid for shape rules that sample one step further up or along.
pub const LOCAL_SCAN_MAX: IVec3 = IVec3::new(2, 2, 2);

/// Membership changes produced by a local rebuild, restricted to the scanned box.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SurfaceDiff {
    /// Ids present after the rebuild but not before.
    pub add: FxHashSet<VoxelId>,
    /// Ids present before the rebuild but not after.
    pub remove: FxHashSet<VoxelId>,
    /// Ids present before and after whose faces or shape changed.
    pub modified: FxHashSet<VoxelId>,
}

impl SurfaceDiff {
    /// Returns `true` if nothing changed.
    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.remove.is_empty() && self.modified.is_empty()
    }
}

/// Notification published after the index changes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SurfaceEvent {
    /// The index was rebuilt from scratch; consumers must discard everything.
    NewLevel,
    /// An incremental change.
    Changed(SurfaceDiff),
}

/// Mapping from boundary air voxels to their [`Surface`] descriptors.
#[derive(Clone, Debug)]
pub struct SurfaceIndex {
    shape: GridShape,
    surfaces: FxHashMap<VoxelId, Surface>,
    /// Air voxels adjacent to a surface voxel but not surfaces themselves,
    /// as of the last full rebuild.
    secondary: FxHashSet<VoxelId>,
}

impl SurfaceIndex {
    /// Creates an empty index for grids of the given shape.
    pub fn new(shape: GridShape) -> Self {
        Self {
            shape,
            surfaces: FxHashMap::default(),
            secondary: FxHashSet::default(),
        }
    }

    /// Shape of the grid the index was last built against.
    pub fn shape(&self) -> GridShape {
        self.shape
    }

    /// Rebuilds the whole index from `grid`.
    ///
    /// Every air neighbour of a solid voxel is a candidate; candidates are
    /// classified and kept when they have a shape. Linear in grid volume.
    pub fn build_all<G: VoxelGridAccess>(&mut self, grid: &G) -> SurfaceEvent {
        let shape = grid.shape();
        self.shape = shape;
        self.surfaces.clear();

        let mut primary = FxHashSet::default();
        for id in shape.ids() {
            if grid.get_id(id).is_air() {
                continue;
            }
            let pos = shape.unpack(id).as_ivec3();
            grid.for_adjacent(pos, |ty, n, _| {
                if ty.is_air() {
                    primary.insert(shape.pack(n.as_uvec3()));
                }
            });
        }

        for &id in &primary {
            let surface = Surface::classify(grid, shape.unpack(id));
            if surface.is_surface() {
                self.surfaces.insert(id, surface);
            }
        }

        // TODO: classify ramp and wedge shapes from this ring once the shape
        // taxonomy grows beyond none/generic/floor.
        let mut secondary = FxHashSet::default();
        for &id in &primary {
            grid.for_adjacent(shape.unpack(id).as_ivec3(), |ty, n, _| {
                if ty.is_air() {
                    let nid = shape.pack(n.as_uvec3());
                    if !primary.contains(&nid) {
                        secondary.insert(nid);
                    }
                }
            });
        }
        self.secondary = secondary;

        tracing::debug!(
            surfaces = self.surfaces.len(),
            secondary = self.secondary.len(),
            "surface index rebuilt"
        );
        SurfaceEvent::NewLevel
    }

    /// Restores the index after the voxel at `edited` changed.
    ///
    /// Rescans `edited + LOCAL_SCAN_MIN ..= edited + LOCAL_SCAN_MAX`: each
    /// scanned entry is removed, and air voxels are reclassified and
    /// reinserted when they still have a shape. Must be called once per
    /// discrete edit, after the grid has been updated.
    pub fn build_local<G: VoxelGridAccess>(&mut self, grid: &G, edited: IVec3) -> SurfaceDiff {
        debug_assert_eq!(
            grid.shape(),
            self.shape,
            "grid shape changed without a full rebuild"
        );
        let shape = self.shape;
        let surfaces = &mut self.surfaces;
        let mut removed: FxHashMap<VoxelId, Surface> = FxHashMap::default();
        let mut candidates: FxHashSet<VoxelId> = FxHashSet::default();

        grid.for_box(edited, LOCAL_SCAN_MIN, LOCAL_SCAN_MAX, |ty, pos| {
            let id = shape.pack(pos.as_uvec3());
            if let Some(old) = surfaces.remove(&id) {
                removed.insert(id, old);
            }
            if ty.is_air() {
                let surface = Surface::classify(grid, pos.as_uvec3());
                if surface.is_surface() {
                    surfaces.insert(id, surface);
                    candidates.insert(id);
                }
            }
        });

        let mut diff = SurfaceDiff::default();
        for &id in &candidates {
            match removed.get(&id) {
                None => {
                    diff.add.insert(id);
                }
                Some(old) if surfaces.get(&id) != Some(old) => {
                    diff.modified.insert(id);
                }
                Some(_) => {}
            }
        }
        diff.remove.extend(
            removed
                .keys()
                .filter(|id| !candidates.contains(*id))
                .copied(),
        );

        tracing::trace!(
            x = edited.x,
            y = edited.y,
            z = edited.z,
            add = diff.add.len(),
            remove = diff.remove.len(),
            modified = diff.modified.len(),
            "surface index updated locally"
        );
        diff
    }

    /// Applies a voxel edit notification and returns the matching surface event.
    pub fn handle_voxel_event<G: VoxelGridAccess>(
        &mut self,
        grid: &G,
        event: &VoxelEvent,
    ) -> SurfaceEvent {
        match event {
            VoxelEvent::NewLevel => self.build_all(grid),
            VoxelEvent::Changed { pos, .. } => SurfaceEvent::Changed(self.build_local(grid, *pos)),
        }
    }

    /// Returns the surface for `id`, if it is a boundary voxel.
    pub fn get(&self, id: VoxelId) -> Option<&Surface> {
        self.surfaces.get(&id)
    }

    /// Returns `true` if `id` is a boundary voxel.
    pub fn contains(&self, id: VoxelId) -> bool {
        self.surfaces.contains_key(&id)
    }

    /// Number of surfaces.
    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    /// Returns `true` if the index holds no surfaces.
    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    /// Iterates all surfaces in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = &Surface> {
        self.surfaces.values()
    }

    /// Iterates all surface ids in unspecified order.
    pub fn ids(&self) -> impl Iterator<Item = VoxelId> + '_ {
        self.surfaces.keys().copied()
    }

    /// Air voxels one step beyond the surface set, as of the last [`build_all`](Self::build_all).
    ///
    /// Nothing in the current shape rules reads this ring, and local rebuilds
    /// do not maintain it.
    pub fn secondary(&self) -> &FxHashSet<VoxelId> {
        &self.secondary
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
