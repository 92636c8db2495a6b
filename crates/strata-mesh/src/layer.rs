//! One horizontal slice of cached terrain geometry.
//!
//! A [`Layer`] is either a wall, floor or interior slice at a single grid
//! height. Wall and floor layers hold the surface ids at their height and turn
//! them into quads; interior layers read the grid directly and draw a
//! cross-hatch wherever two solid voxels are stacked across their plane.
//!
//! Layers follow a two-state machine: every membership change marks the layer
//! [`LayerState::Dirty`]; the next [`draw`](Layer::draw) rebuilds it once and
//! leaves it [`LayerState::Clean`].

use std::collections::BTreeSet;

use glam::{Vec2, Vec3};
use strata_surface::{Surface, SurfaceIndex, SurfaceShape, Triangle, face_quad};
use strata_voxel::{FaceDirection, VoxelGridAccess, VoxelId, VoxelTypeRegistry};

use crate::backend::{MeshHandle, RenderBackend};
use crate::buffer::GeometryBuffer;

/// Colour of the base quad drawn under height-0 surfaces.
pub const GRID_BOTTOM_COLOR: [f32; 4] = [0.25, 0.22, 0.2, 1.0];
/// Fill colour of interior cross-sections.
pub const HATCH_FILL_COLOR: [f32; 4] = [0.12, 0.12, 0.14, 1.0];
/// Line colour of interior cross-hatching.
pub const HATCH_LINE_COLOR: [f32; 4] = [0.45, 0.45, 0.5, 1.0];

/// The category of geometry a layer holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LayerKind {
    /// Side faces of surfaces at this height.
    Wall,
    /// Floor faces of surfaces at this height.
    Floor,
    /// Cross-hatch between stacked solid voxels on this height's bottom plane.
    Interior,
}

/// Identifies a layer by kind and height.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerKey {
    /// Geometry category.
    pub kind: LayerKind,
    /// Grid height (`z`).
    pub height: u32,
}

impl LayerKey {
    /// Creates a key.
    pub fn new(kind: LayerKind, height: u32) -> Self {
        Self { kind, height }
    }

    /// Wall layer at `height`.
    pub fn wall(height: u32) -> Self {
        Self::new(LayerKind::Wall, height)
    }

    /// Floor layer at `height`.
    pub fn floor(height: u32) -> Self {
        Self::new(LayerKind::Floor, height)
    }

    /// Interior layer at `height`.
    pub fn interior(height: u32) -> Self {
        Self::new(LayerKind::Interior, height)
    }
}

/// Cache validity of a layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayerState {
    /// Cached geometry matches the current inputs.
    Clean,
    /// Cached geometry is stale; the next draw rebuilds it.
    Dirty,
}

/// Options shared by every layer of a cache.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LayerOptions {
    /// Treat the space below the grid as ground: height-0 surfaces get a floor
    /// quad and height-0 solids get an interior cross-hatch.
    pub draw_grid_bottom: bool,
}

/// Everything a rebuild reads.
pub struct LayerSource<'a, G> {
    /// Current surface index.
    pub index: &'a SurfaceIndex,
    /// The grid the index was built from.
    pub grid: &'a G,
    /// Material colours.
    pub registry: &'a VoxelTypeRegistry,
    /// Cache-wide options.
    pub options: LayerOptions,
}

/// Cached geometry for one kind at one height.
#[derive(Debug)]
pub struct Layer {
    key: LayerKey,
    /// Ordered so rebuilt geometry is deterministic.
    members: BTreeSet<VoxelId>,
    state: LayerState,
    mesh: Option<MeshHandle>,
    rebuilds: u64,
    faces: usize,
    lines: usize,
}

impl Layer {
    /// Creates an empty, dirty layer.
    pub fn new(key: LayerKey) -> Self {
        Self {
            key,
            members: BTreeSet::new(),
            state: LayerState::Dirty,
            mesh: None,
            rebuilds: 0,
            faces: 0,
            lines: 0,
        }
    }

    /// Kind and height of this layer.
    pub fn key(&self) -> LayerKey {
        self.key
    }

    /// Current cache state.
    pub fn state(&self) -> LayerState {
        self.state
    }

    /// Returns `true` when the next draw will rebuild.
    pub fn is_dirty(&self) -> bool {
        self.state == LayerState::Dirty
    }

    /// Returns `true` when the cached geometry has nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.mesh.is_none()
    }

    /// Number of completed rebuilds.
    pub fn rebuild_count(&self) -> u64 {
        self.rebuilds
    }

    /// Faces produced by the last rebuild.
    pub fn face_count(&self) -> usize {
        self.faces
    }

    /// Line segments produced by the last rebuild.
    pub fn line_count(&self) -> usize {
        self.lines
    }

    /// Surface ids assigned to this layer, in ascending order.
    ///
    /// Always empty for interior layers.
    pub fn members(&self) -> impl Iterator<Item = VoxelId> + '_ {
        self.members.iter().copied()
    }

    /// Returns `true` if `id` is a member.
    pub fn contains(&self, id: VoxelId) -> bool {
        self.members.contains(&id)
    }

    /// Adds a surface id and marks the layer dirty, even if it was already present.
    pub fn add_id(&mut self, id: VoxelId) {
        self.members.insert(id);
        self.state = LayerState::Dirty;
    }

    /// Removes a surface id and marks the layer dirty, even if it was absent.
    pub fn remove_id(&mut self, id: VoxelId) {
        self.members.remove(&id);
        self.state = LayerState::Dirty;
    }

    /// Drops every member and marks the layer dirty.
    pub fn clear(&mut self) {
        self.members.clear();
        self.state = LayerState::Dirty;
    }

    /// Marks the layer stale without changing membership.
    pub fn mark_dirty(&mut self) {
        self.state = LayerState::Dirty;
    }

    /// Frees the uploaded geometry, if any, and marks the layer dirty.
    pub fn release<B: RenderBackend + ?Sized>(&mut self, backend: &mut B) {
        if let Some(handle) = self.mesh.take() {
            backend.release(handle);
        }
        self.state = LayerState::Dirty;
    }

    /// Hands the uploaded geometry handle to the caller, leaving the layer empty.
    pub(crate) fn take_mesh(&mut self) -> Option<MeshHandle> {
        self.mesh.take()
    }

    /// Regenerates and uploads the layer's geometry, leaving it clean.
    pub fn rebuild<G, B>(&mut self, src: &LayerSource<'_, G>, backend: &mut B)
    where
        G: VoxelGridAccess,
        B: RenderBackend + ?Sized,
    {
        if let Some(old) = self.mesh.take() {
            backend.release(old);
        }

        let mut buffer = GeometryBuffer::new();
        match self.key.kind {
            LayerKind::Wall => self.build_walls(src, &mut buffer),
            LayerKind::Floor => self.build_floors(src, &mut buffer),
            LayerKind::Interior => self.build_interior(src, &mut buffer),
        }
        self.faces = buffer.face_count();
        self.lines = buffer.line_count();
        self.mesh = buffer.finish(backend, self.key);

        self.state = LayerState::Clean;
        self.rebuilds += 1;
        tracing::trace!(
            kind = ?self.key.kind,
            height = self.key.height,
            faces = self.faces,
            lines = self.lines,
            "layer rebuilt"
        );
    }

    /// Draws the cached geometry, rebuilding first if the layer is dirty.
    pub fn draw<G, B>(&mut self, src: &LayerSource<'_, G>, backend: &mut B)
    where
        G: VoxelGridAccess,
        B: RenderBackend + ?Sized,
    {
        if self.is_dirty() {
            self.rebuild(src, backend);
        }
        if let Some(handle) = self.mesh {
            backend.draw(handle);
        }
    }

    fn surfaces<'s, G>(&'s self, src: &'s LayerSource<'_, G>) -> impl Iterator<Item = &'s Surface> {
        self.members.iter().filter_map(|id| src.index.get(*id))
    }

    fn build_walls<G: VoxelGridAccess>(&self, src: &LayerSource<'_, G>, buffer: &mut GeometryBuffer) {
        let scale = src.grid.scale();
        for surface in self.surfaces(src) {
            for dir in surface.exposed_faces().sides().iter() {
                let color = src.registry.color(surface.face(dir));
                let local = surface.face_triangles(dir);
                push_triangles(buffer, surface, &local, dir, color, scale);
            }
        }
    }

    fn build_floors<G: VoxelGridAccess>(&self, src: &LayerSource<'_, G>, buffer: &mut GeometryBuffer) {
        let scale = src.grid.scale();
        let dir = FaceDirection::FLOOR;
        for surface in self.surfaces(src) {
            if surface.shape == SurfaceShape::Floor {
                let color = src.registry.color(surface.face(dir));
                let local = surface.face_triangles(dir);
                push_triangles(buffer, surface, &local, dir, color, scale);
            } else if src.options.draw_grid_bottom && surface.position.z == 0 {
                push_triangles(buffer, surface, &face_quad(dir), dir, GRID_BOTTOM_COLOR, scale);
            }
        }
    }

    fn build_interior<G: VoxelGridAccess>(&self, src: &LayerSource<'_, G>, buffer: &mut GeometryBuffer) {
        let grid = src.grid;
        let shape = grid.shape();
        let scale = grid.scale();
        let z = self.key.height as i32;
        if z as u32 >= shape.size_z {
            return;
        }

        for y in 0..shape.size_y as i32 {
            for x in 0..shape.size_x as i32 {
                let here = glam::IVec3::new(x, y, z);
                if !grid.is_solid(here) {
                    continue;
                }
                let below_solid = if z == 0 {
                    src.options.draw_grid_bottom
                } else {
                    grid.is_solid(here - glam::IVec3::Z)
                };
                if !below_solid {
                    continue;
                }

                let origin = here.as_vec3();
                let corners = [
                    Vec3::new(0.0, 0.0, 0.0),
                    Vec3::new(1.0, 0.0, 0.0),
                    Vec3::new(1.0, 1.0, 0.0),
                    Vec3::new(0.0, 1.0, 0.0),
                ]
                .map(|c| (origin + c) * scale);
                let uvs = [Vec2::ZERO, Vec2::X, Vec2::ONE, Vec2::Y];
                buffer.add_face(&corners, &[HATCH_FILL_COLOR; 4], &uvs);
                buffer.add_line(corners[0], corners[2], HATCH_LINE_COLOR);
                buffer.add_line(corners[1], corners[3], HATCH_LINE_COLOR);
            }
        }
    }
}

/// Emits voxel-local triangles as world-space faces.
fn push_triangles(
    buffer: &mut GeometryBuffer,
    surface: &Surface,
    local: &[Triangle],
    dir: FaceDirection,
    color: [f32; 4],
    scale: Vec3,
) {
    for (tri, local_tri) in surface.to_world_space(local).iter().zip(local) {
        let world = tri.scaled(scale).vertices;
        let uvs = local_tri.vertices.map(|v| face_uv(dir, v));
        buffer.add_face(&world, &[color; 3], &uvs);
    }
}

/// Projects a voxel-local vertex onto the two axes spanning a face.
fn face_uv(dir: FaceDirection, local: Vec3) -> Vec2 {
    match dir {
        FaceDirection::PosX | FaceDirection::NegX => Vec2::new(local.y, local.z),
        FaceDirection::PosY | FaceDirection::NegY => Vec2::new(local.x, local.z),
        FaceDirection::PosZ | FaceDirection::NegZ => Vec2::new(local.x, local.y),
    }
}
