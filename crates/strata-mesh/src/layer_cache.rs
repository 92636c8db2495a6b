//! The stack of wall, floor and interior layers for every grid height.
//!
//! [`LayerCache`] consumes surface diffs and voxel edits and translates them
//! into membership changes and dirty marks. It never rebuilds eagerly: work
//! happens in [`draw_slice`](LayerCache::draw_slice), once per dirty layer.

use strata_surface::{SurfaceEvent, SurfaceIndex};
use strata_voxel::{GridShape, VoxelEvent, VoxelGridAccess, VoxelId};

use crate::backend::{MeshHandle, RenderBackend};
use crate::layer::{Layer, LayerKey, LayerKind, LayerOptions, LayerSource};
use crate::slice::SliceComposer;

/// Per-height layers of every kind.
#[derive(Debug)]
pub struct LayerCache {
    shape: GridShape,
    options: LayerOptions,
    walls: Vec<Layer>,
    floors: Vec<Layer>,
    interiors: Vec<Layer>,
    /// Uploads of layers dropped by a resize, freed on the next draw.
    retired: Vec<MeshHandle>,
}

impl LayerCache {
    /// Creates dirty, empty layers for every height of `shape`.
    pub fn new(shape: GridShape, options: LayerOptions) -> Self {
        let make = |kind: LayerKind| -> Vec<Layer> {
            (0..shape.size_z)
                .map(|z| Layer::new(LayerKey::new(kind, z)))
                .collect()
        };
        Self {
            shape,
            options,
            walls: make(LayerKind::Wall),
            floors: make(LayerKind::Floor),
            interiors: make(LayerKind::Interior),
            retired: Vec::new(),
        }
    }

    /// Grid dimensions the layers were sized for.
    pub fn shape(&self) -> GridShape {
        self.shape
    }

    /// Options every layer rebuilds with.
    pub fn options(&self) -> LayerOptions {
        self.options
    }

    /// Number of heights.
    pub fn height(&self) -> u32 {
        self.shape.size_z
    }

    /// Returns the layer for `key`, if the height exists.
    pub fn layer(&self, key: LayerKey) -> Option<&Layer> {
        self.stack(key.kind).get(key.height as usize)
    }

    /// Returns the layer for `key` mutably, if the height exists.
    pub fn layer_mut(&mut self, key: LayerKey) -> Option<&mut Layer> {
        self.stack_mut(key.kind).get_mut(key.height as usize)
    }

    /// Iterates every layer.
    pub fn layers(&self) -> impl Iterator<Item = &Layer> {
        self.walls
            .iter()
            .chain(self.floors.iter())
            .chain(self.interiors.iter())
    }

    /// Number of layers currently dirty.
    pub fn dirty_count(&self) -> usize {
        self.layers().filter(|l| l.is_dirty()).count()
    }

    /// Applies a surface index notification.
    ///
    /// `NewLevel` drops all membership and repopulates from `index`; a diff
    /// removes, adds and refreshes ids at their own height.
    pub fn apply_surface_event(&mut self, event: &SurfaceEvent, index: &SurfaceIndex) {
        match event {
            SurfaceEvent::NewLevel => {
                if index.shape() != self.shape {
                    self.resize(index.shape());
                }
                for layer in self.walls.iter_mut().chain(self.floors.iter_mut()) {
                    layer.clear();
                }
                for id in index.ids() {
                    self.add_id(id);
                }
                tracing::debug!(surfaces = index.len(), "layer cache repopulated");
            }
            SurfaceEvent::Changed(diff) => {
                for &id in &diff.remove {
                    self.remove_id(id);
                }
                for &id in diff.add.iter().chain(diff.modified.iter()) {
                    self.add_id(id);
                }
            }
        }
    }

    /// Marks the interior layers an edit can affect.
    ///
    /// An interior layer at height `z` depends on voxels at `z` and `z - 1`.
    pub fn apply_voxel_event(&mut self, event: &VoxelEvent) {
        match event {
            VoxelEvent::NewLevel => {
                for layer in &mut self.interiors {
                    layer.mark_dirty();
                }
            }
            VoxelEvent::Changed { pos, .. } => {
                if !self.shape.contains(*pos) {
                    return;
                }
                let z = pos.z as usize;
                for layer in self.interiors.iter_mut().skip(z).take(2) {
                    layer.mark_dirty();
                }
            }
        }
    }

    /// Draws the cross-section at cut height `top`, rebuilding dirty layers on the way.
    ///
    /// Returns the number of layers visited.
    pub fn draw_slice<G, B>(&mut self, top: u32, src: &LayerSource<'_, G>, backend: &mut B) -> usize
    where
        G: VoxelGridAccess,
        B: RenderBackend + ?Sized,
    {
        for handle in self.retired.drain(..) {
            backend.release(handle);
        }

        let keys = SliceComposer::new(self.shape.size_z).compose(top);
        for &key in &keys {
            if let Some(layer) = self.layer_mut(key) {
                layer.draw(src, backend);
            }
        }
        keys.len()
    }

    /// Rebuilds every dirty layer without drawing.
    pub fn rebuild_dirty<G, B>(&mut self, src: &LayerSource<'_, G>, backend: &mut B) -> usize
    where
        G: VoxelGridAccess,
        B: RenderBackend + ?Sized,
    {
        let mut rebuilt = 0;
        for layer in self
            .walls
            .iter_mut()
            .chain(self.floors.iter_mut())
            .chain(self.interiors.iter_mut())
        {
            if layer.is_dirty() {
                layer.rebuild(src, backend);
                rebuilt += 1;
            }
        }
        rebuilt
    }

    /// Frees every upload and marks all layers dirty.
    pub fn release_all<B: RenderBackend + ?Sized>(&mut self, backend: &mut B) {
        for handle in self.retired.drain(..) {
            backend.release(handle);
        }
        for layer in self
            .walls
            .iter_mut()
            .chain(self.floors.iter_mut())
            .chain(self.interiors.iter_mut())
        {
            layer.release(backend);
        }
    }

    fn add_id(&mut self, id: VoxelId) {
        let z = self.shape.height_of(id) as usize;
        if let (Some(wall), Some(floor)) = (self.walls.get_mut(z), self.floors.get_mut(z)) {
            wall.add_id(id);
            floor.add_id(id);
        }
    }

    fn remove_id(&mut self, id: VoxelId) {
        let z = self.shape.height_of(id) as usize;
        if let (Some(wall), Some(floor)) = (self.walls.get_mut(z), self.floors.get_mut(z)) {
            wall.remove_id(id);
            floor.remove_id(id);
        }
    }

    fn resize(&mut self, shape: GridShape) {
        tracing::debug!(
            old_height = self.shape.size_z,
            new_height = shape.size_z,
            "layer cache resized"
        );
        let mut fresh = Self::new(shape, self.options);
        for layer in self
            .walls
            .iter_mut()
            .chain(self.floors.iter_mut())
            .chain(self.interiors.iter_mut())
        {
            fresh.retired.extend(layer.take_mesh());
        }
        fresh.retired.append(&mut self.retired);
        *self = fresh;
    }

    fn stack(&self, kind: LayerKind) -> &[Layer] {
        match kind {
            LayerKind::Wall => &self.walls,
            LayerKind::Floor => &self.floors,
            LayerKind::Interior => &self.interiors,
        }
    }

    fn stack_mut(&mut self, kind: LayerKind) -> &mut Vec<Layer> {
        match kind {
            LayerKind::Wall => &mut self.walls,
            LayerKind::Floor => &mut self.floors,
            LayerKind::Interior => &mut self.interiors,
        }
    }
}
