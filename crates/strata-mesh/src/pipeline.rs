//! Edit-to-draw wiring: voxel events flow into the surface index, its diffs
//! flow into the layer cache, and drawing rebuilds whatever went stale.

use strata_surface::SurfaceIndex;
use strata_voxel::{GridShape, VoxelEvent, VoxelEventBuffer, VoxelGridAccess, VoxelTypeRegistry};

use crate::backend::RenderBackend;
use crate::layer::{LayerOptions, LayerSource};
use crate::layer_cache::LayerCache;

/// Owns the derived terrain caches for one grid.
#[derive(Debug)]
pub struct TerrainPipeline {
    index: SurfaceIndex,
    layers: LayerCache,
    top: u32,
}

impl TerrainPipeline {
    /// Creates empty caches for `shape`, cut at full height.
    ///
    /// The caches stay empty until a [`VoxelEvent::NewLevel`] is applied.
    pub fn new(shape: GridShape, options: LayerOptions) -> Self {
        Self {
            index: SurfaceIndex::new(shape),
            layers: LayerCache::new(shape, options),
            top: shape.size_z,
        }
    }

    /// Applies every event written to `events` since its last swap.
    ///
    /// Returns the number of events applied.
    pub fn process<G: VoxelGridAccess>(&mut self, grid: &G, events: &VoxelEventBuffer) -> usize {
        let mut applied = 0;
        for event in events.read_current() {
            self.apply(grid, event);
            applied += 1;
        }
        if applied > 0 {
            tracing::trace!(events = applied, dirty = self.layers.dirty_count(), "terrain events processed");
        }
        applied
    }

    /// Applies one voxel event. `grid` must already reflect the edit.
    pub fn apply<G: VoxelGridAccess>(&mut self, grid: &G, event: &VoxelEvent) {
        let surface_event = self.index.handle_voxel_event(grid, event);
        if matches!(event, VoxelEvent::NewLevel) {
            // Resize before the interiors are marked so the new heights exist.
            self.layers.apply_surface_event(&surface_event, &self.index);
            self.layers.apply_voxel_event(event);
            self.top = self.top.min(self.index.shape().size_z);
        } else {
            self.layers.apply_voxel_event(event);
            self.layers.apply_surface_event(&surface_event, &self.index);
        }
    }

    /// Draws the terrain cut at the current height.
    ///
    /// Returns the number of layers visited.
    pub fn draw<G, B>(&mut self, grid: &G, registry: &VoxelTypeRegistry, backend: &mut B) -> usize
    where
        G: VoxelGridAccess,
        B: RenderBackend + ?Sized,
    {
        let src = LayerSource {
            index: &self.index,
            grid,
            registry,
            options: self.layers.options(),
        };
        self.layers.draw_slice(self.top, &src, backend)
    }

    /// Sets the cut height, clamped to the grid height. Returns the applied value.
    pub fn set_top(&mut self, top: u32) -> u32 {
        self.top = top.min(self.index.shape().size_z);
        self.top
    }

    /// Current cut height.
    pub fn top(&self) -> u32 {
        self.top
    }

    /// The surface index kept in sync with the grid.
    pub fn index(&self) -> &SurfaceIndex {
        &self.index
    }

    /// The per-height layer cache.
    pub fn layers(&self) -> &LayerCache {
        &self.layers
    }

    /// Frees every upload held by the layer cache.
    pub fn release<B: RenderBackend + ?Sized>(&mut self, backend: &mut B) {
        self.layers.release_all(backend);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::RecordingBackend;
    use crate::layer::LayerKey;
    use glam::IVec3;
    use strata_voxel::{VoxelGrid, VoxelTypeId, load_level, set_voxel};

    fn loaded(shape: GridShape) -> (VoxelGrid, VoxelEventBuffer, TerrainPipeline) {
        let mut grid = VoxelGrid::new(shape);
        let mut events = VoxelEventBuffer::new();
        let mut level = VoxelGrid::new(shape);
        level.fill_box(IVec3::ZERO, IVec3::new(3, 3, 0), VoxelTypeId(1));
        load_level(&mut grid, level, &mut events);

        let mut pipeline = TerrainPipeline::new(shape, LayerOptions::default());
        assert_eq!(pipeline.process(&grid, &events), 1);
        events.swap();
        (grid, events, pipeline)
    }

    #[test]
    fn test_new_pipeline_cuts_at_full_height() {
        let pipeline = TerrainPipeline::new(GridShape::new(4, 4, 5), LayerOptions::default());
        assert_eq!(pipeline.top(), 5);
        assert!(pipeline.index().is_empty());
    }

    #[test]
    fn test_set_top_clamps() {
        let (_, _, mut pipeline) = loaded(GridShape::new(4, 4, 4));
        assert_eq!(pipeline.set_top(9), 4);
        assert_eq!(pipeline.set_top(1), 1);
        assert_eq!(pipeline.top(), 1);
    }

    #[test]
    fn test_process_reads_only_current_frame() {
        let (mut grid, mut events, mut pipeline) = loaded(GridShape::new(4, 4, 4));
        assert_eq!(pipeline.process(&grid, &events), 0);

        assert!(set_voxel(&mut grid, IVec3::new(1, 1, 1), VoxelTypeId(1), &mut events));
        assert_eq!(pipeline.process(&grid, &events), 1);
        events.swap();
        assert_eq!(pipeline.process(&grid, &events), 0);
    }

    #[test]
    fn test_edit_then_draw_rebuilds_touched_layers_once() {
        let (mut grid, mut events, mut pipeline) = loaded(GridShape::new(4, 4, 4));
        let registry = VoxelTypeRegistry::new();
        let mut backend = RecordingBackend::new();
        pipeline.draw(&grid, &registry, &mut backend);
        assert_eq!(pipeline.layers().dirty_count(), 4, "interiors are not drawn at full height");

        let rebuilds_before = pipeline
            .layers()
            .layer(LayerKey::wall(2))
            .map(|l| l.rebuild_count());
        set_voxel(&mut grid, IVec3::new(2, 2, 1), VoxelTypeId(1), &mut events);
        set_voxel(&mut grid, IVec3::new(2, 1, 1), VoxelTypeId(1), &mut events);
        pipeline.process(&grid, &events);
        events.swap();

        pipeline.draw(&grid, &registry, &mut backend);
        let wall = pipeline.layers().layer(LayerKey::wall(2)).expect("wall 2");
        assert_eq!(Some(wall.rebuild_count()), rebuilds_before.map(|n| n + 1));
        assert!(!wall.is_dirty());
    }

    #[test]
    fn test_new_level_of_smaller_grid_clamps_top() {
        let (mut grid, mut events, mut pipeline) = loaded(GridShape::new(4, 4, 6));
        assert_eq!(pipeline.top(), 6);

        load_level(&mut grid, VoxelGrid::new(GridShape::new(4, 4, 3)), &mut events);
        pipeline.process(&grid, &events);
        assert_eq!(pipeline.top(), 3);
        assert_eq!(pipeline.layers().height(), 3);
        assert_eq!(pipeline.layers().dirty_count(), 9);
    }
}
