//! End-to-end terrain flow: grid edits through the surface index and layer
//! cache to recorded draw calls.

use glam::{IVec3, UVec3};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;
use strata_mesh::{LayerKey, LayerKind, LayerOptions, RecordingBackend, TerrainPipeline};
use strata_surface::SurfaceShape;
use strata_voxel::{
    FaceDirection, GridShape, VoxelEventBuffer, VoxelGrid, VoxelGridAccess, VoxelTypeDef,
    VoxelTypeId, VoxelTypeRegistry, load_level, set_voxel,
};

struct World {
    grid: VoxelGrid,
    events: VoxelEventBuffer,
    registry: VoxelTypeRegistry,
    pipeline: TerrainPipeline,
    backend: RecordingBackend,
    stone: VoxelTypeId,
}

impl World {
    fn new(shape: GridShape, options: LayerOptions) -> Self {
        let mut registry = VoxelTypeRegistry::new();
        let stone = registry
            .register(VoxelTypeDef {
                name: "stone".into(),
                color: [0.5, 0.5, 0.5, 1.0],
            })
            .expect("register stone");
        Self {
            grid: VoxelGrid::new(shape),
            events: VoxelEventBuffer::new(),
            registry,
            pipeline: TerrainPipeline::new(shape, options),
            backend: RecordingBackend::new(),
            stone,
        }
    }

    fn load(&mut self, level: VoxelGrid) {
        load_level(&mut self.grid, level, &mut self.events);
        self.frame();
    }

    fn edit(&mut self, pos: IVec3, ty: VoxelTypeId) -> bool {
        set_voxel(&mut self.grid, pos, ty, &mut self.events)
    }

    fn frame(&mut self) {
        self.pipeline.process(&self.grid, &self.events);
        self.events.swap();
    }

    fn draw(&mut self) -> Vec<LayerKey> {
        self.pipeline
            .draw(&self.grid, &self.registry, &mut self.backend);
        self.backend.take_draws()
    }

    fn id(&self, x: u32, y: u32, z: u32) -> strata_voxel::VoxelId {
        self.grid.shape().pack(UVec3::new(x, y, z))
    }
}

fn scenario_a(world: &mut World) {
    let mut level = VoxelGrid::new(world.grid.shape());
    level.set(IVec3::new(1, 1, 0), world.stone);
    world.load(level);
}

#[test]
fn test_scenario_a_through_pipeline() {
    let mut world = World::new(GridShape::new(4, 4, 4), LayerOptions::default());
    scenario_a(&mut world);

    let above = world.id(1, 1, 1);
    let surface = world.pipeline.index().get(above).expect("surface above the solid");
    assert_eq!(surface.shape, SurfaceShape::Floor);
    assert_eq!(surface.face(FaceDirection::NegZ), world.stone);
    assert_eq!(world.pipeline.index().len(), 5);

    let layers = world.pipeline.layers();
    assert!(layers.layer(LayerKey::floor(1)).expect("floor 1").contains(above));
    assert_eq!(layers.layer(LayerKey::wall(0)).expect("wall 0").members().count(), 4);

    world.draw();
    let floor = world
        .backend
        .mesh_for(LayerKey::floor(1))
        .expect("floor above the solid uploaded");
    assert_eq!(floor.triangle_count(), 2);
    assert!(floor.vertices.iter().all(|v| v.color == [0.5, 0.5, 0.5, 1.0]));
}

#[test]
fn test_scenario_b_through_pipeline() {
    let mut world = World::new(GridShape::new(4, 4, 4), LayerOptions::default());
    scenario_a(&mut world);
    world.draw();
    assert!(world.backend.live_count() > 0);

    assert!(world.edit(IVec3::new(1, 1, 0), VoxelTypeId::AIR));
    world.frame();

    assert!(world.pipeline.index().is_empty());
    assert!(world.pipeline.layers().layers().all(|l| l.members().count() == 0));

    let drawn = world.draw();
    assert_eq!(world.backend.live_count(), 0, "every stale upload was released");
    assert!(drawn.is_empty());
}

#[test]
fn test_scenario_c_draw_order() {
    let options = LayerOptions {
        draw_grid_bottom: true,
    };
    let mut world = World::new(GridShape::new(4, 4, 4), options);
    // Staircase descending along x: column x has height 3 - x.
    let mut level = VoxelGrid::new(world.grid.shape());
    for x in 0..3 {
        level.fill_box(IVec3::new(x, 0, 0), IVec3::new(x, 3, 2 - x), world.stone);
    }
    world.load(level);

    assert_eq!(world.pipeline.set_top(2), 2);
    let drawn = world.draw();
    assert_eq!(
        drawn,
        vec![
            LayerKey::wall(0),
            LayerKey::floor(0),
            LayerKey::wall(1),
            LayerKey::floor(1),
            LayerKey::floor(2),
            LayerKey::interior(2),
        ]
    );

    let layers = world.pipeline.layers();
    for z in 0..2 {
        assert!(!layers.layer(LayerKey::wall(z)).expect("wall").is_dirty());
    }
    for z in 0..3 {
        assert!(!layers.layer(LayerKey::floor(z)).expect("floor").is_dirty());
    }
    assert!(layers.layer(LayerKey::wall(2)).expect("wall 2").is_dirty());
    assert!(layers.layer(LayerKey::wall(3)).expect("wall 3").is_dirty());
    assert!(layers.layer(LayerKey::interior(1)).expect("interior 1").is_dirty());
}

#[test]
fn test_cut_hides_everything_above() {
    let mut world = World::new(GridShape::new(5, 5, 5), LayerOptions::default());
    let mut level = VoxelGrid::new(world.grid.shape());
    level.fill_box(IVec3::ZERO, IVec3::new(4, 4, 1), world.stone);
    level.fill_box(IVec3::new(2, 2, 2), IVec3::new(2, 2, 3), world.stone);
    world.load(level);

    world.pipeline.set_top(1);
    let drawn = world.draw();
    assert!(drawn.iter().all(|k| k.height <= 1));
    assert!(drawn.contains(&LayerKey::interior(1)));
    assert!(!drawn.contains(&LayerKey::wall(1)));

    world.pipeline.set_top(5);
    let drawn = world.draw();
    assert!(drawn.iter().all(|k| k.kind != LayerKind::Interior));
    assert!(drawn.contains(&LayerKey::wall(3)));
}

#[test]
fn test_overhang_leaves_cut_plane_open() {
    let mut world = World::new(GridShape::new(4, 4, 4), LayerOptions::default());
    let mut level = VoxelGrid::new(world.grid.shape());
    level.set(IVec3::new(1, 1, 2), world.stone);
    world.load(level);

    let under = world.id(1, 1, 1);
    let wall = world.pipeline.layers().layer(LayerKey::wall(1)).expect("wall 1");
    assert!(wall.contains(under), "the cavity under the overhang is a surface");

    world.pipeline.set_top(2);
    let drawn = world.draw();
    assert!(!drawn.contains(&LayerKey::wall(1)));
    assert!(world.backend.mesh_for(LayerKey::wall(1)).is_none());
    let wall = world.pipeline.layers().layer(LayerKey::wall(1)).expect("wall 1");
    assert!(!wall.is_dirty());
    assert_eq!(wall.face_count(), 0);
}

#[test]
fn test_grid_bottom_option_draws_base() {
    let options = LayerOptions {
        draw_grid_bottom: true,
    };
    let mut world = World::new(GridShape::new(4, 4, 4), options);
    scenario_a(&mut world);

    world.pipeline.set_top(0);
    let drawn = world.draw();
    assert_eq!(drawn, vec![LayerKey::floor(0), LayerKey::interior(0)]);
    let interior = world
        .pipeline
        .layers()
        .layer(LayerKey::interior(0))
        .expect("interior 0");
    assert_eq!(interior.face_count(), 1);
    assert_eq!(interior.line_count(), 2);
}

#[test]
fn test_layers_converge_to_fresh_pipeline() {
    let mut rng = Xoshiro256StarStar::seed_from_u64(11);
    let shape = GridShape::new(6, 6, 5);
    let mut world = World::new(shape, LayerOptions::default());
    let mut level = VoxelGrid::new(shape);
    level.fill_box(IVec3::ZERO, IVec3::new(5, 5, 1), world.stone);
    world.load(level);

    for round in 0..20 {
        for _ in 0..10 {
            let pos = IVec3::new(
                rng.gen_range(0..shape.size_x as i32),
                rng.gen_range(0..shape.size_y as i32),
                rng.gen_range(0..shape.size_z as i32),
            );
            let ty = if rng.gen_bool(0.5) { world.stone } else { VoxelTypeId::AIR };
            world.edit(pos, ty);
        }
        world.frame();
        world.pipeline.set_top(round % (shape.size_z + 1));
        world.draw();
    }

    let mut fresh = World::new(shape, LayerOptions::default());
    fresh.load(world.grid.clone());

    assert_eq!(
        world.pipeline.index().len(),
        fresh.pipeline.index().len(),
        "surface count diverged"
    );
    for surface in fresh.pipeline.index().iter() {
        assert_eq!(world.pipeline.index().get(surface.id), Some(surface));
    }
    for layer in fresh.pipeline.layers().layers() {
        let ours = world.pipeline.layers().layer(layer.key()).expect("same heights");
        assert!(
            ours.members().eq(layer.members()),
            "membership diverged at {:?}",
            layer.key()
        );
    }

    world.pipeline.set_top(shape.size_z);
    fresh.pipeline.set_top(shape.size_z);
    world.draw();
    fresh.draw();
    for layer in fresh.pipeline.layers().layers() {
        if layer.key().kind == LayerKind::Interior {
            continue;
        }
        let ours = world.pipeline.layers().layer(layer.key()).expect("same heights");
        assert_eq!(ours.face_count(), layer.face_count(), "geometry diverged at {:?}", layer.key());
    }
}

#[test]
fn test_every_rebuild_uploads_then_drops_cpu_copy() {
    let mut world = World::new(GridShape::new(4, 4, 4), LayerOptions::default());
    scenario_a(&mut world);
    world.draw();

    let non_empty = world
        .pipeline
        .layers()
        .layers()
        .filter(|l| !l.is_empty())
        .count();
    assert_eq!(world.backend.live_count(), non_empty);
    assert_eq!(world.backend.upload_count(), non_empty);

    world.edit(IVec3::new(2, 2, 0), world.stone);
    world.frame();
    world.draw();
    assert_eq!(
        world.backend.upload_count() - world.backend.release_count(),
        world.backend.live_count()
    );
    let non_empty = world
        .pipeline
        .layers()
        .layers()
        .filter(|l| !l.is_empty())
        .count();
    assert_eq!(world.backend.live_count(), non_empty);

    world.pipeline.release(&mut world.backend);
    assert_eq!(world.backend.live_count(), 0);
}
