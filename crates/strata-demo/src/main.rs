//! Headless demo of layered terrain cross-sections.
//!
//! Generates a seeded heightmap, replays random dig/place edits through the
//! terrain pipeline, sweeps the cut height and reports what each cut draws.
//! Configuration is loaded from `config.ron` and can be overridden via CLI flags:
//! `cargo run -p strata-demo -- --size-z 24 --top 6 --seed 7`.

mod error;
mod terrain;

use std::process::ExitCode;

use clap::Parser;
use glam::Vec3;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;
use strata_config::{CliArgs, Config, default_config_dir};
use strata_mesh::{LayerOptions, RecordingBackend, TerrainPipeline};
use strata_surface::{SurfaceRay, pick};
use strata_voxel::{
    GridShape, VoxelEventBuffer, VoxelGrid, VoxelGridAccess, VoxelTypeRegistry, load_level,
    set_voxel,
};
use tracing::{info, warn};

use crate::error::DemoError;
use crate::terrain::Materials;

/// Edits applied between two drawn frames.
const EDITS_PER_FRAME: u32 = 8;

struct Demo {
    grid: VoxelGrid,
    events: VoxelEventBuffer,
    registry: VoxelTypeRegistry,
    materials: Materials,
    pipeline: TerrainPipeline,
    backend: RecordingBackend,
}

impl Demo {
    fn new(config: &Config) -> Result<Self, DemoError> {
        let shape = GridShape::new(config.grid.size_x, config.grid.size_y, config.grid.size_z);
        let mut registry = VoxelTypeRegistry::new();
        let materials = terrain::register_materials(&mut registry)?;
        let options = LayerOptions {
            draw_grid_bottom: config.slice.draw_grid_bottom,
        };
        Ok(Self {
            grid: VoxelGrid::new(shape),
            events: VoxelEventBuffer::new(),
            registry,
            materials,
            pipeline: TerrainPipeline::new(shape, options),
            backend: RecordingBackend::new(),
        })
    }

    /// Processes pending edits and draws one frame. Returns the layers drawn.
    fn frame(&mut self) -> usize {
        self.pipeline.process(&self.grid, &self.events);
        self.events.swap();
        self.pipeline
            .draw(&self.grid, &self.registry, &mut self.backend);
        self.backend.take_draws().len()
    }
}

/// Backend accounting at the end of a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct RunStats {
    uploads: usize,
    releases: usize,
    live: usize,
}

fn run(config: &Config) -> Result<RunStats, DemoError> {
    let mut demo = Demo::new(config)?;
    let mut rng = Xoshiro256StarStar::seed_from_u64(config.terrain.seed);

    let level = terrain::generate(
        demo.grid.shape(),
        Vec3::from_array(config.grid.scale),
        &config.terrain,
        demo.materials,
    );
    load_level(&mut demo.grid, level, &mut demo.events);
    if let Some(top) = config.slice.initial_top {
        demo.pipeline.set_top(top);
    }
    let drawn = demo.frame();
    info!(
        solids = demo.grid.solid_count(),
        surfaces = demo.pipeline.index().len(),
        secondary = demo.pipeline.index().secondary().len(),
        layers_drawn = drawn,
        triangles = demo.backend.triangle_count(),
        top = demo.pipeline.top(),
        "terrain loaded"
    );

    replay_edits(&mut demo, &mut rng, config.terrain.edits);
    sweep_cut(&mut demo);
    pick_from_above(&demo);

    demo.pipeline.release(&mut demo.backend);
    let stats = RunStats {
        uploads: demo.backend.upload_count(),
        releases: demo.backend.release_count(),
        live: demo.backend.live_count(),
    };
    info!(
        uploads = stats.uploads,
        releases = stats.releases,
        live = stats.live,
        "demo finished"
    );
    Ok(stats)
}

fn replay_edits(demo: &mut Demo, rng: &mut Xoshiro256StarStar, edits: u32) {
    let mut applied = 0;
    let mut frames = 0;
    for i in 0..edits {
        let (pos, ty) = terrain::random_edit(rng, &demo.grid, demo.materials);
        if set_voxel(&mut demo.grid, pos, ty, &mut demo.events) {
            applied += 1;
        }
        if (i + 1) % EDITS_PER_FRAME == 0 || i + 1 == edits {
            let dirty = demo.pipeline.layers().dirty_count();
            demo.frame();
            frames += 1;
            tracing::debug!(frame = frames, dirty_before = dirty, "edit frame drawn");
        }
    }
    info!(
        requested = edits,
        applied,
        frames,
        surfaces = demo.pipeline.index().len(),
        "edits replayed"
    );
}

fn sweep_cut(demo: &mut Demo) {
    let size_z = demo.grid.shape().size_z;
    for top in (0..=size_z).rev() {
        demo.pipeline.set_top(top);
        let drawn = demo.frame();
        let hatched: usize = demo
            .pipeline
            .layers()
            .layer(strata_mesh::LayerKey::interior(top))
            .map_or(0, |l| l.face_count());
        info!(top, layers_drawn = drawn, hatched_cells = hatched, "cut drawn");
    }
    demo.pipeline.set_top(size_z);
}

fn pick_from_above(demo: &Demo) {
    let shape = demo.grid.shape();
    let ray = SurfaceRay {
        origin: Vec3::new(
            shape.size_x as f32 * 0.5,
            shape.size_y as f32 * 0.5,
            shape.size_z as f32 - 0.01,
        ),
        direction: Vec3::NEG_Z,
        max_distance: shape.size_z as f32,
    };
    match pick(demo.pipeline.index(), &ray) {
        Some(hit) => info!(
            voxel = ?shape.unpack(hit.id),
            face = ?hit.direction,
            distance = hit.distance,
            "picked surface below grid centre"
        ),
        None => warn!("no surface below grid centre"),
    }
}

fn main() -> ExitCode {
    let args = CliArgs::parse();

    let config_dir = args.config.clone().unwrap_or_else(default_config_dir);

    // Load or create config, then apply CLI overrides
    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);
    config.sanitize();

    let log_dir = strata_log::log_dir_for(&config, &config_dir);
    strata_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    match run(&config) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
