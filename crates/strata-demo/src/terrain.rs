//! Noise heightmap terrain and random dig/place edits for the demo.

use glam::{IVec3, Vec3};
use noise::{NoiseFn, Simplex};
use rand::Rng;
use strata_config::TerrainConfig;
use strata_voxel::{
    GridShape, RegistryError, VoxelGrid, VoxelGridAccess, VoxelTypeDef, VoxelTypeId,
    VoxelTypeRegistry,
};

/// Material ids used by the generated terrain.
#[derive(Clone, Copy, Debug)]
pub struct Materials {
    pub stone: VoxelTypeId,
    pub dirt: VoxelTypeId,
    pub grass: VoxelTypeId,
}

/// Registers the terrain materials.
pub fn register_materials(registry: &mut VoxelTypeRegistry) -> Result<Materials, RegistryError> {
    let mut add = |name: &str, color: [f32; 4]| {
        registry.register(VoxelTypeDef {
            name: name.to_string(),
            color,
        })
    };
    Ok(Materials {
        stone: add("stone", [0.5, 0.5, 0.52, 1.0])?,
        dirt: add("dirt", [0.45, 0.32, 0.2, 1.0])?,
        grass: add("grass", [0.3, 0.6, 0.25, 1.0])?,
    })
}

/// Octaves composited per height sample.
const OCTAVES: u32 = 3;
/// Frequency of the broadest octave, in cycles per voxel.
const BASE_FREQUENCY: f64 = 0.08;

/// Builds a heightmap grid: stone, two rows of dirt, then a grass cap.
///
/// Column heights span `base_height ..= base_height + amplitude`, follow
/// fractal simplex noise seeded by `config.seed` and are clamped to the grid
/// height.
pub fn generate(
    shape: GridShape,
    scale: Vec3,
    config: &TerrainConfig,
    materials: Materials,
) -> VoxelGrid {
    let noise = Simplex::new(config.seed as u32);
    let mut grid = VoxelGrid::with_scale(shape, scale);
    for y in 0..shape.size_y {
        for x in 0..shape.size_x {
            let h = column_target(&noise, x, y, config).min(shape.size_z);
            for z in 0..h {
                let ty = if z + 1 == h {
                    materials.grass
                } else if z + 3 >= h {
                    materials.dirt
                } else {
                    materials.stone
                };
                grid.set(IVec3::new(x as i32, y as i32, z as i32), ty);
            }
        }
    }
    grid
}

/// fBm over simplex noise, mapped from `[-1, 1]` onto the configured height range.
fn column_target(noise: &Simplex, x: u32, y: u32, config: &TerrainConfig) -> u32 {
    let mut total = 0.0;
    let mut norm = 0.0;
    let mut frequency = BASE_FREQUENCY;
    let mut amplitude = 1.0;
    for _ in 0..OCTAVES {
        total += noise.get([x as f64 * frequency, y as f64 * frequency]) * amplitude;
        norm += amplitude;
        frequency *= 2.0;
        amplitude *= 0.5;
    }
    let unit = ((total / norm + 1.0) * 0.5).clamp(0.0, 1.0);
    config.base_height + (unit * config.amplitude as f64).round() as u32
}

/// Height of the topmost solid voxel plus one, or 0 for an empty column.
pub fn column_height<G: VoxelGridAccess>(grid: &G, x: i32, y: i32) -> u32 {
    (0..grid.shape().size_z)
        .rev()
        .find(|&z| grid.is_solid(IVec3::new(x, y, z as i32)))
        .map_or(0, |z| z + 1)
}

/// Picks a random column and either digs its top voxel or caps it with grass.
///
/// Returns the position and new material. Full columns are always dug and
/// empty ones always built on.
pub fn random_edit<R: Rng, G: VoxelGridAccess>(
    rng: &mut R,
    grid: &G,
    materials: Materials,
) -> (IVec3, VoxelTypeId) {
    let shape = grid.shape();
    let x = rng.gen_range(0..shape.size_x as i32);
    let y = rng.gen_range(0..shape.size_y as i32);
    let h = column_height(grid, x, y);

    let dig = h == shape.size_z || (h > 0 && rng.gen_bool(0.5));
    if dig {
        (IVec3::new(x, y, h as i32 - 1), VoxelTypeId::AIR)
    } else {
        (IVec3::new(x, y, h as i32), materials.grass)
    }
}
