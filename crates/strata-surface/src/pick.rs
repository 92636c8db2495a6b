//! Ray picking against surface triangles.
//!
//! Walks the grid along the ray with a DDA (Amanatides & Woo) traversal and,
//! for every traversed voxel present in the [`SurfaceIndex`], intersects the
//! triangles of each exposed face. The first voxel that produces a hit yields
//! the nearest one, since a surface voxel's triangles lie on its own cell.

use glam::{IVec3, Vec3};
use strata_voxel::{FaceDirection, GridShape, VoxelId};

use crate::index::SurfaceIndex;

/// A ray in grid space (one unit per voxel).
#[derive(Clone, Copy, Debug)]
pub struct SurfaceRay {
    /// Ray origin in grid coordinates.
    pub origin: Vec3,
    /// Normalized direction.
    pub direction: Vec3,
    /// Maximum distance to search, in voxels.
    pub max_distance: f32,
}

/// The nearest surface triangle a ray hits.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceHit {
    /// Surface voxel that owns the triangle.
    pub id: VoxelId,
    /// Face the triangle belongs to.
    pub direction: FaceDirection,
    /// Distance from the ray origin, in voxels.
    pub distance: f32,
    /// Hit point in grid coordinates.
    pub point: Vec3,
}

/// Returns the nearest surface triangle hit by `ray`, if any within `max_distance`.
pub fn pick(index: &SurfaceIndex, ray: &SurfaceRay) -> Option<SurfaceHit> {
    let shape = index.shape();
    let dir = ray.direction;
    let mut voxel = ray.origin.floor().as_ivec3();

    let step = IVec3::new(
        if dir.x >= 0.0 { 1 } else { -1 },
        if dir.y >= 0.0 { 1 } else { -1 },
        if dir.z >= 0.0 { 1 } else { -1 },
    );
    let t_delta = Vec3::new(
        safe_inv(dir.x.abs()),
        safe_inv(dir.y.abs()),
        safe_inv(dir.z.abs()),
    );
    let sub = ray.origin - ray.origin.floor();
    let mut t_max = Vec3::new(
        initial_t_max(sub.x, dir.x, t_delta.x),
        initial_t_max(sub.y, dir.y, t_delta.y),
        initial_t_max(sub.z, dir.z, t_delta.z),
    );

    loop {
        if leaving_grid(voxel, step, dir, shape) {
            return None;
        }
        if let Some(id) = shape.try_pack(voxel)
            && let Some(hit) = nearest_in_voxel(index, id, ray)
        {
            return Some(hit);
        }

        let t = if t_max.x < t_max.y && t_max.x < t_max.z {
            voxel.x += step.x;
            let t = t_max.x;
            t_max.x += t_delta.x;
            t
        } else if t_max.y < t_max.z {
            voxel.y += step.y;
            let t = t_max.y;
            t_max.y += t_delta.y;
            t
        } else {
            voxel.z += step.z;
            let t = t_max.z;
            t_max.z += t_delta.z;
            t
        };

        if t > ray.max_distance {
            return None;
        }
    }
}

/// Tests every exposed face of one surface voxel, in direction order.
fn nearest_in_voxel(index: &SurfaceIndex, id: VoxelId, ray: &SurfaceRay) -> Option<SurfaceHit> {
    let surface = index.get(id)?;
    let mut best: Option<SurfaceHit> = None;
    for direction in surface.exposed_faces().iter() {
        let triangles = surface.to_world_space(&surface.face_triangles(direction));
        for tri in &triangles {
            let Some(t) = tri.intersect(ray.origin, ray.direction) else {
                continue;
            };
            if t > ray.max_distance || best.is_some_and(|b| b.distance <= t) {
                continue;
            }
            best = Some(SurfaceHit {
                id,
                direction,
                distance: t,
                point: ray.origin + ray.direction * t,
            });
        }
    }
    best
}

/// Returns `true` once `voxel` is outside the grid on an axis it can no longer
/// move back along. Bounds the walk even when `max_distance` is not finite.
fn leaving_grid(voxel: IVec3, step: IVec3, dir: Vec3, shape: GridShape) -> bool {
    let size = shape.size().as_ivec3();
    (0..3).any(|axis| {
        let v = voxel[axis];
        let below = v < 0;
        let above = v >= size[axis];
        (below || above)
            && (dir[axis] == 0.0 || (above && step[axis] > 0) || (below && step[axis] < 0))
    })
}

/// Safely compute 1.0 / x, clamping to `f32::MAX` when x ≈ 0.
fn safe_inv(x: f32) -> f32 {
    if x.abs() < f32::EPSILON {
        f32::MAX
    } else {
        1.0 / x
    }
}

/// Parametric distance to the first voxel boundary on one axis.
fn initial_t_max(sub: f32, dir_component: f32, t_delta: f32) -> f32 {
    if dir_component > 0.0 {
        (1.0 - sub) * t_delta
    } else if dir_component < 0.0 {
        sub * t_delta
    } else {
        f32::MAX
    }
}
