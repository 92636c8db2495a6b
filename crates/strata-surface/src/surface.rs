//! The per-voxel surface descriptor and its face geometry.
//!
//! A [`Surface`] describes an air voxel that borders at least one solid voxel:
//! which neighbour material sits on each of its six sides, and a coarse
//! [`SurfaceShape`]. Triangles are generated on demand from `(Surface,
//! direction)` alone, so the same descriptor serves layer meshing and ray
//! picking without any cached state.

use glam::{UVec3, Vec3};
use strata_voxel::{FaceDirection, VoxelGridAccess, VoxelId, VoxelTypeId};

use crate::exposed_faces::ExposedFaces;

/// Coarse classification of a surface voxel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SurfaceShape {
    /// No solid neighbour; never stored in the index.
    #[default]
    None = 0,
    /// Exposed sides and/or ceiling.
    Generic = 1,
    /// Solid ground underneath. Takes precedence over [`SurfaceShape::Generic`].
    Floor = 2,
}

impl SurfaceShape {
    /// Derives the shape from a face array indexed by [`FaceDirection::index`].
    pub fn from_faces(faces: &[VoxelTypeId; 6]) -> Self {
        if faces[FaceDirection::FLOOR.index()].is_solid() {
            Self::Floor
        } else if faces.iter().any(|f| f.is_solid()) {
            Self::Generic
        } else {
            Self::None
        }
    }
}

/// A triangle with three vertices.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Triangle {
    /// Vertices in winding order.
    pub vertices: [Vec3; 3],
}

impl Triangle {
    /// Creates a triangle from three vertices.
    pub fn new(a: Vec3, b: Vec3, c: Vec3) -> Self {
        Self {
            vertices: [a, b, c],
        }
    }

    /// Geometric normal following the vertex winding (zero for degenerate triangles).
    pub fn normal(&self) -> Vec3 {
        let [a, b, c] = self.vertices;
        (b - a).cross(c - a).normalize_or_zero()
    }

    /// Returns the triangle moved by `offset`.
    pub fn translated(&self, offset: Vec3) -> Self {
        let [a, b, c] = self.vertices;
        Self::new(a + offset, b + offset, c + offset)
    }

    /// Returns the triangle scaled component-wise by `scale`.
    pub fn scaled(&self, scale: Vec3) -> Self {
        let [a, b, c] = self.vertices;
        Self::new(a * scale, b * scale, c * scale)
    }

    /// Two-sided Möller–Trumbore intersection.
    ///
    /// Returns the ray parameter `t >= 0` of the hit, if any. `direction` does
    /// not need to be normalized; `t` is expressed in multiples of it.
    pub fn intersect(&self, origin: Vec3, direction: Vec3) -> Option<f32> {
        const EPSILON: f32 = 1e-7;
        let [a, b, c] = self.vertices;
        let edge1 = b - a;
        let edge2 = c - a;
        let p = direction.cross(edge2);
        let det = edge1.dot(p);
        if det.abs() < EPSILON {
            return None;
        }
        let inv_det = 1.0 / det;
        let s = origin - a;
        let u = s.dot(p) * inv_det;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }
        let q = s.cross(edge1);
        let v = direction.dot(q) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }
        let t = edge2.dot(q) * inv_det;
        (t >= 0.0).then_some(t)
    }
}

/// Face and shape descriptor of one boundary air voxel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Surface {
    /// Packed id of the voxel.
    pub id: VoxelId,
    /// Grid coordinate of the voxel.
    pub position: UVec3,
    /// Neighbour material per direction, indexed by [`FaceDirection::index`].
    /// Air means there is no face on that side.
    pub faces: [VoxelTypeId; 6],
    /// Shape derived from `faces`.
    pub shape: SurfaceShape,
}

impl Surface {
    /// Samples the six neighbours of `position` and classifies the voxel.
    ///
    /// Out-of-range neighbours read as air. The voxel's own material is not
    /// consulted: callers only classify air voxels.
    pub fn classify<G: VoxelGridAccess>(grid: &G, position: UVec3) -> Self {
        let pos = position.as_ivec3();
        let mut faces = [VoxelTypeId::AIR; 6];
        for dir in FaceDirection::ALL {
            faces[dir.index()] = grid.get(dir.offset(pos));
        }
        Self {
            id: grid.shape().pack(position),
            position,
            faces,
            shape: SurfaceShape::from_faces(&faces),
        }
    }

    /// Returns `true` unless the shape is [`SurfaceShape::None`].
    pub fn is_surface(&self) -> bool {
        self.shape != SurfaceShape::None
    }

    /// Neighbour material in `direction`.
    pub fn face(&self, direction: FaceDirection) -> VoxelTypeId {
        self.faces[direction.index()]
    }

    /// Directions with a solid neighbour.
    pub fn exposed_faces(&self) -> ExposedFaces {
        ExposedFaces::from_fn(|dir| self.face(dir).is_solid())
    }

    /// Triangles in voxel-local unit-cube space covering the face in `direction`.
    ///
    /// Empty when that side has no solid neighbour. The triangles wind
    /// counter-clockwise as seen from inside the voxel, which is where a
    /// viewer looking at the solid neighbour stands.
    pub fn face_triangles(&self, direction: FaceDirection) -> Vec<Triangle> {
        if self.face(direction).is_air() {
            return Vec::new();
        }
        face_quad(direction).to_vec()
    }

    /// Translates voxel-local triangles to grid space by adding this voxel's position.
    ///
    /// Multiply by the grid's world units per voxel to reach world space.
    pub fn to_world_space(&self, triangles: &[Triangle]) -> Vec<Triangle> {
        let offset = self.position.as_vec3();
        triangles.iter().map(|t| t.translated(offset)).collect()
    }
}

/// The two triangles covering the unit-cube side facing `direction`, wound
/// to face the inside of the cube.
pub fn face_quad(direction: FaceDirection) -> [Triangle; 2] {
    let step = direction.step();
    let axis = if step.x != 0 {
        0
    } else if step.y != 0 {
        1
    } else {
        2
    };
    let plane = if step[axis] > 0 { 1.0 } else { 0.0 };
    let u_axis = (axis + 1) % 3;
    let v_axis = (axis + 2) % 3;

    let corners = [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)].map(|(u, v)| {
        let mut p = Vec3::ZERO;
        p[axis] = plane;
        p[u_axis] = u;
        p[v_axis] = v;
        p
    });

    let mut quad = [
        Triangle::new(corners[0], corners[1], corners[2]),
        Triangle::new(corners[0], corners[2], corners[3]),
    ];
    // Face the interior of the voxel.
    let inward = -direction.normal();
    for tri in &mut quad {
        if tri.normal().dot(inward) < 0.0 {
            tri.vertices.swap(1, 2);
        }
    }
    quad
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::IVec3;
    use strata_voxel::{GridShape, VoxelGrid};

    fn grid_with(solids: &[IVec3]) -> VoxelGrid {
        let mut grid = VoxelGrid::new(GridShape::new(4, 4, 4));
        for &p in solids {
            grid.set(p, VoxelTypeId(1));
        }
        grid
    }

    #[test]
    fn test_isolated_air_has_no_shape() {
        let grid = grid_with(&[]);
        let s = Surface::classify(&grid, UVec3::new(2, 2, 2));
        assert_eq!(s.shape, SurfaceShape::None);
        assert!(!s.is_surface());
        assert_eq!(s.exposed_faces(), ExposedFaces::NONE);
    }

    #[test]
    fn test_side_neighbour_is_generic() {
        let grid = grid_with(&[IVec3::new(3, 2, 2)]);
        let s = Surface::classify(&grid, UVec3::new(2, 2, 2));
        assert_eq!(s.shape, SurfaceShape::Generic);
        assert_eq!(s.face(FaceDirection::PosX), VoxelTypeId(1));
    }

    #[test]
    fn test_ceiling_only_is_generic() {
        let grid = grid_with(&[IVec3::new(2, 2, 3)]);
        let s = Surface::classify(&grid, UVec3::new(2, 2, 2));
        assert_eq!(s.shape, SurfaceShape::Generic);
    }

    #[test]
    fn test_floor_takes_precedence() {
        let grid = grid_with(&[IVec3::new(2, 2, 1), IVec3::new(1, 2, 2)]);
        let s = Surface::classify(&grid, UVec3::new(2, 2, 2));
        assert_eq!(s.shape, SurfaceShape::Floor);
        assert_eq!(s.exposed_faces().len(), 2);
    }

    #[test]
    fn test_grid_border_reads_as_air() {
        let grid = grid_with(&[]);
        let s = Surface::classify(&grid, UVec3::new(0, 0, 0));
        assert_eq!(s.faces, [VoxelTypeId::AIR; 6]);
    }

    #[test]
    fn test_face_triangles_only_for_exposed_directions() {
        let grid = grid_with(&[IVec3::new(2, 2, 1)]);
        let s = Surface::classify(&grid, UVec3::new(2, 2, 2));
        assert_eq!(s.face_triangles(FaceDirection::NegZ).len(), 2);
        for dir in FaceDirection::ALL {
            if dir != FaceDirection::NegZ {
                assert!(s.face_triangles(dir).is_empty());
            }
        }
    }

    #[test]
    fn test_face_quads_lie_on_their_side_and_face_inward() {
        for dir in FaceDirection::ALL {
            let step = dir.step().as_vec3();
            let plane = if step.max_element() > 0.0 { 1.0 } else { 0.0 };
            for tri in face_quad(dir) {
                for v in tri.vertices {
                    let along = v.dot(step.abs());
                    assert_eq!(along, plane, "{dir:?} vertex {v:?} off its plane");
                }
                assert!(tri.normal().dot(-dir.normal()) > 0.99, "{dir:?} winds outward");
            }
        }
    }

    #[test]
    fn test_to_world_space_adds_position() {
        let grid = grid_with(&[IVec3::new(1, 1, 0)]);
        let s = Surface::classify(&grid, UVec3::new(1, 1, 1));
        let world = s.to_world_space(&s.face_triangles(FaceDirection::NegZ));
        for tri in &world {
            for v in tri.vertices {
                assert_eq!(v.z, 1.0);
                assert!((1.0..=2.0).contains(&v.x));
                assert!((1.0..=2.0).contains(&v.y));
            }
        }
        let scaled = world[0].scaled(Vec3::new(2.0, 2.0, 0.5));
        assert_eq!(scaled.vertices[0].z, 0.5);
    }

    #[test]
    fn test_triangle_intersection() {
        let tri = Triangle::new(Vec3::ZERO, Vec3::X, Vec3::Y);
        let t = tri.intersect(Vec3::new(0.25, 0.25, 1.0), Vec3::NEG_Z);
        assert_eq!(t, Some(1.0));
        // Two-sided: hit from underneath too.
        assert!(tri.intersect(Vec3::new(0.25, 0.25, -1.0), Vec3::Z).is_some());
        assert!(tri.intersect(Vec3::new(0.9, 0.9, 1.0), Vec3::NEG_Z).is_none());
        assert!(tri.intersect(Vec3::new(0.25, 0.25, 1.0), Vec3::Z).is_none());
    }
}
