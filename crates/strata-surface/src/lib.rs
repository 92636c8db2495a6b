//! Surface extraction: classifies boundary air voxels, keeps the surface index
//! consistent under single-voxel edits, and builds per-face triangles for
//! meshing and ray picking.

pub mod exposed_faces;
pub mod index;
pub mod pick;
pub mod surface;

pub use exposed_faces::ExposedFaces;
pub use index::{LOCAL_SCAN_MAX, LOCAL_SCAN_MIN, SurfaceDiff, SurfaceEvent, SurfaceIndex};
pub use pick::{SurfaceHit, SurfaceRay, pick};
pub use surface::{Surface, SurfaceShape, Triangle, face_quad};
