//! Bounded voxel grid, packed voxel ids, axis directions, edit events, and the
//! material registry consumed by surface extraction and layer meshing.

pub mod events;
pub mod face_direction;
pub mod grid;
pub mod registry;
pub mod shape;

pub use events::{VoxelEvent, VoxelEventBuffer, load_level, set_voxel};
pub use face_direction::FaceDirection;
pub use grid::{VoxelGrid, VoxelGridAccess};
pub use registry::{RegistryError, VoxelTypeDef, VoxelTypeId, VoxelTypeRegistry};
pub use shape::{GridShape, VoxelId};
