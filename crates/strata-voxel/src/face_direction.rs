//! The six axis directions between face-adjacent voxels.

use glam::{IVec3, Vec3};

/// One of the six axis directions a voxel face can point.
///
/// `Z` is height, so [`FaceDirection::NegZ`] is "below" and names the floor.
/// The `repr(u8)` discriminant doubles as the index into per-face arrays.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FaceDirection {
    /// +X direction.
    PosX = 0,
    /// −X direction.
    NegX = 1,
    /// +Y direction.
    PosY = 2,
    /// −Y direction.
    NegY = 3,
    /// +Z direction (up).
    PosZ = 4,
    /// −Z direction (down).
    NegZ = 5,
}

impl FaceDirection {
    /// All six directions in index order.
    pub const ALL: [FaceDirection; 6] = [
        Self::PosX,
        Self::NegX,
        Self::PosY,
        Self::NegY,
        Self::PosZ,
        Self::NegZ,
    ];

    /// The direction of the floor underneath a voxel.
    pub const FLOOR: FaceDirection = Self::NegZ;

    /// The direction of the ceiling above a voxel.
    pub const CEILING: FaceDirection = Self::PosZ;

    /// Returns the unit step towards the neighbour in this direction.
    pub fn step(self) -> IVec3 {
        match self {
            Self::PosX => IVec3::X,
            Self::NegX => IVec3::NEG_X,
            Self::PosY => IVec3::Y,
            Self::NegY => IVec3::NEG_Y,
            Self::PosZ => IVec3::Z,
            Self::NegZ => IVec3::NEG_Z,
        }
    }

    /// Returns the neighbour coordinate of `pos` in this direction.
    pub fn offset(self, pos: IVec3) -> IVec3 {
        pos + self.step()
    }

    /// Returns the unit normal for this direction.
    pub fn normal(self) -> Vec3 {
        self.step().as_vec3()
    }

    /// Returns the direction index (0–5).
    pub fn index(self) -> usize {
        self as usize
    }
}
