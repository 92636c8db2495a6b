//! Compact set of the faces of a surface voxel that touch solid terrain.

use strata_voxel::FaceDirection;

/// Set of [`FaceDirection`]s, one bit per direction in [`FaceDirection::index`] order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ExposedFaces(u8);

impl ExposedFaces {
    /// No faces.
    pub const NONE: Self = Self(0);
    /// All six faces.
    pub const ALL: Self = Self(0b0011_1111);

    /// Collects the directions for which `f` returns `true`.
    pub fn from_fn(mut f: impl FnMut(FaceDirection) -> bool) -> Self {
        let mut mask = Self::NONE;
        for dir in FaceDirection::ALL {
            if f(dir) {
                mask.insert(dir);
            }
        }
        mask
    }

    /// Returns `true` if `dir` is in the set.
    pub fn contains(self, dir: FaceDirection) -> bool {
        self.0 & Self::bit(dir) != 0
    }

    /// Adds `dir`.
    pub fn insert(&mut self, dir: FaceDirection) {
        self.0 |= Self::bit(dir);
    }

    /// Removes `dir`.
    pub fn remove(&mut self, dir: FaceDirection) {
        self.0 &= !Self::bit(dir);
    }

    /// Number of directions in the set.
    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Returns `true` if no direction is in the set.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// The same set without the floor and ceiling directions.
    pub fn sides(self) -> Self {
        let mut sides = self;
        sides.remove(FaceDirection::FLOOR);
        sides.remove(FaceDirection::CEILING);
        sides
    }

    /// Iterates members in [`FaceDirection::ALL`] order.
    pub fn iter(self) -> impl Iterator<Item = FaceDirection> {
        FaceDirection::ALL
            .into_iter()
            .filter(move |&dir| self.contains(dir))
    }

    fn bit(dir: FaceDirection) -> u8 {
        1 << dir.index()
    }
}
