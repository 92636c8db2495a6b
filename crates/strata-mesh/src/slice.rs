//! Draw-order policy for cutting the terrain at a height.
//!
//! Everything strictly below the cut draws in full. At the cut itself only
//! the floor and the interior cross-hatch draw, so the cut reads as a solid
//! plane; nothing above the cut draws.

use crate::layer::LayerKey;

/// Selects the layers to draw for a cut height.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SliceComposer {
    size_z: u32,
}

impl SliceComposer {
    /// Creates a composer for a grid `size_z` voxels tall.
    pub fn new(size_z: u32) -> Self {
        Self { size_z }
    }

    /// Clamps a cut height to `0..=size_z`.
    pub fn clamp_top(&self, top: u32) -> u32 {
        top.min(self.size_z)
    }

    /// Layer keys to draw, in order, for cut height `top`.
    ///
    /// `top` is clamped to `size_z`; at `size_z` the whole terrain draws and
    /// no cross-section is shown.
    pub fn compose(&self, top: u32) -> Vec<LayerKey> {
        let top = self.clamp_top(top);
        let mut keys = Vec::with_capacity(top as usize * 2 + 2);
        for i in 0..top {
            keys.push(LayerKey::wall(i));
            keys.push(LayerKey::floor(i));
        }
        if top < self.size_z {
            keys.push(LayerKey::floor(top));
            keys.push(LayerKey::interior(top));
        }
        keys
    }
}
