//! Material registry: maps compact [`VoxelTypeId`] values to [`VoxelTypeDef`] metadata.
//!
//! The registry is built once at startup. Air is always ID 0 so that a
//! zero-initialized grid represents empty space.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Compact material identifier stored in every grid cell.
///
/// `0` is air; every other value is a solid material.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VoxelTypeId(pub u16);

impl VoxelTypeId {
    /// Empty space.
    pub const AIR: Self = Self(0);

    /// Returns `true` for air.
    pub fn is_air(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` for any non-air material.
    pub fn is_solid(self) -> bool {
        self.0 != 0
    }
}

/// Descriptor for a registered material.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VoxelTypeDef {
    /// Human-readable name (e.g. "stone", "dirt").
    pub name: String,
    /// Linear RGBA colour used for faces of this material.
    pub color: [f32; 4],
}

/// Errors that can occur during material registration.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A type with the same name has already been registered.
    #[error("duplicate voxel type name: {0}")]
    DuplicateName(String),
    /// All 65 535 material slots have been consumed.
    #[error("voxel type registry is full (max 65536 types)")]
    RegistryFull,
}

/// Colour returned for ids the registry does not know.
pub const FALLBACK_COLOR: [f32; 4] = [1.0, 0.0, 1.0, 1.0];

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Maps [`VoxelTypeId`] → [`VoxelTypeDef`] with O(1) lookup in both directions.
pub struct VoxelTypeRegistry {
    /// Dense array where `index == VoxelTypeId.0`.
    types: Vec<VoxelTypeDef>,
    /// Reverse lookup: name → ID.
    name_to_id: HashMap<String, VoxelTypeId>,
}

impl VoxelTypeRegistry {
    /// Creates a new registry with air pre-registered as ID 0.
    pub fn new() -> Self {
        let air = VoxelTypeDef {
            name: "air".to_string(),
            color: [0.0, 0.0, 0.0, 0.0],
        };

        let mut name_to_id = HashMap::new();
        name_to_id.insert("air".to_string(), VoxelTypeId::AIR);

        Self {
            types: vec![air],
            name_to_id,
        }
    }

    /// Registers a new material and returns its assigned ID.
    ///
    /// IDs are assigned sequentially starting from 1.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateName`] if a type with the same name
    /// already exists, or [`RegistryError::RegistryFull`] once every slot is used.
    pub fn register(&mut self, def: VoxelTypeDef) -> Result<VoxelTypeId, RegistryError> {
        if self.name_to_id.contains_key(&def.name) {
            return Err(RegistryError::DuplicateName(def.name));
        }
        if self.types.len() > u16::MAX as usize {
            return Err(RegistryError::RegistryFull);
        }

        let id = VoxelTypeId(self.types.len() as u16);
        self.name_to_id.insert(def.name.clone(), id);
        self.types.push(def);
        Ok(id)
    }

    /// Returns the definition for an ID, or `None` if it was never registered.
    pub fn get(&self, id: VoxelTypeId) -> Option<&VoxelTypeDef> {
        self.types.get(id.0 as usize)
    }

    /// Returns the face colour for an ID, falling back to [`FALLBACK_COLOR`].
    pub fn color(&self, id: VoxelTypeId) -> [f32; 4] {
        self.get(id).map_or(FALLBACK_COLOR, |def| def.color)
    }

    /// Returns the ID for a named material, or `None` if not found.
    pub fn lookup_by_name(&self, name: &str) -> Option<VoxelTypeId> {
        self.name_to_id.get(name).copied()
    }

    /// Returns the total number of registered types (including air).
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns `true` if only air is registered.
    pub fn is_empty(&self) -> bool {
        self.types.len() <= 1
    }
}

impl Default for VoxelTypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
