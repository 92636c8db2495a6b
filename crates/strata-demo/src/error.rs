//! Errors that abort the demo.

use strata_voxel::RegistryError;

#[derive(Debug, thiserror::Error)]
pub enum DemoError {
    #[error("failed to register materials: {0}")]
    Registry(#[from] RegistryError),
}
