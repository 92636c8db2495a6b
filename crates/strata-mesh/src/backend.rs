//! The rendering seam: layers upload, release and draw geometry through
//! [`RenderBackend`]; the GPU side lives behind it.

use rustc_hash::FxHashMap;

use crate::buffer::MeshData;
use crate::layer::LayerKey;

/// Opaque handle to geometry held by a [`RenderBackend`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MeshHandle(pub u64);

/// Receives layer geometry.
pub trait RenderBackend {
    /// Copies `mesh` to the render side and returns a handle to it.
    fn upload(&mut self, key: LayerKey, mesh: &MeshData) -> MeshHandle;

    /// Frees geometry previously returned by [`upload`](Self::upload).
    fn release(&mut self, handle: MeshHandle);

    /// Issues the draw calls for uploaded geometry.
    fn draw(&mut self, handle: MeshHandle);
}

/// In-memory backend that keeps uploaded meshes and records every call.
///
/// Used headless and in tests in place of a GPU.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    next_handle: u64,
    meshes: FxHashMap<MeshHandle, (LayerKey, MeshData)>,
    uploads: usize,
    releases: usize,
    draws: Vec<LayerKey>,
}

impl RecordingBackend {
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total uploads so far.
    pub fn upload_count(&self) -> usize {
        self.uploads
    }

    /// Total releases so far.
    pub fn release_count(&self) -> usize {
        self.releases
    }

    /// Number of meshes currently held.
    pub fn live_count(&self) -> usize {
        self.meshes.len()
    }

    /// Returns the geometry behind a live handle.
    pub fn mesh(&self, handle: MeshHandle) -> Option<&MeshData> {
        self.meshes.get(&handle).map(|(_, mesh)| mesh)
    }

    /// Returns the live geometry uploaded for `key`, if any.
    pub fn mesh_for(&self, key: LayerKey) -> Option<&MeshData> {
        self.meshes
            .values()
            .find(|(k, _)| *k == key)
            .map(|(_, mesh)| mesh)
    }

    /// Layers drawn since the last [`take_draws`](Self::take_draws), in order.
    pub fn draws(&self) -> &[LayerKey] {
        &self.draws
    }

    /// Returns and resets the draw log.
    pub fn take_draws(&mut self) -> Vec<LayerKey> {
        std::mem::take(&mut self.draws)
    }

    /// Total triangles across all live meshes.
    pub fn triangle_count(&self) -> usize {
        self.meshes.values().map(|(_, m)| m.triangle_count()).sum()
    }
}

impl RenderBackend for RecordingBackend {
    fn upload(&mut self, key: LayerKey, mesh: &MeshData) -> MeshHandle {
        let handle = MeshHandle(self.next_handle);
        self.next_handle += 1;
        self.uploads += 1;
        self.meshes.insert(handle, (key, mesh.clone()));
        handle
    }

    fn release(&mut self, handle: MeshHandle) {
        if self.meshes.remove(&handle).is_some() {
            self.releases += 1;
        } else {
            tracing::warn!(handle = handle.0, "release of unknown mesh handle");
        }
    }

    fn draw(&mut self, handle: MeshHandle) {
        if let Some((key, _)) = self.meshes.get(&handle) {
            self.draws.push(*key);
        } else {
            tracing::warn!(handle = handle.0, "draw of unknown mesh handle");
        }
    }
}
