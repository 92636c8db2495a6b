//! CPU-side geometry accumulation for one layer rebuild.
//!
//! A [`GeometryBuffer`] lives for exactly one rebuild: faces and lines are
//! appended, the result is handed to the [`RenderBackend`] with
//! [`load`](GeometryBuffer::load), and the CPU copy is dropped with
//! [`clear`](GeometryBuffer::clear). [`finish`](GeometryBuffer::finish) does
//! both in that order and consumes the buffer.

use glam::{Vec2, Vec3};

use crate::backend::{MeshHandle, RenderBackend};
use crate::layer::LayerKey;

/// A single vertex in a layer mesh.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LayerVertex {
    /// World-space position.
    pub position: [f32; 3],
    /// Linear RGBA colour.
    pub color: [f32; 4],
    /// Texture coordinates across the face (0..=1).
    pub uv: [f32; 2],
}

static_assertions::assert_eq_size!(LayerVertex, [u8; 36]);

impl LayerVertex {
    /// Creates a vertex from glam types.
    pub fn new(position: Vec3, color: [f32; 4], uv: Vec2) -> Self {
        Self {
            position: position.to_array(),
            color,
            uv: uv.to_array(),
        }
    }
}

/// Geometry handed to the backend on upload.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    /// Triangle vertices.
    pub vertices: Vec<LayerVertex>,
    /// Triangle indices into `vertices`, 3 per triangle.
    pub indices: Vec<u32>,
    /// Line segment endpoints, 2 per segment.
    pub lines: Vec<LayerVertex>,
}

impl MeshData {
    /// Number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Number of line segments.
    pub fn line_count(&self) -> usize {
        self.lines.len() / 2
    }

    /// Returns `true` if there is nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty() && self.lines.is_empty()
    }
}

/// Accumulates faces and lines for a single rebuild.
#[derive(Debug, Default)]
pub struct GeometryBuffer {
    data: MeshData,
    faces: usize,
}

impl GeometryBuffer {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a convex polygon as a triangle fan.
    ///
    /// `vertices`, `colors` and `uvs` are parallel slices; polygons with fewer
    /// than three vertices are ignored.
    pub fn add_face(&mut self, vertices: &[Vec3], colors: &[[f32; 4]], uvs: &[Vec2]) {
        debug_assert_eq!(vertices.len(), colors.len());
        debug_assert_eq!(vertices.len(), uvs.len());
        if vertices.len() < 3 {
            return;
        }

        let base = self.data.vertices.len() as u32;
        for ((&p, &c), &uv) in vertices.iter().zip(colors).zip(uvs) {
            self.data.vertices.push(LayerVertex::new(p, c, uv));
        }
        for i in 1..vertices.len() as u32 - 1 {
            self.data
                .indices
                .extend_from_slice(&[base, base + i, base + i + 1]);
        }
        self.faces += 1;
    }

    /// Appends a line segment.
    pub fn add_line(&mut self, a: Vec3, b: Vec3, color: [f32; 4]) {
        self.data.lines.push(LayerVertex::new(a, color, Vec2::ZERO));
        self.data.lines.push(LayerVertex::new(b, color, Vec2::ONE));
    }

    /// Number of faces added since the last clear.
    pub fn face_count(&self) -> usize {
        self.faces
    }

    /// Number of line segments added since the last clear.
    pub fn line_count(&self) -> usize {
        self.data.line_count()
    }

    /// Returns `true` if nothing was added.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Read access to the accumulated geometry.
    pub fn data(&self) -> &MeshData {
        &self.data
    }

    /// Uploads the accumulated geometry. Returns `None` without touching the
    /// backend when the buffer is empty.
    pub fn load<B: RenderBackend + ?Sized>(
        &self,
        backend: &mut B,
        key: LayerKey,
    ) -> Option<MeshHandle> {
        if self.data.is_empty() {
            return None;
        }
        Some(backend.upload(key, &self.data))
    }

    /// Drops the CPU copy, including its allocations.
    pub fn clear(&mut self) {
        self.data = MeshData::default();
        self.faces = 0;
    }

    /// Loads then clears, consuming the buffer.
    pub fn finish<B: RenderBackend + ?Sized>(
        mut self,
        backend: &mut B,
        key: LayerKey,
    ) -> Option<MeshHandle> {
        let handle = self.load(backend, key);
        self.clear();
        handle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::RecordingBackend;
    use crate::layer::LayerKind;

    const WHITE: [f32; 4] = [1.0; 4];

    fn key() -> LayerKey {
        LayerKey::new(LayerKind::Wall, 0)
    }

    #[test]
    fn test_quad_becomes_two_triangles() {
        let mut buffer = GeometryBuffer::new();
        let quad = [Vec3::ZERO, Vec3::X, Vec3::new(1.0, 1.0, 0.0), Vec3::Y];
        buffer.add_face(&quad, &[WHITE; 4], &[Vec2::ZERO; 4]);
        assert_eq!(buffer.face_count(), 1);
        assert_eq!(buffer.data().vertices.len(), 4);
        assert_eq!(buffer.data().indices, vec![0, 1, 2, 0, 2, 3]);
    }

    #[test]
    fn test_degenerate_face_ignored() {
        let mut buffer = GeometryBuffer::new();
        buffer.add_face(&[Vec3::ZERO, Vec3::X], &[WHITE; 2], &[Vec2::ZERO; 2]);
        assert!(buffer.is_empty());
        assert_eq!(buffer.face_count(), 0);
    }

    #[test]
    fn test_empty_buffer_does_not_upload() {
        let mut backend = RecordingBackend::new();
        let buffer = GeometryBuffer::new();
        assert!(buffer.finish(&mut backend, key()).is_none());
        assert_eq!(backend.upload_count(), 0);
    }

    #[test]
    fn test_finish_uploads_then_clears() {
        let mut backend = RecordingBackend::new();
        let mut buffer = GeometryBuffer::new();
        buffer.add_line(Vec3::ZERO, Vec3::ONE, WHITE);
        assert_eq!(buffer.line_count(), 1);

        let handle = buffer.load(&mut backend, key()).expect("non-empty upload");
        assert_eq!(backend.mesh(handle).map(|m| m.line_count()), Some(1));

        buffer.clear();
        assert!(buffer.is_empty());
        assert_eq!(buffer.data().lines.capacity(), 0);
    }
}
