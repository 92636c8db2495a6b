//! Layered terrain mesh cache: per-height wall, floor and interior layers that
//! rebuild lazily from the surface index, and the slice composer that cuts the
//! terrain at a chosen height.

pub mod backend;
pub mod buffer;
pub mod layer;
pub mod layer_cache;
pub mod pipeline;
pub mod slice;

pub use backend::{MeshHandle, RecordingBackend, RenderBackend};
pub use buffer::{GeometryBuffer, LayerVertex, MeshData};
pub use layer::{Layer, LayerKey, LayerKind, LayerOptions, LayerSource, LayerState};
pub use layer_cache::LayerCache;
pub use pipeline::TerrainPipeline;
pub use slice::SliceComposer;
