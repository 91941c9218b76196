mod bounding_box;
mod build_mesh;
mod flood_fill;
mod resolution;

pub use bounding_box::ResolveBoundingBox;
pub use build_mesh::{BuildMesh, MeshParams, SegmentMesh};
pub use flood_fill::{FloodFill, FloodRegion};
pub use resolution::{SelectResolution, SpacingMode};
