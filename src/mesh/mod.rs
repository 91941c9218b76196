mod extract;
mod smooth;

pub use extract::{MeshExtractor, VoxelFaceExtractor};
pub use smooth::{LaplacianSmoother, MeshSmoother};

use std::collections::HashMap;

use crate::math::{Calibration, Point3};

/// A triangle mesh with shared vertices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriangleMesh {
    /// Vertex positions.
    pub vertices: Vec<Point3>,
    /// Triangle indices (each triple defines a triangle).
    pub indices: Vec<[u32; 3]>,
}

impl TriangleMesh {
    /// Builds an indexed mesh from a flat buffer of vertex triplets, three
    /// vertices per triangle.
    ///
    /// Vertices with bit-identical coordinates are merged so that smoothing
    /// sees a connected surface. A trailing partial triangle is ignored.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_flat(coordinates: &[f32]) -> Self {
        let mut mesh = Self::default();
        let mut welded: HashMap<[u32; 3], u32> = HashMap::new();

        for triangle in coordinates.chunks_exact(9) {
            let mut tri = [0_u32; 3];
            for (corner, xyz) in tri.iter_mut().zip(triangle.chunks_exact(3)) {
                let key = [xyz[0].to_bits(), xyz[1].to_bits(), xyz[2].to_bits()];
                *corner = *welded.entry(key).or_insert_with(|| {
                    mesh.vertices.push(Point3::new(
                        f64::from(xyz[0]),
                        f64::from(xyz[1]),
                        f64::from(xyz[2]),
                    ));
                    (mesh.vertices.len() - 1) as u32
                });
            }
            mesh.indices.push(tri);
        }

        mesh
    }

    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Multiplies every vertex triplet by the calibration, converting voxel
/// units to calibrated units.
#[allow(clippy::cast_possible_truncation)]
pub fn scale_to_calibration(coordinates: &mut [f32], calibration: &Calibration) {
    let factors = [calibration.x as f32, calibration.y as f32, calibration.z as f32];
    for xyz in coordinates.chunks_exact_mut(3) {
        for (value, factor) in xyz.iter_mut().zip(factors) {
            *value *= factor;
        }
    }
}
