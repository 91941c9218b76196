//! Laplacian mesh smoothing.
//!
//! Each iteration moves every vertex toward the centroid of its edge
//! neighbors:
//!
//! ```text
//! v_new = v + lambda * (centroid(N(v)) - v)
//! ```

use std::collections::BTreeSet;

use crate::math::Vector3;

use super::TriangleMesh;

/// In-place mesh smoothing.
pub trait MeshSmoother: Send + Sync {
    fn smooth(&self, mesh: &mut TriangleMesh, iterations: u32);
}

/// Uniform-weight Laplacian smoothing.
///
/// Shrinks the surface slightly with every iteration; a handful of
/// iterations removes the staircase of voxel-aligned surfaces.
#[derive(Debug, Clone, Copy)]
pub struct LaplacianSmoother {
    lambda: f64,
}

impl LaplacianSmoother {
    /// Creates a smoother with the given step factor, clamped to `[0, 1]`.
    #[must_use]
    pub fn new(lambda: f64) -> Self {
        Self {
            lambda: lambda.clamp(0.0, 1.0),
        }
    }

    #[must_use]
    pub fn lambda(&self) -> f64 {
        self.lambda
    }
}

impl Default for LaplacianSmoother {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl MeshSmoother for LaplacianSmoother {
    #[allow(clippy::cast_precision_loss)]
    fn smooth(&self, mesh: &mut TriangleMesh, iterations: u32) {
        if iterations == 0 || mesh.is_empty() {
            return;
        }

        let neighbors = vertex_neighbors(mesh);
        for _ in 0..iterations {
            let displacements: Vec<Vector3> = mesh
                .vertices
                .iter()
                .zip(&neighbors)
                .map(|(vertex, adjacent)| {
                    if adjacent.is_empty() {
                        return Vector3::zeros();
                    }
                    let sum: Vector3 = adjacent
                        .iter()
                        .map(|&n| mesh.vertices[n as usize].coords)
                        .sum();
                    let centroid = sum / adjacent.len() as f64;
                    (centroid - vertex.coords) * self.lambda
                })
                .collect();

            for (vertex, displacement) in mesh.vertices.iter_mut().zip(displacements) {
                vertex.coords += displacement;
            }
        }
    }
}

fn vertex_neighbors(mesh: &TriangleMesh) -> Vec<BTreeSet<u32>> {
    let mut neighbors = vec![BTreeSet::new(); mesh.vertices.len()];
    for &[a, b, c] in &mesh.indices {
        for (from, to) in [(a, b), (b, c), (c, a)] {
            neighbors[from as usize].insert(to);
            neighbors[to as usize].insert(from);
        }
    }
    neighbors
}
