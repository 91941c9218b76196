use crate::math::Voxel;
use crate::volume::CroppedVolume;

/// Surface extraction over a cropped label volume.
pub trait MeshExtractor: Send + Sync {
    /// Returns a flat buffer of vertex triplets in voxel units, three vertices
    /// per triangle. An empty buffer means `label` does not occur in the crop.
    fn extract(&self, volume: &CroppedVolume<'_>, label: u64) -> Vec<f32>;
}

/// Emits two triangles for every voxel face separating `label` from any
/// other value.
///
/// Voxel `v` spans `v ± 0.5` on each axis. Faces are wound counter-clockwise
/// seen from outside the region.
#[derive(Debug, Clone, Copy, Default)]
pub struct VoxelFaceExtractor;

/// `(normal axis, first tangent, second tangent)`, right-handed.
const AXES: [(usize, usize, usize); 3] = [(0, 1, 2), (1, 2, 0), (2, 0, 1)];

impl MeshExtractor for VoxelFaceExtractor {
    fn extract(&self, volume: &CroppedVolume<'_>, label: u64) -> Vec<f32> {
        let mut out = Vec::new();
        for voxel in volume.interval().iter() {
            if volume.label_at(voxel) != label {
                continue;
            }
            for &(axis, u, v) in &AXES {
                for sign in [1_i64, -1] {
                    let mut neighbor = voxel;
                    neighbor[axis] += sign;
                    if volume.label_at(neighbor) != label {
                        push_face(&mut out, voxel, (axis, u, v), sign);
                    }
                }
            }
        }
        out
    }
}

#[allow(clippy::cast_precision_loss)]
fn push_face(out: &mut Vec<f32>, voxel: Voxel, (axis, u, v): (usize, usize, usize), sign: i64) {
    let center = voxel.map(|c| c as f32);
    let offset = if sign > 0 { 0.5 } else { -0.5 };
    let corner = |du: f32, dv: f32| {
        let mut p = center;
        p[axis] += offset;
        p[u] += du;
        p[v] += dv;
        p
    };

    let mut quad = [
        corner(-0.5, -0.5),
        corner(0.5, -0.5),
        corner(0.5, 0.5),
        corner(-0.5, 0.5),
    ];
    if sign < 0 {
        quad.reverse();
    }

    for index in [0, 1, 2, 0, 2, 3] {
        out.extend_from_slice(&quad[index]);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::{Point3, Vector3, VoxelInterval};
    use crate::mesh::TriangleMesh;
    use crate::volume::{DenseVolume, LabelVolume};

    fn single_voxel() -> DenseVolume {
        let mut volume = DenseVolume::new([3, 3, 3]);
        volume.set([1, 1, 1], 4);
        volume
    }

    #[test]
    fn single_voxel_yields_closed_cube() {
        let volume = single_voxel();
        let crop = CroppedVolume::new(&volume, VoxelInterval::from_dimensions([3, 3, 3]));
        let flat = VoxelFaceExtractor.extract(&crop, 4);

        // 6 faces, 2 triangles each, 3 vertices each, 3 coordinates each.
        assert_eq!(flat.len(), 6 * 2 * 3 * 3);
        let mesh = TriangleMesh::from_flat(&flat);
        assert_eq!(mesh.vertices.len(), 8);
        assert!(flat.iter().all(|&c| (c - 0.5).abs() < 1e-6 || (c - 1.5).abs() < 1e-6));
    }

    #[test]
    fn faces_point_outward() {
        let volume = single_voxel();
        let crop = CroppedVolume::new(&volume, VoxelInterval::from_dimensions([3, 3, 3]));
        let mesh = TriangleMesh::from_flat(&VoxelFaceExtractor.extract(&crop, 4));
        let center = Point3::new(1.0, 1.0, 1.0);

        for tri in &mesh.indices {
            let [a, b, c] = tri.map(|i| mesh.vertices[i as usize]);
            let normal: Vector3 = (b - a).cross(&(c - a));
            let centroid = Point3::from((a.coords + b.coords + c.coords) / 3.0);
            assert!(normal.dot(&(centroid - center)) > 0.0);
        }
    }

    #[test]
    fn absent_label_yields_empty_buffer() {
        let volume = single_voxel();
        let crop = CroppedVolume::new(&volume, VoxelInterval::from_dimensions([3, 3, 3]));
        assert!(VoxelFaceExtractor.extract(&crop, 5).is_empty());
    }

    #[test]
    fn shared_faces_are_not_emitted() {
        let mut volume = DenseVolume::new([4, 3, 3]);
        volume.fill(VoxelInterval::new([1, 1, 1], [2, 1, 1]), 2);
        let crop = CroppedVolume::new(&volume, volume.interval());
        let flat = VoxelFaceExtractor.extract(&crop, 2);
        assert_eq!(flat.len() / 18, 10);
    }

    #[test]
    fn crop_boundary_closes_the_surface() {
        let mut volume = DenseVolume::new([4, 3, 3]);
        volume.fill(VoxelInterval::new([1, 1, 1], [2, 1, 1]), 2);
        let crop = CroppedVolume::new(&volume, VoxelInterval::point([1, 1, 1]));
        let flat = VoxelFaceExtractor.extract(&crop, 2);
        assert_eq!(flat.len() / 18, 6);
    }
}
