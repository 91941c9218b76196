mod interval;

pub use interval::{Aabb, VoxelInterval};

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// Per-axis physical size of one voxel at a resolution level.
pub type Calibration = Vector3;

/// Integer voxel coordinate.
pub type Voxel = [i64; 3];

/// Relative distance below which a scaled coordinate counts as lying on a
/// voxel boundary.
const VOXEL_SNAP: f64 = 1e-9;

/// Converts a calibrated position to the voxel containing it.
///
/// Coordinates within [`VOXEL_SNAP`] of an integer are snapped to it before
/// flooring, so `voxel * calibration / calibration` maps back to `voxel`.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn to_voxel(position: &Point3, calibration: &Calibration) -> Voxel {
    [0, 1, 2].map(|d| {
        let scaled = position[d] / calibration[d];
        let nearest = scaled.round();
        if (scaled - nearest).abs() <= VOXEL_SNAP * nearest.abs().max(1.0) {
            nearest as i64
        } else {
            scaled.floor() as i64
        }
    })
}
