use super::{to_voxel, Calibration, Point3, Voxel};

/// An axis-aligned bounding box in calibrated (real-world) units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner of the bounding box.
    pub min: Point3,
    /// Maximum corner of the bounding box.
    pub max: Point3,
}

impl Aabb {
    /// Creates a bounding box from two corners.
    #[must_use]
    pub fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }

    /// Converts the box to voxel units at the given calibration.
    ///
    /// Each corner is divided by the calibration and floored per axis.
    #[must_use]
    pub fn to_voxels(&self, calibration: &Calibration) -> VoxelInterval {
        VoxelInterval::new(
            to_voxel(&self.min, calibration),
            to_voxel(&self.max, calibration),
        )
    }
}

/// An inclusive, axis-aligned range of voxels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VoxelInterval {
    min: Voxel,
    max: Voxel,
}

impl VoxelInterval {
    /// Creates an interval from its inclusive corners.
    ///
    /// Corners are reordered per axis, so `min <= max` always holds.
    #[must_use]
    pub fn new(a: Voxel, b: Voxel) -> Self {
        Self {
            min: [0, 1, 2].map(|d| a[d].min(b[d])),
            max: [0, 1, 2].map(|d| a[d].max(b[d])),
        }
    }

    /// An interval covering a single voxel.
    #[must_use]
    pub fn point(voxel: Voxel) -> Self {
        Self {
            min: voxel,
            max: voxel,
        }
    }

    /// Interval starting at the origin with the given extent per axis.
    ///
    /// Every extent must be at least one.
    #[must_use]
    pub fn from_dimensions(dimensions: [usize; 3]) -> Self {
        let max = dimensions.map(|n| i64::try_from(n).unwrap_or(i64::MAX).max(1) - 1);
        Self { min: [0; 3], max }
    }

    #[must_use]
    pub fn min(&self) -> Voxel {
        self.min
    }

    #[must_use]
    pub fn max(&self) -> Voxel {
        self.max
    }

    /// Number of voxels along each axis.
    #[must_use]
    pub fn dimensions(&self) -> [u64; 3] {
        [0, 1, 2].map(|d| self.max[d].abs_diff(self.min[d]) + 1)
    }

    /// Total number of voxels, saturating at `u64::MAX`.
    #[must_use]
    pub fn voxel_count(&self) -> u64 {
        self.dimensions()
            .iter()
            .fold(1_u64, |acc, &n| acc.saturating_mul(n))
    }

    #[must_use]
    pub fn contains(&self, voxel: Voxel) -> bool {
        (0..3).all(|d| voxel[d] >= self.min[d] && voxel[d] <= self.max[d])
    }

    /// Grows the interval so it contains `voxel`.
    pub fn include(&mut self, voxel: Voxel) {
        for d in 0..3 {
            self.min[d] = self.min[d].min(voxel[d]);
            self.max[d] = self.max[d].max(voxel[d]);
        }
    }

    /// Converts the interval back to calibrated units.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn to_real(&self, calibration: &Calibration) -> Aabb {
        let corner = |v: Voxel| {
            Point3::new(
                v[0] as f64 * calibration.x,
                v[1] as f64 * calibration.y,
                v[2] as f64 * calibration.z,
            )
        };
        Aabb::new(corner(self.min), corner(self.max))
    }

    /// Iterates over every voxel in x-fastest order.
    pub fn iter(&self) -> impl Iterator<Item = Voxel> + '_ {
        let [x0, y0, z0] = self.min;
        let [x1, y1, z1] = self.max;
        (z0..=z1).flat_map(move |z| (y0..=y1).flat_map(move |y| (x0..=x1).map(move |x| [x, y, z])))
    }
}
