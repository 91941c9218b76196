//! Labeled volumetric data and the multi-resolution sources serving it.

mod dense;

pub use dense::{DenseVolume, ImageSources, PyramidSource};

use std::sync::Arc;

use crate::math::{Calibration, Voxel, VoxelInterval};

/// A labeled 3D image at one resolution level.
pub trait LabelVolume: Send + Sync {
    /// Voxels covered by the volume.
    fn interval(&self) -> VoxelInterval;

    /// Label at `voxel`, zero outside [`LabelVolume::interval`].
    fn label_at(&self, voxel: Voxel) -> u64;
}

/// A multi-resolution label image.
///
/// Level 0 is the finest; spacings grow with the level index.
pub trait LabelSource: Send + Sync {
    fn name(&self) -> &str;

    /// One calibration per resolution level.
    fn voxel_spacings(&self) -> &[Calibration];

    /// Fetches the volume at `level`. May block while data is loaded.
    fn level(&self, level: usize) -> Option<Arc<dyn LabelVolume>>;
}

/// Image identifiers mapped to their label sources.
pub trait ImageSourcesModel: Send + Sync {
    fn source(&self, image_id: &str) -> Option<Arc<dyn LabelSource>>;
}

/// A view of a volume restricted to an interval and zero-extended beyond it.
#[derive(Clone, Copy)]
pub struct CroppedVolume<'a> {
    volume: &'a dyn LabelVolume,
    interval: VoxelInterval,
}

impl<'a> CroppedVolume<'a> {
    #[must_use]
    pub fn new(volume: &'a dyn LabelVolume, interval: VoxelInterval) -> Self {
        Self { volume, interval }
    }

    #[must_use]
    pub fn interval(&self) -> VoxelInterval {
        self.interval
    }

    /// Label at `voxel`, zero outside the crop.
    #[must_use]
    pub fn label_at(&self, voxel: Voxel) -> u64 {
        if self.interval.contains(voxel) {
            self.volume.label_at(voxel)
        } else {
            0
        }
    }
}
