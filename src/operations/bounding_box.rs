use tracing::{debug, warn};

use crate::error::BuildError;
use crate::math::{to_voxel, Aabb};
use crate::model::Segment;
use crate::volume::LabelSource;

use super::FloodFill;

/// Resolves a segment's calibrated bounding box, flood filling the finest
/// level when none is cached.
pub struct ResolveBoundingBox<'a> {
    segment: &'a Segment,
    max_voxels: u64,
    force: bool,
}

impl<'a> ResolveBoundingBox<'a> {
    /// Creates a new `ResolveBoundingBox` operation. The flood fill stops
    /// after `max_voxels` voxels.
    #[must_use]
    pub fn new(segment: &'a Segment, max_voxels: u64) -> Self {
        Self {
            segment,
            max_voxels,
            force: false,
        }
    }

    /// Recomputes the box even if the segment has one cached.
    #[must_use]
    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Executes the operation and caches the result on the segment.
    ///
    /// A fill that hits the voxel cap yields the bounds of the filled part
    /// only.
    ///
    /// # Errors
    ///
    /// Returns an error if the source has no levels, the finest level cannot
    /// be fetched, or the segment's seed lies outside it.
    pub fn execute(&self, source: &dyn LabelSource) -> Result<Aabb, BuildError> {
        if !self.force {
            if let Some(cached) = self.segment.bounding_box() {
                return Ok(cached);
            }
        }

        let calibration = *source
            .voxel_spacings()
            .first()
            .ok_or_else(|| BuildError::NoResolutionLevels(source.name().to_owned()))?;
        let volume = source.level(0).ok_or_else(|| BuildError::LevelUnavailable {
            source_name: source.name().to_owned(),
            level: 0,
        })?;

        let seed = to_voxel(&self.segment.position(), &calibration);
        let region = FloodFill::new(self.max_voxels)
            .execute(volume.as_ref(), seed)
            .ok_or(BuildError::SeedOutsideVolume(self.segment.id()))?;

        if region.truncated {
            warn!(
                segment = %self.segment.id(),
                voxels = region.voxel_count,
                "flood fill reached its voxel cap, bounding box covers the filled part only"
            );
        }
        if region.label != self.segment.label() {
            debug!(
                segment = %self.segment.id(),
                seed_label = region.label,
                label = self.segment.label(),
                "seed voxel carries a different label than the segment"
            );
        }

        let bounding_box = region.bounds.to_real(&calibration);
        self.segment.set_bounding_box(Some(bounding_box));
        Ok(bounding_box)
    }
}
