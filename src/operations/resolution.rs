use crate::error::BuildError;
use crate::math::Aabb;
use crate::model::SegmentId;
use crate::volume::LabelSource;

/// How the resolution level of a mesh is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum SpacingMode {
    /// Finest level whose crop fits the voxel budget.
    #[default]
    Auto,
    /// Level whose lateral voxel spacing is nearest to the given value.
    Forced(f64),
}

/// Picks the pyramid level a segment is meshed at.
pub struct SelectResolution<'a> {
    source: &'a dyn LabelSource,
    voxel_budget: u64,
    mode: SpacingMode,
}

impl<'a> SelectResolution<'a> {
    /// Creates a new `SelectResolution` query in [`SpacingMode::Auto`].
    #[must_use]
    pub fn new(source: &'a dyn LabelSource, voxel_budget: u64) -> Self {
        Self {
            source,
            voxel_budget,
            mode: SpacingMode::Auto,
        }
    }

    #[must_use]
    pub fn with_mode(mut self, mode: SpacingMode) -> Self {
        self.mode = mode;
        self
    }

    /// Executes the query, returning a level index.
    ///
    /// # Errors
    ///
    /// Returns an error if the source has no levels, if auto mode is used
    /// without a bounding box, or if no level keeps the bounding box within
    /// the voxel budget. The coarsest level is never used as a fallback.
    pub fn execute(&self, segment: SegmentId, bounding_box: Option<&Aabb>) -> Result<usize, BuildError> {
        let spacings = self.source.voxel_spacings();
        if spacings.is_empty() {
            return Err(BuildError::NoResolutionLevels(self.source.name().to_owned()));
        }

        match self.mode {
            SpacingMode::Forced(spacing) => {
                let mut best = 0;
                for (level, calibration) in spacings.iter().enumerate() {
                    if (calibration.x - spacing).abs() < (spacings[best].x - spacing).abs() {
                        best = level;
                    }
                }
                Ok(best)
            }
            SpacingMode::Auto => {
                let bounding_box = bounding_box.ok_or(BuildError::MissingBoundingBox(segment))?;
                spacings
                    .iter()
                    .position(|calibration| {
                        bounding_box.to_voxels(calibration).voxel_count() <= self.voxel_budget
                    })
                    .ok_or(BuildError::NoLevelWithinBudget {
                        segment,
                        budget: self.voxel_budget,
                    })
            }
        }
    }
}
