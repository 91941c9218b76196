use std::sync::Arc;

use tracing::info;

use crate::error::BuildError;
use crate::mesh::{scale_to_calibration, MeshExtractor, MeshSmoother, TriangleMesh};
use crate::model::{Color, ColoringModel, Segment};
use crate::volume::{CroppedVolume, LabelSource};

use super::{ResolveBoundingBox, SelectResolution, SpacingMode};

/// Parameters of the mesh pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshParams {
    /// Maximum number of voxels a cropped region may have.
    pub voxel_budget: u64,
    pub spacing: SpacingMode,
    /// Voxel cap of the bounding box flood fill.
    pub flood_fill_cap: u64,
    pub smoothing_iterations: u32,
}

impl Default for MeshParams {
    fn default() -> Self {
        Self {
            voxel_budget: 100 * 100 * 100,
            spacing: SpacingMode::Auto,
            flood_fill_cap: 1_000_000_000,
            smoothing_iterations: 5,
        }
    }
}

/// A smoothed, colored mesh ready to be added to a scene.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentMesh {
    pub mesh: TriangleMesh,
    pub color: Color,
}

/// Builds the mesh of one segment.
///
/// Touches only volumetric data, the segment's own caches and the
/// collaborators passed to [`BuildMesh::execute`], so independent segments
/// can be built in parallel.
pub struct BuildMesh<'a> {
    segment: &'a Segment,
    params: MeshParams,
    force: bool,
}

impl<'a> BuildMesh<'a> {
    /// Creates a new `BuildMesh` operation.
    #[must_use]
    pub fn new(segment: &'a Segment, params: MeshParams) -> Self {
        Self {
            segment,
            params,
            force: false,
        }
    }

    /// Ignores the segment's cached bounding box and vertex buffer.
    #[must_use]
    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Executes the pipeline: resolve bounding box, pick a level, crop,
    /// extract, scale, smooth and color.
    ///
    /// The scaled vertex buffer is cached on the segment before smoothing;
    /// later calls without force start from the cache.
    ///
    /// # Errors
    ///
    /// Returns a [`BuildError`] if the segment cannot be meshed.
    pub fn execute(
        &self,
        source: &dyn LabelSource,
        extractor: &dyn MeshExtractor,
        smoother: &dyn MeshSmoother,
        coloring: &dyn ColoringModel,
    ) -> Result<SegmentMesh, BuildError> {
        let coordinates = match self.segment.mesh() {
            Some(cached) if !self.force => cached,
            _ => {
                let coordinates: Arc<[f32]> = self.extract(source, extractor)?.into();
                self.segment.set_mesh(Some(Arc::clone(&coordinates)));
                coordinates
            }
        };

        let mut mesh = TriangleMesh::from_flat(&coordinates);
        smoother.smooth(&mut mesh, self.params.smoothing_iterations);

        Ok(SegmentMesh {
            mesh,
            color: coloring.color(self.segment),
        })
    }

    fn extract(&self, source: &dyn LabelSource, extractor: &dyn MeshExtractor) -> Result<Vec<f32>, BuildError> {
        let segment = self.segment.id();

        // Forced spacing does not need a box to pick the level, so a failed
        // fill is only fatal once the crop is computed.
        let bounding_box = match ResolveBoundingBox::new(self.segment, self.params.flood_fill_cap)
            .with_force(self.force)
            .execute(source)
        {
            Ok(bounding_box) => Some(bounding_box),
            Err(BuildError::SeedOutsideVolume(_)) => None,
            Err(e) => return Err(e),
        };

        let level = SelectResolution::new(source, self.params.voxel_budget)
            .with_mode(self.params.spacing)
            .execute(segment, bounding_box.as_ref())?;
        let bounding_box = bounding_box.ok_or(BuildError::MissingBoundingBox(segment))?;

        let unavailable = || BuildError::LevelUnavailable {
            source_name: source.name().to_owned(),
            level,
        };
        let calibration = *source.voxel_spacings().get(level).ok_or_else(unavailable)?;

        info!(
            source = source.name(),
            level,
            spacing = calibration.x,
            "fetching label source"
        );
        let volume = source.level(level).ok_or_else(unavailable)?;

        let interval = bounding_box.to_voxels(&calibration);
        let voxels = interval.voxel_count();
        if voxels > self.params.voxel_budget {
            return Err(BuildError::CropExceedsBudget {
                segment,
                voxels,
                budget: self.params.voxel_budget,
            });
        }

        let crop = CroppedVolume::new(volume.as_ref(), interval);
        let mut coordinates = extractor.extract(&crop, self.segment.label());
        if coordinates.is_empty() {
            return Err(BuildError::LabelNotFound {
                segment,
                label: self.segment.label(),
            });
        }

        scale_to_calibration(&mut coordinates, &calibration);
        Ok(coordinates)
    }
}
