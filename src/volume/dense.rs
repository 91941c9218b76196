use std::collections::HashMap;
use std::sync::Arc;

use crate::math::{Calibration, Voxel, VoxelInterval};

use super::{ImageSourcesModel, LabelSource, LabelVolume};

/// An in-memory label volume starting at the origin.
#[derive(Debug, Clone)]
pub struct DenseVolume {
    dimensions: [usize; 3],
    labels: Vec<u64>,
}

impl DenseVolume {
    /// Creates a volume of the given size filled with background (0).
    #[must_use]
    pub fn new(dimensions: [usize; 3]) -> Self {
        let dimensions = dimensions.map(|n| n.max(1));
        Self {
            dimensions,
            labels: vec![0; dimensions.iter().product()],
        }
    }

    #[must_use]
    pub fn dimensions(&self) -> [usize; 3] {
        self.dimensions
    }

    /// Sets a single voxel. Voxels outside the volume are ignored.
    pub fn set(&mut self, voxel: Voxel, label: u64) {
        if let Some(index) = self.index(voxel) {
            self.labels[index] = label;
        }
    }

    /// Sets every voxel of `interval` that lies inside the volume.
    pub fn fill(&mut self, interval: VoxelInterval, label: u64) {
        for voxel in interval.iter() {
            self.set(voxel, label);
        }
    }

    /// Nearest-neighbor downsampling by an integer factor per axis.
    #[must_use]
    pub fn downsample(&self, factor: [usize; 3]) -> Self {
        let factor = factor.map(|f| f.max(1));
        let dimensions = [0, 1, 2].map(|d| self.dimensions[d].div_ceil(factor[d]));
        let mut out = Self::new(dimensions);
        for voxel in VoxelInterval::from_dimensions(dimensions).iter() {
            let source = [0, 1, 2].map(|d| voxel[d] * i64::try_from(factor[d]).unwrap_or(1));
            out.set(voxel, self.label_at(source));
        }
        out
    }

    fn index(&self, voxel: Voxel) -> Option<usize> {
        let [nx, ny, nz] = self.dimensions;
        let x = usize::try_from(voxel[0]).ok().filter(|&x| x < nx)?;
        let y = usize::try_from(voxel[1]).ok().filter(|&y| y < ny)?;
        let z = usize::try_from(voxel[2]).ok().filter(|&z| z < nz)?;
        Some((z * ny + y) * nx + x)
    }
}

impl LabelVolume for DenseVolume {
    fn interval(&self) -> VoxelInterval {
        VoxelInterval::from_dimensions(self.dimensions)
    }

    fn label_at(&self, voxel: Voxel) -> u64 {
        self.index(voxel).map_or(0, |i| self.labels[i])
    }
}

/// A label source backed by a fixed list of resolution levels.
pub struct PyramidSource {
    name: String,
    spacings: Vec<Calibration>,
    levels: Vec<Arc<dyn LabelVolume>>,
}

impl PyramidSource {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            spacings: Vec::new(),
            levels: Vec::new(),
        }
    }

    /// Appends the next coarser level.
    #[must_use]
    pub fn with_level(mut self, calibration: Calibration, volume: Arc<dyn LabelVolume>) -> Self {
        self.spacings.push(calibration);
        self.levels.push(volume);
        self
    }

    /// Builds `count` levels from a full-resolution volume, halving x and y
    /// at each step. `z` keeps full resolution, as in anisotropic stacks.
    #[must_use]
    pub fn halving(name: impl Into<String>, calibration: Calibration, volume: &DenseVolume, count: usize) -> Self {
        let mut source = Self::new(name);
        let mut current = volume.clone();
        let mut spacing = calibration;
        for _ in 0..count.max(1) {
            let next = current.downsample([2, 2, 1]);
            source = source.with_level(spacing, Arc::new(current));
            current = next;
            spacing = Calibration::new(spacing.x * 2.0, spacing.y * 2.0, spacing.z);
        }
        source
    }
}

impl LabelSource for PyramidSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn voxel_spacings(&self) -> &[Calibration] {
        &self.spacings
    }

    fn level(&self, level: usize) -> Option<Arc<dyn LabelVolume>> {
        self.levels.get(level).cloned()
    }
}

/// Image sources keyed by image identifier.
#[derive(Default)]
pub struct ImageSources {
    sources: HashMap<String, Arc<dyn LabelSource>>,
}

impl ImageSources {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, image_id: impl Into<String>, source: Arc<dyn LabelSource>) {
        self.sources.insert(image_id.into(), source);
    }
}

impl ImageSourcesModel for ImageSources {
    fn source(&self, image_id: &str) -> Option<Arc<dyn LabelSource>> {
        self.sources.get(image_id).cloned()
    }
}
