use std::collections::{HashSet, VecDeque};

use crate::math::{Voxel, VoxelInterval};
use crate::volume::LabelVolume;

/// Face-adjacent offsets (diamond neighborhood of radius 1).
const NEIGHBORS: [Voxel; 6] = [
    [1, 0, 0],
    [-1, 0, 0],
    [0, 1, 0],
    [0, -1, 0],
    [0, 0, 1],
    [0, 0, -1],
];

/// Region reached by a [`FloodFill`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FloodRegion {
    /// Label value of the seed voxel.
    pub label: u64,
    /// Minimal interval containing every filled voxel.
    pub bounds: VoxelInterval,
    /// Number of filled voxels.
    pub voxel_count: u64,
    /// Whether the fill stopped at the voxel cap before the region was
    /// exhausted.
    pub truncated: bool,
}

/// Collects the connected voxels sharing the seed's label.
pub struct FloodFill {
    max_voxels: u64,
}

impl FloodFill {
    /// Creates a flood fill that stops after `max_voxels` voxels.
    #[must_use]
    pub fn new(max_voxels: u64) -> Self {
        Self {
            max_voxels: max_voxels.max(1),
        }
    }

    /// Runs the fill from `seed`. Returns `None` if the seed lies outside
    /// the volume.
    #[must_use]
    pub fn execute(&self, volume: &dyn LabelVolume, seed: Voxel) -> Option<FloodRegion> {
        let domain = volume.interval();
        if !domain.contains(seed) {
            return None;
        }

        let label = volume.label_at(seed);
        let mut bounds = VoxelInterval::point(seed);
        let mut visited = HashSet::from([seed]);
        let mut queue = VecDeque::from([seed]);
        let mut voxel_count = 1_u64;
        let mut truncated = false;

        'fill: while let Some(voxel) = queue.pop_front() {
            for offset in NEIGHBORS {
                let next = [0, 1, 2].map(|d| voxel[d] + offset[d]);
                if !domain.contains(next) || visited.contains(&next) || volume.label_at(next) != label {
                    continue;
                }
                if voxel_count >= self.max_voxels {
                    truncated = true;
                    break 'fill;
                }
                visited.insert(next);
                bounds.include(next);
                voxel_count += 1;
                queue.push_back(next);
            }
        }

        Some(FloodRegion {
            label,
            bounds,
            voxel_count,
            truncated,
        })
    }
}
