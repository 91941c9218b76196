use thiserror::Error;

use crate::model::SegmentId;

/// Top-level error type for the segments 3D view.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Precondition(#[from] PreconditionError),

    #[error("failed to start mesh worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Recoverable, per-segment failures.
///
/// A segment that fails with one of these is left out of the scene; other
/// segments of the same reconciliation are unaffected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildError {
    #[error("no image source registered for image {0:?}")]
    UnknownImage(String),

    #[error("image source {0:?} has no resolution levels")]
    NoResolutionLevels(String),

    #[error("resolution level {level} is not available in source {source_name:?}")]
    LevelUnavailable { source_name: String, level: usize },

    #[error("segment {0} has no bounding box, resolution level cannot be determined")]
    MissingBoundingBox(SegmentId),

    #[error("seed of segment {0} lies outside the labeled volume")]
    SeedOutsideVolume(SegmentId),

    #[error("no resolution level keeps segment {segment} within {budget} voxels")]
    NoLevelWithinBudget { segment: SegmentId, budget: u64 },

    #[error("bounding box of segment {segment} has {voxels} voxels, the maximum is {budget}")]
    CropExceedsBudget {
        segment: SegmentId,
        voxels: u64,
        budget: u64,
    },

    #[error("no voxels with label {label} found for segment {segment}")]
    LabelNotFound { segment: SegmentId, label: u64 },
}

/// Caller bugs: invalid state or invalid arguments.
///
/// These are never produced by the data and are kept apart from
/// [`BuildError`] so they cannot be mistaken for a skipped segment.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PreconditionError {
    #[error("mesh of {0:?} has no triangles")]
    EmptyMesh(String),

    #[error("scene is not initialized")]
    SceneUninitialized,

    #[error("segment {0} already has content in the scene")]
    AlreadyIndexed(SegmentId),

    #[error("{parameter} = {value} is invalid: {reason}")]
    InvalidSetting {
        parameter: &'static str,
        value: f64,
        reason: &'static str,
    },
}

/// Convenience type alias for results using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
