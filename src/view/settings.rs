use std::time::Duration;

use crate::error::PreconditionError;
use crate::operations::{MeshParams, SpacingMode};
use crate::scene::FocusAnimation;

/// Configuration of a [`super::SegmentsView`].
#[derive(Debug, Clone, PartialEq)]
pub struct ViewSettings {
    /// Prefix of scene content names, `<objects_name>_<label>`.
    pub objects_name: String,
    /// Transparency of added content, `0` is opaque.
    pub transparency: f32,
    pub mesh: MeshParams,
    pub focus: FocusAnimation,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            objects_name: String::new(),
            transparency: 0.0,
            mesh: MeshParams::default(),
            focus: FocusAnimation {
                steps: 30,
                duration: Duration::from_millis(750),
                zoom: 0.8,
                min_lateral_extent: 20.0,
                min_axial_extent: 20.0,
            },
        }
    }
}

impl ViewSettings {
    #[must_use]
    pub fn with_objects_name(mut self, name: impl Into<String>) -> Self {
        self.objects_name = name.into();
        self
    }

    #[must_use]
    pub fn with_transparency(mut self, transparency: f32) -> Self {
        self.transparency = transparency;
        self
    }

    #[must_use]
    pub fn with_smoothing_iterations(mut self, iterations: u32) -> Self {
        self.mesh.smoothing_iterations = iterations;
        self
    }

    #[must_use]
    pub fn with_voxel_budget(mut self, voxels: u64) -> Self {
        self.mesh.voxel_budget = voxels;
        self
    }

    #[must_use]
    pub fn with_spacing(mut self, spacing: SpacingMode) -> Self {
        self.mesh.spacing = spacing;
        self
    }

    #[must_use]
    pub fn with_flood_fill_cap(mut self, voxels: u64) -> Self {
        self.mesh.flood_fill_cap = voxels;
        self
    }

    #[must_use]
    pub fn with_focus(mut self, focus: FocusAnimation) -> Self {
        self.focus = focus;
        self
    }

    /// Checks every numeric setting.
    ///
    /// # Errors
    ///
    /// Returns the first invalid setting found.
    pub fn validate(&self) -> Result<(), PreconditionError> {
        check_transparency(self.transparency)?;
        check_spacing(self.mesh.spacing)?;
        check_at_least_one("flood fill voxel cap", self.mesh.flood_fill_cap)?;
        check_at_least_one("focus animation steps", u64::from(self.focus.steps))?;
        check_positive("focus zoom level", self.focus.zoom)?;
        check_non_negative("focus minimum lateral extent", self.focus.min_lateral_extent)?;
        check_non_negative("focus minimum axial extent", self.focus.min_axial_extent)
    }
}

pub(super) fn check_transparency(transparency: f32) -> Result<(), PreconditionError> {
    if (0.0..=1.0).contains(&transparency) {
        Ok(())
    } else {
        Err(PreconditionError::InvalidSetting {
            parameter: "transparency",
            value: f64::from(transparency),
            reason: "must lie in [0, 1]",
        })
    }
}

pub(super) fn check_spacing(spacing: SpacingMode) -> Result<(), PreconditionError> {
    match spacing {
        SpacingMode::Auto => Ok(()),
        SpacingMode::Forced(value) => check_positive("voxel spacing", value),
    }
}

#[allow(clippy::cast_precision_loss)]
pub(super) fn check_at_least_one(parameter: &'static str, value: u64) -> Result<(), PreconditionError> {
    if value >= 1 {
        Ok(())
    } else {
        Err(PreconditionError::InvalidSetting {
            parameter,
            value: value as f64,
            reason: "must be at least one",
        })
    }
}

pub(super) fn check_positive(parameter: &'static str, value: f64) -> Result<(), PreconditionError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(PreconditionError::InvalidSetting {
            parameter,
            value,
            reason: "must be finite and positive",
        })
    }
}

pub(super) fn check_non_negative(parameter: &'static str, value: f64) -> Result<(), PreconditionError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(PreconditionError::InvalidSetting {
            parameter,
            value,
            reason: "must be finite and non-negative",
        })
    }
}
