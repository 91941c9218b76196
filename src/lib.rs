pub mod error;
pub mod math;
pub mod mesh;
pub mod model;
pub mod operations;
pub mod scene;
pub mod view;
pub mod volume;

#[cfg(test)]
mod test_support;

pub use error::{BuildError, Error, PreconditionError, Result};
pub use operations::SpacingMode;
pub use view::{ReconcileReport, SegmentsView, SegmentsViewBuilder, ViewSettings};
