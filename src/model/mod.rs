//! Collaborators owned outside this crate: segments, the selection model and
//! the coloring model.
//!
//! Models notify the view through listener traits. They hold listeners as
//! `Weak` references and must not hold their own locks while notifying,
//! since a listener calls straight back into the model.

mod color;
mod segment;

pub use color::Color;
pub use segment::{Segment, SegmentId};

use std::sync::{Arc, Weak};

/// Receives selection-changed and focus events.
pub trait SelectionListener: Send + Sync {
    fn selection_changed(&self);

    fn focus_event(&self, segment: &Arc<Segment>);
}

/// Receives recoloring events.
pub trait ColoringListener: Send + Sync {
    fn coloring_changed(&self);
}

/// The 2D viewer's selection state.
pub trait SelectionModel: Send + Sync {
    /// Currently selected segments.
    fn selected(&self) -> Vec<Arc<Segment>>;

    fn is_focused(&self, segment: &Segment) -> bool;

    /// Focuses `segment` and notifies listeners.
    fn focus(&self, segment: &Arc<Segment>);

    fn add_listener(&self, listener: Weak<dyn SelectionListener>);
}

/// Maps segments to display colors.
pub trait ColoringModel: Send + Sync {
    fn color(&self, segment: &Segment) -> Color;

    fn add_listener(&self, listener: Weak<dyn ColoringListener>);
}
