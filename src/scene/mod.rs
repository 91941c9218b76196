//! The interactive 3D scene and the index of content this crate put in it.

mod index;

pub use index::{ContentIndex, MeshContent};

use std::sync::Weak;
use std::time::Duration;

use crate::mesh::TriangleMesh;
use crate::model::Color;

slotmap::new_key_type! {
    /// Identifier of a piece of scene content created for a segment.
    pub struct ContentId;
}

/// Parameters of the camera animation that centers a segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FocusAnimation {
    /// Number of interpolation steps.
    pub steps: u32,
    pub duration: Duration,
    /// Fraction of the view the content should fill.
    pub zoom: f64,
    /// Smallest lateral (xy) extent to frame, in calibrated units.
    pub min_lateral_extent: f64,
    /// Smallest axial (z) extent to frame, in calibrated units.
    pub min_axial_extent: f64,
}

/// Receives events originating in the scene.
pub trait SceneListener: Send + Sync {
    /// The user picked `content` in the scene.
    fn content_selected(&self, content: ContentId);
}

/// An interactive 3D scene.
///
/// Structural changes (`add_mesh`, `remove_content`) are only issued from one
/// reconciliation at a time. Attribute setters may be called from worker
/// threads, including for content that was just removed; implementations
/// must ignore unknown content.
///
/// Listeners must not be notified from inside a call made by the view.
/// Deliver picks from the scene's own event thread.
pub trait Scene: Send + Sync {
    /// Adds `mesh` under `name`. Activation events for it carry `content`.
    fn add_mesh(&self, content: ContentId, name: &str, mesh: &TriangleMesh, color: Color);

    fn remove_content(&self, name: &str);

    /// Number of contents currently in the scene, including foreign ones.
    fn content_count(&self) -> usize;

    fn set_color(&self, content: ContentId, color: Color);

    fn set_transparency(&self, content: ContentId, transparency: f32);

    fn set_locked(&self, content: ContentId, locked: bool);

    /// Turns automatic view fitting on content changes on or off.
    fn set_auto_adjust_view(&self, enabled: bool);

    /// Animates the camera so `content` fills the view.
    fn animate_to(&self, content: ContentId, animation: &FocusAnimation);

    fn add_listener(&self, listener: Weak<dyn SceneListener>);

    /// Makes the scene visible, e.g. by opening its window.
    fn show(&self) {}
}
