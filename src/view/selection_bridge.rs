use std::sync::Arc;

use tracing::{debug, error};

use crate::model::{Segment, SelectionListener};
use crate::scene::{ContentId, SceneListener};

use super::SegmentsView;

impl SegmentsView {
    /// Animates the camera to `segment`'s content.
    ///
    /// Does nothing while display is off, before a scene exists, when the
    /// segment has no content, or when it is the segment focused last.
    /// Removing a segment's content clears it as the last focused segment.
    /// Returns whether an animation was started.
    pub fn focus(&self, segment: &Segment) -> bool {
        if !self.show_in_scene() || self.is_closed() {
            return false;
        }
        let Some(scene) = self.scene() else {
            return false;
        };
        if scene.content_count() == 0 {
            return false;
        }
        let Some(content) = self.content_of(segment.id()) else {
            return false;
        };

        {
            let mut recent = self.recent_focus.lock();
            if *recent == Some(segment.id()) {
                debug!(segment = %segment.id(), "segment already focused");
                return false;
            }
            *recent = Some(segment.id());
        }

        let Some(scene) = self.initialize_scene() else {
            return false;
        };
        let animation = self.settings.read().focus;
        scene.animate_to(content, &animation);
        true
    }

    /// Forwards a pick in the scene to the selection model.
    ///
    /// The segment is recorded as focused before the selection model is
    /// told, so the focus event it sends back does not move the camera to
    /// where the user just clicked. Returns whether focus was forwarded.
    pub fn activate(&self, content: ContentId) -> bool {
        if self.is_closed() {
            return false;
        }
        let Some(segment) = self.segment_of(content) else {
            return false;
        };
        if self.selection.is_focused(&segment) {
            return false;
        }

        *self.recent_focus.lock() = Some(segment.id());
        self.selection.focus(&segment);
        true
    }
}

impl SelectionListener for SegmentsView {
    fn selection_changed(&self) {
        if !self.show_in_scene() {
            return;
        }
        if let Err(e) = self.reconcile(false) {
            error!(error = %e, "failed to update 3D view");
        }
    }

    fn focus_event(&self, segment: &Arc<Segment>) {
        self.focus(segment);
    }
}

impl SceneListener for SegmentsView {
    fn content_selected(&self, content: ContentId) {
        self.activate(content);
    }
}
