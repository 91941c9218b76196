use std::sync::Arc;

use rayon::prelude::*;
use tracing::debug;

use crate::model::{Color, ColoringListener, Segment};
use crate::scene::ContentId;

use super::SegmentsView;

impl SegmentsView {
    /// Recolors every displayed segment from the coloring model.
    ///
    /// Colors are computed and applied on the worker pool, independently per
    /// content. Geometry, the index structure and segment caches are left
    /// alone. The displayed set is snapshotted first, so a content removed by
    /// a concurrent reconciliation may still receive one `set_color` call;
    /// scenes ignore unknown content.
    pub fn update_colors(&self) {
        if self.is_closed() {
            return;
        }
        let Some(scene) = self.scene() else {
            return;
        };

        let targets: Vec<(ContentId, Arc<Segment>)> = self
            .session
            .lock()
            .index
            .iter()
            .map(|(id, content)| (id, Arc::clone(&content.segment)))
            .collect();

        let colors: Vec<(ContentId, Color)> = self.pool.install(|| {
            targets
                .par_iter()
                .map(|(id, segment)| {
                    let color = self.coloring.color(segment);
                    scene.set_color(*id, color);
                    (*id, color)
                })
                .collect()
        });

        let mut session = self.session.lock();
        for (id, color) in colors {
            if let Some(content) = session.index.get_mut(id) {
                content.color = color;
            }
        }
        debug!(recolored = session.index.len(), "applied segment colors");
    }
}

impl ColoringListener for SegmentsView {
    fn coloring_changed(&self) {
        self.update_colors();
    }
}
