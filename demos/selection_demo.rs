//! Headless walk through a selection session.
//!
//! Builds a small labeled volume, selects segments, changes colors and the
//! voxel spacing, and logs every call the view makes on the scene.
//!
//! ```text
//! cargo run --example selection_demo
//! RUST_LOG=segments3d=debug cargo run --example selection_demo
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use segments3d::math::{Calibration, Point3, VoxelInterval};
use segments3d::mesh::TriangleMesh;
use segments3d::model::{
    Color, ColoringListener, ColoringModel, Segment, SegmentId, SelectionListener, SelectionModel,
};
use segments3d::scene::{ContentId, FocusAnimation, Scene, SceneListener};
use segments3d::volume::{DenseVolume, ImageSources, PyramidSource};
use segments3d::{SegmentsView, SpacingMode, ViewSettings};
use tracing::info;

#[derive(Default)]
struct Selection {
    selected: Mutex<Vec<Arc<Segment>>>,
    focused: Mutex<Option<SegmentId>>,
    listeners: Mutex<Vec<Weak<dyn SelectionListener>>>,
}

impl Selection {
    fn select(&self, segments: &[Arc<Segment>]) {
        *self.selected.lock() = segments.to_vec();
        let listeners: Vec<_> = self.listeners.lock().iter().filter_map(Weak::upgrade).collect();
        for listener in listeners {
            listener.selection_changed();
        }
    }
}

impl SelectionModel for Selection {
    fn selected(&self) -> Vec<Arc<Segment>> {
        self.selected.lock().clone()
    }

    fn is_focused(&self, segment: &Segment) -> bool {
        *self.focused.lock() == Some(segment.id())
    }

    fn focus(&self, segment: &Arc<Segment>) {
        *self.focused.lock() = Some(segment.id());
        let listeners: Vec<_> = self.listeners.lock().iter().filter_map(Weak::upgrade).collect();
        for listener in listeners {
            listener.focus_event(segment);
        }
    }

    fn add_listener(&self, listener: Weak<dyn SelectionListener>) {
        self.listeners.lock().push(listener);
    }
}

/// Colors segments by label from a small palette, rotated on demand.
#[derive(Default)]
struct Palette {
    offset: AtomicUsize,
    listeners: Mutex<Vec<Weak<dyn ColoringListener>>>,
}

const PALETTE: [u32; 4] = [0xFF64_C864, 0xFF64_96FF, 0xFFE6_6464, 0xFFFF_DC50];

impl Palette {
    fn rotate(&self) {
        self.offset.fetch_add(1, Ordering::SeqCst);
        let listeners: Vec<_> = self.listeners.lock().iter().filter_map(Weak::upgrade).collect();
        for listener in listeners {
            listener.coloring_changed();
        }
    }
}

impl ColoringModel for Palette {
    #[allow(clippy::cast_possible_truncation)]
    fn color(&self, segment: &Segment) -> Color {
        let slot = (segment.label() as usize + self.offset.load(Ordering::SeqCst)) % PALETTE.len();
        Color::from_argb(PALETTE[slot])
    }

    fn add_listener(&self, listener: Weak<dyn ColoringListener>) {
        self.listeners.lock().push(listener);
    }
}

/// A scene that only logs.
#[derive(Default)]
struct LoggingScene {
    contents: Mutex<Vec<String>>,
}

impl Scene for LoggingScene {
    fn add_mesh(&self, content: ContentId, name: &str, mesh: &TriangleMesh, color: Color) {
        info!(?content, name, triangles = mesh.triangle_count(), ?color, "add mesh");
        self.contents.lock().push(name.to_owned());
    }

    fn remove_content(&self, name: &str) {
        info!(name, "remove content");
        self.contents.lock().retain(|n| n != name);
    }

    fn content_count(&self) -> usize {
        self.contents.lock().len()
    }

    fn set_color(&self, content: ContentId, color: Color) {
        info!(?content, ?color, "set color");
    }

    fn set_transparency(&self, _content: ContentId, _transparency: f32) {}

    fn set_locked(&self, _content: ContentId, _locked: bool) {}

    fn set_auto_adjust_view(&self, _enabled: bool) {}

    fn animate_to(&self, content: ContentId, animation: &FocusAnimation) {
        info!(?content, duration = ?animation.duration, zoom = animation.zoom, "animate camera");
    }

    fn add_listener(&self, _listener: Weak<dyn SceneListener>) {}
}

fn main() -> segments3d::Result<()> {
    // Default: WARN for everything, INFO for segments3d.
    // Override with RUST_LOG env var (e.g. RUST_LOG=segments3d=debug).
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into())
        .add_directive("selection_demo=info".parse().unwrap_or_default())
        .add_directive("segments3d=info".parse().unwrap_or_default());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    // Three nuclei of different sizes in a 64 x 64 x 8 stack.
    let mut volume = DenseVolume::new([64, 64, 8]);
    volume.fill(VoxelInterval::new([4, 4, 1], [13, 13, 5]), 1);
    volume.fill(VoxelInterval::new([24, 6, 2], [29, 11, 4]), 2);
    volume.fill(VoxelInterval::new([40, 30, 0], [59, 49, 7]), 3);
    let source = PyramidSource::halving("nuclei", Calibration::new(0.2, 0.2, 1.0), &volume, 3);
    let mut sources = ImageSources::new();
    sources.insert("nuclei", Arc::new(source));

    let segments: Vec<Arc<Segment>> = [(1, 8.0, 8.0, 2.0), (2, 26.0, 8.0, 3.0), (3, 50.0, 40.0, 3.0)]
        .into_iter()
        .map(|(label, x, y, z)| {
            Arc::new(Segment::new(
                SegmentId::new(label),
                "nuclei",
                label,
                Point3::new(x * 0.2, y * 0.2, z),
            ))
        })
        .collect();

    let selection = Arc::new(Selection::default());
    let palette = Arc::new(Palette::default());
    let view = SegmentsView::builder(selection.clone(), palette.clone(), Arc::new(sources))
        .with_scene(Arc::new(LoggingScene::default()))
        .with_settings(ViewSettings::default().with_objects_name("nuclei"))
        .build()?;

    info!("selecting nuclei 1 and 2");
    selection.select(&segments[..2]);

    info!("selecting nuclei 2 and 3");
    selection.select(&segments[1..]);

    info!("focusing nucleus 3");
    selection.focus(&segments[2]);

    info!("rotating palette");
    palette.rotate();

    info!("forcing voxel spacing 0.4");
    let report = view.set_voxel_spacing(SpacingMode::Forced(0.4))?;
    info!(added = report.added.len(), removed = report.removed.len(), "rebuilt");

    view.close();
    Ok(())
}
