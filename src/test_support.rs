//! In-memory collaborators for unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::math::{Calibration, Point3, VoxelInterval};
use crate::mesh::{MeshExtractor, TriangleMesh, VoxelFaceExtractor};
use crate::model::{
    Color, ColoringListener, ColoringModel, Segment, SegmentId, SelectionListener, SelectionModel,
};
use crate::scene::{ContentId, FocusAnimation, Scene, SceneListener};
use crate::volume::{CroppedVolume, DenseVolume, ImageSources, PyramidSource};

/// Counts extractions while delegating to [`VoxelFaceExtractor`].
#[derive(Default)]
pub struct CountingExtractor {
    calls: AtomicUsize,
}

impl CountingExtractor {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl MeshExtractor for CountingExtractor {
    fn extract(&self, volume: &CroppedVolume<'_>, label: u64) -> Vec<f32> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        VoxelFaceExtractor.extract(volume, label)
    }
}

/// Colors every segment alike until told otherwise.
pub struct FixedColoring {
    color: Mutex<Color>,
    listeners: Mutex<Vec<Weak<dyn ColoringListener>>>,
}

impl FixedColoring {
    pub fn new(color: Color) -> Self {
        Self {
            color: Mutex::new(color),
            listeners: Mutex::new(Vec::new()),
        }
    }

    pub fn set_color(&self, color: Color) {
        *self.color.lock() = color;
        let listeners = self.listeners.lock().clone();
        for listener in listeners.iter().filter_map(Weak::upgrade) {
            listener.coloring_changed();
        }
    }
}

impl ColoringModel for FixedColoring {
    fn color(&self, _segment: &Segment) -> Color {
        *self.color.lock()
    }

    fn add_listener(&self, listener: Weak<dyn ColoringListener>) {
        self.listeners.lock().push(listener);
    }
}

/// A selection model driven by the test.
#[derive(Default)]
pub struct ScriptedSelection {
    selected: Mutex<Vec<Arc<Segment>>>,
    focused: Mutex<Option<SegmentId>>,
    focus_calls: AtomicUsize,
    listeners: Mutex<Vec<Weak<dyn SelectionListener>>>,
}

impl ScriptedSelection {
    /// Replaces the selection and notifies listeners.
    pub fn set_selected(&self, segments: &[Arc<Segment>]) {
        *self.selected.lock() = segments.to_vec();
        for listener in self.listeners() {
            listener.selection_changed();
        }
    }

    /// Replaces the selection without notifying.
    pub fn set_selected_silently(&self, segments: &[Arc<Segment>]) {
        *self.selected.lock() = segments.to_vec();
    }

    pub fn focused(&self) -> Option<SegmentId> {
        *self.focused.lock()
    }

    /// Number of `focus` calls received.
    pub fn focus_calls(&self) -> usize {
        self.focus_calls.load(Ordering::SeqCst)
    }

    fn listeners(&self) -> Vec<Arc<dyn SelectionListener>> {
        self.listeners.lock().iter().filter_map(Weak::upgrade).collect()
    }
}

impl SelectionModel for ScriptedSelection {
    fn selected(&self) -> Vec<Arc<Segment>> {
        self.selected.lock().clone()
    }

    fn is_focused(&self, segment: &Segment) -> bool {
        *self.focused.lock() == Some(segment.id())
    }

    fn focus(&self, segment: &Arc<Segment>) {
        self.focus_calls.fetch_add(1, Ordering::SeqCst);
        *self.focused.lock() = Some(segment.id());
        for listener in self.listeners() {
            listener.focus_event(segment);
        }
    }

    fn add_listener(&self, listener: Weak<dyn SelectionListener>) {
        self.listeners.lock().push(listener);
    }
}

/// A mesh added to a [`RecordingScene`].
#[derive(Debug, Clone)]
pub struct SceneMesh {
    pub content: ContentId,
    pub mesh: TriangleMesh,
    pub color: Color,
    pub transparency: f32,
    pub locked: bool,
}

/// Structural calls received by a [`RecordingScene`], in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneCall {
    Add(String),
    Remove(String),
}

/// A scene that records what it is asked to do.
#[derive(Default)]
pub struct RecordingScene {
    meshes: Mutex<HashMap<String, SceneMesh>>,
    calls: Mutex<Vec<SceneCall>>,
    animations: Mutex<Vec<ContentId>>,
    listeners: Mutex<Vec<Weak<dyn SceneListener>>>,
    foreign: AtomicUsize,
    shown: AtomicUsize,
    auto_adjust: Mutex<Option<bool>>,
}

impl RecordingScene {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Adds `count` contents not owned by any view.
    pub fn with_foreign_content(count: usize) -> Arc<Self> {
        let scene = Self::default();
        scene.foreign.store(count, Ordering::SeqCst);
        Arc::new(scene)
    }

    /// Sorted names of the contents added by views.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.meshes.lock().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn mesh(&self, name: &str) -> Option<SceneMesh> {
        self.meshes.lock().get(name).cloned()
    }

    pub fn calls(&self) -> Vec<SceneCall> {
        self.calls.lock().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    pub fn animations(&self) -> Vec<ContentId> {
        self.animations.lock().clone()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }

    pub fn shown(&self) -> usize {
        self.shown.load(Ordering::SeqCst)
    }

    pub fn auto_adjust(&self) -> Option<bool> {
        *self.auto_adjust.lock()
    }

    /// Simulates the user picking `content`.
    pub fn click(&self, content: ContentId) {
        let listeners: Vec<_> = self.listeners.lock().iter().filter_map(Weak::upgrade).collect();
        for listener in listeners {
            listener.content_selected(content);
        }
    }

    fn update(&self, content: ContentId, f: impl FnOnce(&mut SceneMesh)) {
        if let Some(mesh) = self.meshes.lock().values_mut().find(|m| m.content == content) {
            f(mesh);
        }
    }
}

impl Scene for RecordingScene {
    fn add_mesh(&self, content: ContentId, name: &str, mesh: &TriangleMesh, color: Color) {
        self.calls.lock().push(SceneCall::Add(name.to_owned()));
        self.meshes.lock().insert(
            name.to_owned(),
            SceneMesh {
                content,
                mesh: mesh.clone(),
                color,
                transparency: 0.0,
                locked: false,
            },
        );
    }

    fn remove_content(&self, name: &str) {
        self.calls.lock().push(SceneCall::Remove(name.to_owned()));
        self.meshes.lock().remove(name);
    }

    fn content_count(&self) -> usize {
        self.meshes.lock().len() + self.foreign.load(Ordering::SeqCst)
    }

    fn set_color(&self, content: ContentId, color: Color) {
        self.update(content, |m| m.color = color);
    }

    fn set_transparency(&self, content: ContentId, transparency: f32) {
        self.update(content, |m| m.transparency = transparency);
    }

    fn set_locked(&self, content: ContentId, locked: bool) {
        self.update(content, |m| m.locked = locked);
    }

    fn set_auto_adjust_view(&self, enabled: bool) {
        *self.auto_adjust.lock() = Some(enabled);
    }

    fn animate_to(&self, content: ContentId, _animation: &FocusAnimation) {
        self.animations.lock().push(content);
    }

    fn add_listener(&self, listener: Weak<dyn SceneListener>) {
        self.listeners.lock().push(listener);
    }

    fn show(&self) {
        self.shown.fetch_add(1, Ordering::SeqCst);
    }
}

/// A 32 x 32 x 4 volume with a 4 x 4 x 2 block per label in `labels`,
/// placed side by side along x, exposed as image `"labels"` with two levels.
pub fn block_sources(labels: &[u64]) -> ImageSources {
    let mut volume = DenseVolume::new([32, 32, 4]);
    for (label, x) in labels.iter().zip((2_i64..).step_by(6)) {
        volume.fill(VoxelInterval::new([x, 2, 1], [x + 3, 5, 2]), *label);
    }
    let source = PyramidSource::halving("labels", Calibration::new(1.0, 1.0, 1.0), &volume, 2);
    let mut sources = ImageSources::new();
    sources.insert("labels", Arc::new(source));
    sources
}

/// The segment seeded inside the block of `label` built by [`block_sources`],
/// where `slot` is the label's position in the list.
pub fn block_segment(label: u64, slot: usize) -> Arc<Segment> {
    #[allow(clippy::cast_precision_loss)]
    let x = 3.0 + 6.0 * slot as f64;
    Arc::new(Segment::new(
        SegmentId::new(label),
        "labels",
        label,
        Point3::new(x, 3.0, 1.0),
    ))
}
