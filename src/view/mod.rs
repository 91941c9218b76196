//! Keeps the scene in sync with the selection model.
//!
//! A [`SegmentsView`] owns the content index and a mesh worker pool. Every
//! structural scene change happens inside one reconciliation session,
//! guarded by a single lock over the index: a pass computes the target set
//! from the selection model, builds missing meshes on the pool, then commits
//! additions and removals to scene and index together.

mod builder;
mod color_sync;
mod selection_bridge;
mod settings;

pub use builder::SegmentsViewBuilder;
pub use settings::ViewSettings;

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use rayon::prelude::*;
use tracing::{debug, error, info, warn};

use crate::error::{BuildError, PreconditionError, Result};
use crate::mesh::{MeshExtractor, MeshSmoother};
use crate::model::{ColoringModel, Segment, SegmentId, SelectionModel};
use crate::operations::{BuildMesh, MeshParams, SegmentMesh, SpacingMode};
use crate::scene::{ContentId, ContentIndex, MeshContent, Scene, SceneListener};
use crate::volume::ImageSourcesModel;

/// Creates a scene on first use.
pub type SceneFactory = Box<dyn Fn() -> Arc<dyn Scene> + Send + Sync>;

/// Outcome of one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcileReport {
    /// Segments whose content was added to the scene.
    pub added: Vec<SegmentId>,
    /// Segments whose content was removed from the scene.
    pub removed: Vec<SegmentId>,
    /// Selected segments left out of the scene, with the reason.
    pub skipped: Vec<(SegmentId, BuildError)>,
}

impl ReconcileReport {
    /// Whether the pass left the scene untouched.
    #[must_use]
    pub fn is_unchanged(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// State only touched inside a reconciliation session.
#[derive(Default)]
struct Session {
    index: ContentIndex,
}

/// Displays the selected segments of a segmentation as meshes in a 3D scene.
pub struct SegmentsView {
    this: Weak<SegmentsView>,
    selection: Arc<dyn SelectionModel>,
    coloring: Arc<dyn ColoringModel>,
    sources: Arc<dyn ImageSourcesModel>,
    extractor: Arc<dyn MeshExtractor>,
    smoother: Arc<dyn MeshSmoother>,
    settings: RwLock<ViewSettings>,
    session: Mutex<Session>,
    scene: RwLock<Option<Arc<dyn Scene>>>,
    scene_factory: Option<SceneFactory>,
    listening_to_scene: AtomicBool,
    recent_focus: Mutex<Option<SegmentId>>,
    show_in_scene: AtomicBool,
    closed: AtomicBool,
    pool: rayon::ThreadPool,
}

impl SegmentsView {
    /// Starts building a view over the given models.
    #[must_use]
    pub fn builder(
        selection: Arc<dyn SelectionModel>,
        coloring: Arc<dyn ColoringModel>,
        sources: Arc<dyn ImageSourcesModel>,
    ) -> SegmentsViewBuilder {
        SegmentsViewBuilder::new(selection, coloring, sources)
    }

    /// Synchronizes the scene with the current selection.
    ///
    /// Selected segments without content are built and added; with `force`,
    /// every selected segment is removed and rebuilt from scratch. Content of
    /// segments no longer selected is removed. Segments that cannot be built
    /// are logged, reported in [`ReconcileReport::skipped`] and left out.
    ///
    /// Only one pass runs at a time; concurrent callers wait for the session.
    ///
    /// # Errors
    ///
    /// Returns a [`PreconditionError`] if content must be added while no
    /// scene is available, or a built mesh has no triangles.
    pub fn reconcile(&self, force: bool) -> Result<ReconcileReport> {
        let mut session = self.session.lock();
        if self.is_closed() {
            return Ok(ReconcileReport::default());
        }
        self.reconcile_session(&mut session, force)
    }

    fn reconcile_session(&self, session: &mut Session, force: bool) -> Result<ReconcileReport> {
        let scene = self.initialize_scene();
        let settings = self.settings.read().clone();
        let selected = self.selection.selected();
        let target: HashSet<SegmentId> = selected.iter().map(|s| s.id()).collect();
        let mut report = ReconcileReport::default();

        let mut seen = HashSet::new();
        let pending: Vec<Arc<Segment>> = selected
            .into_iter()
            .filter(|s| seen.insert(s.id()) && (force || !session.index.contains(s.id())))
            .collect();

        if force {
            info!(segments = pending.len(), "forced rebuild of selected meshes");
            for segment in &pending {
                if remove_content(&mut session.index, scene.as_deref(), segment.id()) {
                    report.removed.push(segment.id());
                }
            }
        }

        let built: Vec<(Arc<Segment>, std::result::Result<SegmentMesh, BuildError>)> =
            self.pool.install(|| {
                pending
                    .into_par_iter()
                    .map(|segment| {
                        let result = self.build(&segment, settings.mesh, force);
                        (segment, result)
                    })
                    .collect()
            });

        for (segment, result) in built {
            match result {
                Ok(mesh) => {
                    let id = segment.id();
                    add_content(&mut session.index, scene.as_deref(), &settings, segment, mesh)?;
                    report.added.push(id);
                }
                Err(e) => {
                    log_skipped(&segment, &e);
                    report.skipped.push((segment.id(), e));
                }
            }
        }

        let unselected: Vec<SegmentId> = session
            .index
            .segments()
            .filter(|id| !target.contains(id))
            .collect();
        for segment in unselected {
            if remove_content(&mut session.index, scene.as_deref(), segment) {
                self.forget_focus(segment);
                report.removed.push(segment);
            }
        }

        debug!(
            added = report.added.len(),
            removed = report.removed.len(),
            skipped = report.skipped.len(),
            displayed = session.index.len(),
            "reconciled scene with selection"
        );
        Ok(report)
    }

    fn build(
        &self,
        segment: &Segment,
        params: MeshParams,
        force: bool,
    ) -> std::result::Result<SegmentMesh, BuildError> {
        let source = self
            .sources
            .source(segment.image_id())
            .ok_or_else(|| BuildError::UnknownImage(segment.image_id().to_owned()))?;
        BuildMesh::new(segment, params).with_force(force).execute(
            source.as_ref(),
            self.extractor.as_ref(),
            self.smoother.as_ref(),
            self.coloring.as_ref(),
        )
    }

    /// Enables or disables display of the selection.
    ///
    /// Disabling removes the content of every selected segment but leaves
    /// the selection untouched; enabling reconciles.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`SegmentsView::reconcile`].
    pub fn set_show_in_scene(&self, enabled: bool) -> Result<ReconcileReport> {
        let mut session = self.session.lock();
        self.show_in_scene.store(enabled, Ordering::SeqCst);
        if self.is_closed() {
            return Ok(ReconcileReport::default());
        }
        if enabled {
            return self.reconcile_session(&mut session, false);
        }

        let scene = self.scene();
        let mut report = ReconcileReport::default();
        for segment in self.selection.selected() {
            if remove_content(&mut session.index, scene.as_deref(), segment.id()) {
                self.forget_focus(segment.id());
                report.removed.push(segment.id());
            }
        }
        Ok(report)
    }

    /// Lets `segment` be focused again once its content is gone.
    fn forget_focus(&self, segment: SegmentId) {
        let mut recent = self.recent_focus.lock();
        if *recent == Some(segment) {
            *recent = None;
        }
    }

    #[must_use]
    pub fn show_in_scene(&self) -> bool {
        self.show_in_scene.load(Ordering::SeqCst)
    }

    /// Returns the scene, creating it through the factory and registering
    /// as its listener if needed.
    pub fn initialize_scene(&self) -> Option<Arc<dyn Scene>> {
        let scene = {
            let mut slot = self.scene.write();
            if slot.is_none() {
                if let Some(factory) = &self.scene_factory {
                    *slot = Some(factory());
                }
            }
            slot.clone()?
        };

        scene.show();
        if !self.listening_to_scene.swap(true, Ordering::SeqCst) {
            let listener: Weak<dyn SceneListener> = self.this.clone();
            scene.add_listener(listener);
        }
        Some(scene)
    }

    /// The scene, if one has been provided or created.
    #[must_use]
    pub fn scene(&self) -> Option<Arc<dyn Scene>> {
        self.scene.read().clone()
    }

    /// Removes all content and stops reacting to events.
    pub fn close(&self) {
        let mut session = self.session.lock();
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        let scene = self.scene();
        for (_, content) in session.index.drain() {
            if let Some(scene) = &scene {
                scene.remove_content(&content.name);
            }
        }
        *self.recent_focus.lock() = None;
        info!("3D view closed");
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Segments currently displayed.
    #[must_use]
    pub fn displayed_segments(&self) -> Vec<SegmentId> {
        let mut segments: Vec<_> = self.session.lock().index.segments().collect();
        segments.sort_unstable();
        segments
    }

    #[must_use]
    pub fn content_of(&self, segment: SegmentId) -> Option<ContentId> {
        self.session.lock().index.content_of(segment)
    }

    #[must_use]
    pub fn segment_of(&self, content: ContentId) -> Option<Arc<Segment>> {
        self.session.lock().index.segment_of(content).cloned()
    }

    #[must_use]
    pub fn content(&self, content: ContentId) -> Option<MeshContent> {
        self.session.lock().index.get(content).cloned()
    }

    #[must_use]
    pub fn settings(&self) -> ViewSettings {
        self.settings.read().clone()
    }

    /// Name prefix of content added from now on. Displayed content keeps
    /// the name it was added under.
    pub fn set_objects_name(&self, name: impl Into<String>) {
        self.settings.write().objects_name = name.into();
    }

    /// Transparency of content added from now on.
    ///
    /// # Errors
    ///
    /// Returns an error if `transparency` is outside `[0, 1]`.
    pub fn set_transparency(&self, transparency: f32) -> Result<()> {
        settings::check_transparency(transparency)?;
        self.settings.write().transparency = transparency;
        Ok(())
    }

    pub fn set_mesh_smoothing_iterations(&self, iterations: u32) {
        self.settings.write().mesh.smoothing_iterations = iterations;
    }

    pub fn set_voxel_budget(&self, voxels: u64) {
        self.settings.write().mesh.voxel_budget = voxels;
    }

    /// Voxel cap of the bounding box flood fill, used for boxes computed
    /// from now on.
    ///
    /// # Errors
    ///
    /// Returns an error if `voxels` is zero.
    pub fn set_flood_fill_cap(&self, voxels: u64) -> Result<()> {
        settings::check_at_least_one("flood fill voxel cap", voxels)?;
        self.settings.write().mesh.flood_fill_cap = voxels;
        Ok(())
    }

    pub fn set_focus_animation_duration(&self, duration: Duration) {
        self.settings.write().focus.duration = duration;
    }

    /// # Errors
    ///
    /// Returns an error if `steps` is zero.
    pub fn set_focus_animation_steps(&self, steps: u32) -> Result<()> {
        settings::check_at_least_one("focus animation steps", u64::from(steps))?;
        self.settings.write().focus.steps = steps;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if `zoom` is not finite and positive.
    pub fn set_focus_zoom_level(&self, zoom: f64) -> Result<()> {
        settings::check_positive("focus zoom level", zoom)?;
        self.settings.write().focus.zoom = zoom;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if `extent` is negative or not finite.
    pub fn set_focus_min_lateral_extent(&self, extent: f64) -> Result<()> {
        settings::check_non_negative("focus minimum lateral extent", extent)?;
        self.settings.write().focus.min_lateral_extent = extent;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if `extent` is negative or not finite.
    pub fn set_focus_min_axial_extent(&self, extent: f64) -> Result<()> {
        settings::check_non_negative("focus minimum axial extent", extent)?;
        self.settings.write().focus.min_axial_extent = extent;
        Ok(())
    }

    /// Changes how the resolution level is chosen. A change rebuilds every
    /// displayed mesh.
    ///
    /// # Errors
    ///
    /// Returns an error if a forced spacing is not finite and positive, or
    /// the errors of [`SegmentsView::reconcile`].
    pub fn set_voxel_spacing(&self, spacing: SpacingMode) -> Result<ReconcileReport> {
        settings::check_spacing(spacing)?;
        {
            let mut settings = self.settings.write();
            if settings.mesh.spacing == spacing {
                return Ok(ReconcileReport::default());
            }
            settings.mesh.spacing = spacing;
        }

        info!(?spacing, "voxel spacing changed, rebuilding all meshes");
        if !self.show_in_scene() {
            return Ok(ReconcileReport::default());
        }
        self.reconcile(true)
    }
}

fn add_content(
    index: &mut ContentIndex,
    scene: Option<&dyn Scene>,
    settings: &ViewSettings,
    segment: Arc<Segment>,
    built: SegmentMesh,
) -> std::result::Result<ContentId, PreconditionError> {
    let name = format!("{}_{}", settings.objects_name, segment.label());
    if built.mesh.is_empty() {
        return Err(PreconditionError::EmptyMesh(name));
    }
    let scene = scene.ok_or(PreconditionError::SceneUninitialized)?;

    let mesh = Arc::new(built.mesh);
    let id = index.insert(MeshContent {
        segment,
        name: name.clone(),
        mesh: Arc::clone(&mesh),
        color: built.color,
        transparency: settings.transparency,
        locked: true,
    })?;

    scene.add_mesh(id, &name, &mesh, built.color);
    scene.set_transparency(id, settings.transparency);
    scene.set_locked(id, true);
    scene.set_auto_adjust_view(false);
    Ok(id)
}

fn remove_content(index: &mut ContentIndex, scene: Option<&dyn Scene>, segment: SegmentId) -> bool {
    let Some(scene) = scene else {
        return false;
    };
    match index.remove(segment) {
        Some((_, content)) => {
            scene.remove_content(&content.name);
            true
        }
        None => false,
    }
}

fn log_skipped(segment: &Segment, error: &BuildError) {
    match error {
        BuildError::LabelNotFound { .. } => {
            warn!(segment = %segment.id(), label = segment.label(), %error, "no mesh for segment");
        }
        _ => {
            error!(segment = %segment.id(), label = segment.label(), %error, "could not create mesh of segment");
        }
    }
}
