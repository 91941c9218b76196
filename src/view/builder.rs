use std::num::NonZeroUsize;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};

use crate::error::Result;
use crate::mesh::{LaplacianSmoother, MeshExtractor, MeshSmoother, VoxelFaceExtractor};
use crate::model::{ColoringModel, SelectionModel};
use crate::scene::Scene;
use crate::volume::ImageSourcesModel;

use super::{SceneFactory, SegmentsView, Session, ViewSettings};

/// Configures and creates a [`SegmentsView`].
pub struct SegmentsViewBuilder {
    selection: Arc<dyn SelectionModel>,
    coloring: Arc<dyn ColoringModel>,
    sources: Arc<dyn ImageSourcesModel>,
    extractor: Arc<dyn MeshExtractor>,
    smoother: Arc<dyn MeshSmoother>,
    settings: ViewSettings,
    scene: Option<Arc<dyn Scene>>,
    scene_factory: Option<SceneFactory>,
    threads: Option<usize>,
}

impl SegmentsViewBuilder {
    pub(super) fn new(
        selection: Arc<dyn SelectionModel>,
        coloring: Arc<dyn ColoringModel>,
        sources: Arc<dyn ImageSourcesModel>,
    ) -> Self {
        Self {
            selection,
            coloring,
            sources,
            extractor: Arc::new(VoxelFaceExtractor),
            smoother: Arc::new(LaplacianSmoother::default()),
            settings: ViewSettings::default(),
            scene: None,
            scene_factory: None,
            threads: None,
        }
    }

    /// Uses an existing scene.
    #[must_use]
    pub fn with_scene(mut self, scene: Arc<dyn Scene>) -> Self {
        self.scene = Some(scene);
        self
    }

    /// Creates the scene lazily, the first time content is shown.
    #[must_use]
    pub fn with_scene_factory(mut self, factory: impl Fn() -> Arc<dyn Scene> + Send + Sync + 'static) -> Self {
        self.scene_factory = Some(Box::new(factory));
        self
    }

    #[must_use]
    pub fn with_extractor(mut self, extractor: Arc<dyn MeshExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    #[must_use]
    pub fn with_smoother(mut self, smoother: Arc<dyn MeshSmoother>) -> Self {
        self.smoother = smoother;
        self
    }

    #[must_use]
    pub fn with_settings(mut self, settings: ViewSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Number of mesh workers. Defaults to the available parallelism.
    #[must_use]
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads.max(1));
        self
    }

    /// Creates the view and registers it with the selection and coloring
    /// models.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings are invalid or the worker pool
    /// cannot be started.
    pub fn build(self) -> Result<Arc<SegmentsView>> {
        self.settings.validate()?;

        let threads = self
            .threads
            .unwrap_or_else(|| std::thread::available_parallelism().map_or(1, NonZeroUsize::get));
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("segments3d-mesh-{i}"))
            .build()?;

        let view = Arc::new_cyclic(|this| SegmentsView {
            this: this.clone(),
            selection: self.selection,
            coloring: self.coloring,
            sources: self.sources,
            extractor: self.extractor,
            smoother: self.smoother,
            settings: RwLock::new(self.settings),
            session: Mutex::new(Session::default()),
            scene: RwLock::new(self.scene),
            scene_factory: self.scene_factory,
            listening_to_scene: AtomicBool::new(false),
            recent_focus: Mutex::new(None),
            show_in_scene: AtomicBool::new(true),
            closed: AtomicBool::new(false),
            pool,
        });

        let listener: Weak<SegmentsView> = Arc::downgrade(&view);
        view.selection.add_listener(listener.clone());
        view.coloring.add_listener(listener);

        Ok(view)
    }
}
