use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::math::{Aabb, Point3};

/// Stable, opaque identity of a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SegmentId(u64);

impl SegmentId {
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One labeled region of a segmentation.
///
/// Segments are owned by the segmentation source and shared as
/// `Arc<Segment>`. The bounding box and the vertex buffer are caches filled
/// lazily while building meshes; both sit behind locks so a segment can be
/// shared across mesh workers.
#[derive(Debug)]
pub struct Segment {
    id: SegmentId,
    image_id: String,
    label: u64,
    position: Point3,
    bounding_box: RwLock<Option<Aabb>>,
    mesh: RwLock<Option<Arc<[f32]>>>,
}

impl Segment {
    /// Creates a segment with no cached bounding box or mesh.
    ///
    /// `position` is a calibrated point inside the segment, used as the
    /// flood fill seed.
    #[must_use]
    pub fn new(id: SegmentId, image_id: impl Into<String>, label: u64, position: Point3) -> Self {
        Self {
            id,
            image_id: image_id.into(),
            label,
            position,
            bounding_box: RwLock::new(None),
            mesh: RwLock::new(None),
        }
    }

    /// Seeds the bounding box cache, e.g. from a segment table.
    #[must_use]
    pub fn with_bounding_box(self, bounding_box: Aabb) -> Self {
        *self.bounding_box.write() = Some(bounding_box);
        self
    }

    #[must_use]
    pub fn id(&self) -> SegmentId {
        self.id
    }

    /// Identifier of the image whose label source holds this segment.
    #[must_use]
    pub fn image_id(&self) -> &str {
        &self.image_id
    }

    /// Label value of the segment in its label image.
    #[must_use]
    pub fn label(&self) -> u64 {
        self.label
    }

    #[must_use]
    pub fn position(&self) -> Point3 {
        self.position
    }

    #[must_use]
    pub fn bounding_box(&self) -> Option<Aabb> {
        *self.bounding_box.read()
    }

    pub fn set_bounding_box(&self, bounding_box: Option<Aabb>) {
        *self.bounding_box.write() = bounding_box;
    }

    /// Cached vertex triplets in calibrated units, before smoothing.
    #[must_use]
    pub fn mesh(&self) -> Option<Arc<[f32]>> {
        self.mesh.read().clone()
    }

    pub fn set_mesh(&self, mesh: Option<Arc<[f32]>>) {
        *self.mesh.write() = mesh;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn caches_start_empty() {
        let segment = Segment::new(SegmentId::new(7), "labels", 3, Point3::origin());
        assert!(segment.bounding_box().is_none());
        assert!(segment.mesh().is_none());
        assert_eq!(segment.id().to_string(), "#7");
    }

    #[test]
    fn caches_can_be_set_through_shared_reference() {
        let segment = Arc::new(Segment::new(SegmentId::new(1), "labels", 1, Point3::origin()));
        let aabb = Aabb::new(Point3::origin(), Point3::new(1.0, 2.0, 3.0));
        segment.set_bounding_box(Some(aabb));
        segment.set_mesh(Some(Arc::from(vec![0.0_f32; 9])));

        assert_eq!(segment.bounding_box(), Some(aabb));
        assert_eq!(segment.mesh().unwrap().len(), 9);
    }
}
