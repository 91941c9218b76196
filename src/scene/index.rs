use std::collections::HashMap;
use std::sync::Arc;

use slotmap::SlotMap;

use crate::error::PreconditionError;
use crate::mesh::TriangleMesh;
use crate::model::{Color, Segment, SegmentId};

use super::ContentId;

/// A segment's mesh as displayed in the scene.
#[derive(Debug, Clone)]
pub struct MeshContent {
    pub segment: Arc<Segment>,
    /// Scene name, `<objects name>_<label>`.
    pub name: String,
    pub mesh: Arc<TriangleMesh>,
    pub color: Color,
    pub transparency: f32,
    pub locked: bool,
}

/// Bidirectional segment/content index.
///
/// Contents live in an arena keyed by [`ContentId`], each pointing back to
/// its segment; a forward map resolves segments to contents. Both sides are
/// only changed together, so a segment has at most one content and every
/// content has exactly one segment.
#[derive(Debug, Default)]
pub struct ContentIndex {
    contents: SlotMap<ContentId, MeshContent>,
    by_segment: HashMap<SegmentId, ContentId>,
}

impl ContentIndex {
    /// Creates a new, empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a content and returns its ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the content's segment is already indexed.
    pub fn insert(&mut self, content: MeshContent) -> Result<ContentId, PreconditionError> {
        let segment = content.segment.id();
        if self.by_segment.contains_key(&segment) {
            return Err(PreconditionError::AlreadyIndexed(segment));
        }
        let id = self.contents.insert(content);
        self.by_segment.insert(segment, id);
        Ok(id)
    }

    /// Removes the content of `segment`, if any.
    pub fn remove(&mut self, segment: SegmentId) -> Option<(ContentId, MeshContent)> {
        let id = self.by_segment.remove(&segment)?;
        self.contents.remove(id).map(|content| (id, content))
    }

    /// Removes every content.
    pub fn drain(&mut self) -> Vec<(ContentId, MeshContent)> {
        self.by_segment.clear();
        self.contents.drain().collect()
    }

    #[must_use]
    pub fn contains(&self, segment: SegmentId) -> bool {
        self.by_segment.contains_key(&segment)
    }

    #[must_use]
    pub fn content_of(&self, segment: SegmentId) -> Option<ContentId> {
        self.by_segment.get(&segment).copied()
    }

    #[must_use]
    pub fn segment_of(&self, content: ContentId) -> Option<&Arc<Segment>> {
        self.contents.get(content).map(|c| &c.segment)
    }

    #[must_use]
    pub fn get(&self, content: ContentId) -> Option<&MeshContent> {
        self.contents.get(content)
    }

    pub fn get_mut(&mut self, content: ContentId) -> Option<&mut MeshContent> {
        self.contents.get_mut(content)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ContentId, &MeshContent)> {
        self.contents.iter()
    }

    /// Indexed segments, in no particular order.
    pub fn segments(&self) -> impl Iterator<Item = SegmentId> + '_ {
        self.by_segment.keys().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.contents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    /// Checks that both directions are exact inverses.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.by_segment.len() == self.contents.len()
            && self.by_segment.iter().all(|(segment, &id)| {
                self.contents
                    .get(id)
                    .is_some_and(|content| content.segment.id() == *segment)
            })
    }
}
