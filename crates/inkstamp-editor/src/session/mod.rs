//! Editing session.
//!
//! A session is created when a document is opened and dropped when it is
//! closed; nothing in it is persisted. It owns one [`PageEditor`] per page
//! that has been touched, plus the services placements need: where
//! signatures come from and where baked pages go.
//!
//! Every discrete action (add, remove, duplicate, color change) records one
//! undo snapshot of the page's list before it changes anything. Field
//! mutations through [`EditingSession::mutate`] do not; gestures frame them
//! with their own snapshot.

mod page;
mod saving;

pub use page::PageEditor;

use crate::bake::{BakeCoordinator, PageSink};
use crate::compositor::Compositor;
use crate::history::SnapshotToken;
use crate::metadata::PlacementRecord;
use crate::placement::{
    PageRef, Placement, PlacementField, PlacementId, PlacementLimits, SignatureImage,
};
use inkstamp_core::constants::{
    DEFAULT_DUPLICATE_OFFSET, DEFAULT_HANDLE_TOLERANCE_PX, DEFAULT_HISTORY_DEPTH,
    DEFAULT_MAX_RENDER_EDGE, DEFAULT_SAFE_REGION_MARGIN, DEFAULT_STAGGER_STEP,
    DEFAULT_WIDTH_RATIO,
};
use inkstamp_core::{BlendMode, InkColor, PlacementError, Point, Result};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

/// Provides the user's current signature artwork.
pub trait SignatureSource: Send + Sync {
    fn signature(&self) -> std::result::Result<SignatureImage, PlacementError>;
}

impl SignatureSource for SignatureImage {
    fn signature(&self) -> std::result::Result<SignatureImage, PlacementError> {
        if self.is_empty() {
            return Err(PlacementError::NoSignature {
                reason: "signature has no pixels".to_string(),
            });
        }
        Ok(self.clone())
    }
}

/// Tunables of an editing session.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorOptions {
    pub limits: PlacementLimits,
    pub default_width_ratio: f64,
    /// Offset between staggered new placements, normalized.
    pub stagger_step: f64,
    /// Offset of a duplicate from its original, normalized.
    pub duplicate_offset: f64,
    /// New placements are centered at least this far from the page edges.
    pub safe_region_margin: f64,
    pub history_depth: usize,
    pub handle_tolerance_px: f64,
    pub blend_mode: BlendMode,
    pub max_render_edge: u32,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            limits: PlacementLimits::default(),
            default_width_ratio: DEFAULT_WIDTH_RATIO,
            stagger_step: DEFAULT_STAGGER_STEP,
            duplicate_offset: DEFAULT_DUPLICATE_OFFSET,
            safe_region_margin: DEFAULT_SAFE_REGION_MARGIN,
            history_depth: DEFAULT_HISTORY_DEPTH,
            handle_tolerance_px: DEFAULT_HANDLE_TOLERANCE_PX,
            blend_mode: BlendMode::Normal,
            max_render_edge: DEFAULT_MAX_RENDER_EDGE,
        }
    }
}

impl EditorOptions {
    /// Center for the `n`-th placement added to a page.
    fn staggered_center(&self, n: usize) -> Point {
        let shift = self.stagger_step * n as f64;
        let lo = self.safe_region_margin;
        let hi = 1.0 - self.safe_region_margin;
        Point::new((0.5 + shift).clamp(lo, hi), (0.5 - shift).clamp(lo, hi))
    }
}

/// All placement state of an open document.
pub struct EditingSession {
    options: EditorOptions,
    pages: HashMap<usize, PageEditor>,
    bakes: BakeCoordinator,
    /// Pages with a pointer gesture between begin and end.
    gestures: HashSet<usize>,
    compositor: Compositor,
    sink: Arc<dyn PageSink>,
    signatures: Option<Arc<dyn SignatureSource>>,
}

impl fmt::Debug for EditingSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditingSession")
            .field("options", &self.options)
            .field("pages", &self.pages.len())
            .field("bakes_in_flight", &self.bakes.in_flight_count())
            .field("open_gestures", &self.gestures)
            .field("has_signature_source", &self.signatures.is_some())
            .finish()
    }
}

impl EditingSession {
    /// Opens an empty session.
    pub fn new(options: EditorOptions, sink: Arc<dyn PageSink>) -> Self {
        tracing::info!("Opening editing session");
        Self {
            compositor: Compositor::new(options.blend_mode, options.max_render_edge),
            options,
            pages: HashMap::new(),
            bakes: BakeCoordinator::new(),
            gestures: HashSet::new(),
            sink,
            signatures: None,
        }
    }

    pub fn with_signature_source(mut self, source: Arc<dyn SignatureSource>) -> Self {
        self.signatures = Some(source);
        self
    }

    pub fn options(&self) -> &EditorOptions {
        &self.options
    }

    /// The compositor used for bakes, also suitable for previews.
    pub fn compositor(&self) -> &Compositor {
        &self.compositor
    }

    pub fn bake_coordinator(&self) -> &BakeCoordinator {
        &self.bakes
    }

    pub fn page(&self, index: usize) -> Option<&PageEditor> {
        self.pages.get(&index)
    }

    /// Placements of a page in z-order; empty for untouched pages.
    pub fn placements(&self, index: usize) -> &[Placement] {
        self.pages
            .get(&index)
            .map(|p| p.placements())
            .unwrap_or_default()
    }

    pub fn placement(&self, index: usize, id: PlacementId) -> Option<&Placement> {
        self.pages.get(&index).and_then(|p| p.get(id))
    }

    pub fn active_id(&self, index: usize) -> Option<PlacementId> {
        self.pages.get(&index).and_then(|p| p.active_id())
    }

    /// Indices of pages with unsaved placements, ascending.
    pub fn dirty_pages(&self) -> Vec<usize> {
        let mut pages: Vec<usize> = self
            .pages
            .iter()
            .filter(|(_, p)| !p.is_empty())
            .map(|(i, _)| *i)
            .collect();
        pages.sort_unstable();
        pages
    }

    /// True while a bake for the page is in flight.
    pub fn is_locked(&self, index: usize) -> bool {
        self.bakes.is_locked(index)
    }

    /// True while a gesture on the page has begun but not ended. Saving the
    /// page is refused until then.
    pub fn has_open_gesture(&self, index: usize) -> bool {
        self.gestures.contains(&index)
    }

    pub(crate) fn open_gesture(&mut self, index: usize) {
        self.gestures.insert(index);
    }

    pub(crate) fn close_gesture(&mut self, index: usize) {
        self.gestures.remove(&index);
    }

    /// Adds a placement of `image` with default size and a staggered center.
    /// The new placement becomes active.
    pub fn add_placement(&mut self, page: PageRef, image: SignatureImage) -> Result<Placement> {
        self.ensure_unlocked(page.index)?;

        let center = self
            .options
            .staggered_center(self.placements(page.index).len());
        let placement = Placement::new(
            image,
            center,
            self.options.default_width_ratio,
            page.size,
            &self.options.limits,
        )?;

        let depth = self.options.history_depth;
        let editor = self
            .pages
            .entry(page.index)
            .or_insert_with(|| PageEditor::new(page.size, depth));
        editor.set_size(page.size);
        editor.snapshot();
        editor.push(placement.clone());
        tracing::debug!(
            "Added placement {} on page {} at {}",
            placement.id,
            page.index,
            placement.center
        );
        Ok(placement)
    }

    /// Adds a placement of the injected signature source's current artwork.
    pub fn add_signature(&mut self, page: PageRef) -> Result<Placement> {
        let source = self.signatures.as_ref().ok_or(PlacementError::NoSignature {
            reason: "no signature source configured".to_string(),
        })?;
        let image = source.signature()?;
        self.add_placement(page, image)
    }

    pub fn remove_placement(&mut self, page: usize, id: PlacementId) -> Result<()> {
        let editor = self.editor_mut(page)?;
        if editor.get(id).is_none() {
            return Err(PlacementError::UnknownPlacement { page, id }.into());
        }
        editor.snapshot();
        editor.remove(id);
        tracing::debug!("Removed placement {} from page {}", id, page);
        Ok(())
    }

    /// Copies a placement under a new id, offset from the original. The copy
    /// becomes active.
    pub fn duplicate_placement(&mut self, page: usize, id: PlacementId) -> Result<Placement> {
        let offset = Point::new(self.options.duplicate_offset, -self.options.duplicate_offset);
        let editor = self.editor_mut(page)?;
        let original = editor
            .get(id)
            .ok_or(PlacementError::UnknownPlacement { page, id })?;
        let copy = original.duplicate(offset, editor.size());

        editor.snapshot();
        editor.push(copy.clone());
        tracing::debug!("Duplicated placement {} as {} on page {}", id, copy.id, page);
        Ok(copy)
    }

    /// Changes the selection. Selection is not part of history.
    pub fn set_active(&mut self, page: usize, id: Option<PlacementId>) -> Result<()> {
        let editor = self
            .pages
            .get_mut(&page)
            .ok_or(PlacementError::UnknownPage { page })?;
        if let Some(id) = id {
            if editor.get(id).is_none() {
                return Err(PlacementError::UnknownPlacement { page, id }.into());
            }
        }
        editor.set_active(id);
        Ok(())
    }

    /// Updates one field with clamping. Records no snapshot.
    pub fn mutate(&mut self, page: usize, id: PlacementId, field: PlacementField) -> Result<Placement> {
        let limits = self.options.limits;
        let editor = self.editor_mut(page)?;
        editor
            .apply(id, field, &limits)
            .cloned()
            .ok_or_else(|| PlacementError::UnknownPlacement { page, id }.into())
    }

    /// Discrete color change, recorded as its own undo step. Picking the
    /// color a placement already has records nothing.
    pub fn set_color(&mut self, page: usize, id: PlacementId, color: InkColor) -> Result<Placement> {
        let editor = self.editor_mut(page)?;
        let current = editor
            .get(id)
            .ok_or(PlacementError::UnknownPlacement { page, id })?;
        if current.color == color {
            return Ok(current.clone());
        }
        editor.snapshot();
        self.mutate(page, id, PlacementField::Color(color))
    }

    /// Records the current list of a page before a gesture changes it.
    pub fn register_snapshot(&mut self, page: usize) -> Result<SnapshotToken> {
        Ok(self.editor_mut(page)?.snapshot())
    }

    /// Rolls back a snapshot taken by [`register_snapshot`](Self::register_snapshot).
    ///
    /// Only history is touched, so this is allowed while the page is locked.
    /// A successful bake clears history anyway; a failed one finds it as it
    /// was before the snapshot.
    pub fn revert_snapshot(&mut self, page: usize, token: SnapshotToken) -> Result<()> {
        self.pages
            .get_mut(&page)
            .ok_or(PlacementError::UnknownPage { page })?
            .revert_snapshot(token);
        Ok(())
    }

    /// Returns `false` when there was nothing to undo.
    pub fn undo(&mut self, page: usize) -> Result<bool> {
        let undone = self.editor_mut(page)?.undo();
        if undone {
            tracing::debug!("Undo on page {}", page);
        }
        Ok(undone)
    }

    /// Returns `false` when there was nothing to redo.
    pub fn redo(&mut self, page: usize) -> Result<bool> {
        let redone = self.editor_mut(page)?.redo();
        if redone {
            tracing::debug!("Redo on page {}", page);
        }
        Ok(redone)
    }

    pub fn can_undo(&self, page: usize) -> bool {
        self.pages
            .get(&page)
            .is_some_and(|p| p.history().can_undo())
    }

    pub fn can_redo(&self, page: usize) -> bool {
        self.pages
            .get(&page)
            .is_some_and(|p| p.history().can_redo())
    }

    /// Rebuilds an editable placement from the record of a baked stamp.
    pub fn restore_from_record(
        &mut self,
        page: PageRef,
        record: &PlacementRecord,
    ) -> Result<Placement> {
        self.ensure_unlocked(page.index)?;
        let image = record.to_signature_image()?;

        let limits = self.options.limits;
        let mut placement =
            Placement::new(image, record.center, record.width_ratio, page.size, &limits)?;
        placement.apply(PlacementField::Rotation(record.rotation), page.size, &limits);
        placement.apply(PlacementField::Color(record.color), page.size, &limits);

        let depth = self.options.history_depth;
        let editor = self
            .pages
            .entry(page.index)
            .or_insert_with(|| PageEditor::new(page.size, depth));
        editor.set_size(page.size);
        editor.snapshot();
        editor.push(placement.clone());
        tracing::debug!(
            "Restored placement {} on page {} from record",
            placement.id,
            page.index
        );
        Ok(placement)
    }

    /// Distinct signatures on a page: unsaved placements plus those already
    /// baked during this session.
    pub fn distinct_signature_count(&self, page: usize) -> usize {
        self.pages
            .get(&page)
            .map(|p| p.distinct_signature_count())
            .unwrap_or(0)
    }

    /// Drops a page's placements and history without baking.
    pub fn discard_page(&mut self, page: usize) -> Result<bool> {
        self.ensure_unlocked(page)?;
        let discarded = self.pages.remove(&page).is_some();
        if discarded {
            tracing::debug!("Discarded unsaved placements on page {}", page);
        }
        Ok(discarded)
    }

    /// Ends the session. Unsaved placements are dropped, nothing is written.
    pub fn close(self) {
        let dirty = self.dirty_pages();
        if dirty.is_empty() {
            tracing::info!("Closing editing session");
        } else {
            tracing::info!(
                "Closing editing session, discarding unsaved placements on pages {:?}",
                dirty
            );
        }
    }

    fn ensure_unlocked(&self, page: usize) -> Result<()> {
        if self.bakes.is_locked(page) {
            tracing::warn!("Rejecting edit on page {}: save in progress", page);
            return Err(PlacementError::PageLocked { page }.into());
        }
        Ok(())
    }

    fn editor_mut(&mut self, page: usize) -> Result<&mut PageEditor> {
        self.ensure_unlocked(page)?;
        self.pages
            .get_mut(&page)
            .ok_or_else(|| PlacementError::UnknownPage { page }.into())
    }
}
