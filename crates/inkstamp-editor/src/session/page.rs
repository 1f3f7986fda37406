//! Per-page editing record: placements, selection, history and the
//! fingerprints of signatures already baked into the page.

use crate::history::{PlacementHistory, SnapshotToken};
use crate::placement::{Fingerprint, Placement, PlacementField, PlacementId, PlacementLimits};
use inkstamp_core::Size;
use std::collections::HashSet;

/// Editing state of one page.
///
/// Placement order is z-order: later entries draw over earlier ones.
#[derive(Debug, Clone)]
pub struct PageEditor {
    size: Size,
    placements: Vec<Placement>,
    active_id: Option<PlacementId>,
    history: PlacementHistory,
    baked: HashSet<Fingerprint>,
}

impl PageEditor {
    pub(crate) fn new(size: Size, history_depth: usize) -> Self {
        Self {
            size,
            placements: Vec::new(),
            active_id: None,
            history: PlacementHistory::new(history_depth),
            baked: HashSet::new(),
        }
    }

    /// Native page size in pixels.
    pub fn size(&self) -> Size {
        self.size
    }

    pub(crate) fn set_size(&mut self, size: Size) {
        self.size = size;
    }

    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    pub fn active_id(&self) -> Option<PlacementId> {
        self.active_id
    }

    pub fn active(&self) -> Option<&Placement> {
        self.active_id.and_then(|id| self.get(id))
    }

    pub fn get(&self, id: PlacementId) -> Option<&Placement> {
        self.placements.iter().find(|p| p.id == id)
    }

    pub fn history(&self) -> &PlacementHistory {
        &self.history
    }

    /// Fingerprints of signatures baked into this page during the session.
    pub fn baked_fingerprints(&self) -> &HashSet<Fingerprint> {
        &self.baked
    }

    /// Distinct signatures across unsaved placements and earlier bakes.
    pub fn distinct_signature_count(&self) -> usize {
        self.placements
            .iter()
            .map(|p| p.source.fingerprint())
            .chain(self.baked.iter().copied())
            .collect::<HashSet<_>>()
            .len()
    }

    pub(crate) fn snapshot(&mut self) -> SnapshotToken {
        self.history.register_snapshot(&self.placements)
    }

    pub(crate) fn revert_snapshot(&mut self, token: SnapshotToken) {
        self.history.revert_snapshot(token);
    }

    /// Appends a placement and makes it active.
    pub(crate) fn push(&mut self, placement: Placement) {
        self.active_id = Some(placement.id);
        self.placements.push(placement);
    }

    /// Removes a placement. If it was active, the most recent remaining one
    /// becomes active.
    pub(crate) fn remove(&mut self, id: PlacementId) -> Option<Placement> {
        let index = self.placements.iter().position(|p| p.id == id)?;
        let removed = self.placements.remove(index);
        if self.active_id == Some(id) {
            self.active_id = self.placements.last().map(|p| p.id);
        }
        Some(removed)
    }

    pub(crate) fn set_active(&mut self, id: Option<PlacementId>) {
        self.active_id = id;
    }

    pub(crate) fn apply(
        &mut self,
        id: PlacementId,
        field: PlacementField,
        limits: &PlacementLimits,
    ) -> Option<&Placement> {
        let size = self.size;
        let placement = self.placements.iter_mut().find(|p| p.id == id)?;
        placement.apply(field, size, limits);
        Some(placement)
    }

    pub(crate) fn undo(&mut self) -> bool {
        match self.history.undo(&self.placements) {
            Some(previous) => {
                self.replace_all(previous);
                true
            }
            None => false,
        }
    }

    pub(crate) fn redo(&mut self) -> bool {
        match self.history.redo(&self.placements) {
            Some(next) => {
                self.replace_all(next);
                true
            }
            None => false,
        }
    }

    /// Clears the page after its placements were baked.
    pub(crate) fn finish_bake(&mut self, fingerprints: impl IntoIterator<Item = Fingerprint>) {
        self.placements.clear();
        self.active_id = None;
        self.history.clear();
        self.baked.extend(fingerprints);
    }

    fn replace_all(&mut self, placements: Vec<Placement>) {
        self.placements = placements;
        let active_survives = self
            .active_id
            .is_some_and(|id| self.placements.iter().any(|p| p.id == id));
        if !active_survives {
            self.active_id = self.placements.last().map(|p| p.id);
        }
    }
}
