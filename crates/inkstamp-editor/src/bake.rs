//! Bake coordination.
//!
//! At most one bake runs per page. While it runs the page is locked: edits and
//! gestures on it are rejected. Baked pages are handed to a [`PageSink`]; the
//! engine never writes pages itself.

use crate::compositor::{Compositor, OmittedPlacement};
use crate::metadata::PlacementRecord;
use crate::placement::{Fingerprint, Placement};
use image::RgbaImage;
use inkstamp_core::{thread_safe_map, thread_safe_set, BakeError, ThreadSafeMap, ThreadSafeSet};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Receives baked pages.
pub trait PageSink: Send + Sync {
    /// Stores the new content of `page` together with the stamp records.
    fn store_page(
        &self,
        page: usize,
        image: RgbaImage,
        records: Vec<PlacementRecord>,
    ) -> inkstamp_core::Result<()>;
}

/// A page as stored by [`MemoryPageSink`].
#[derive(Debug, Clone)]
pub struct StoredPage {
    pub image: RgbaImage,
    pub records: Vec<PlacementRecord>,
}

/// In-memory sink, used by tests and headless runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryPageSink {
    pages: ThreadSafeMap<usize, StoredPage>,
}

impl MemoryPageSink {
    pub fn new() -> Self {
        Self {
            pages: thread_safe_map(),
        }
    }

    pub fn page(&self, index: usize) -> Option<StoredPage> {
        self.pages.lock().get(&index).cloned()
    }

    pub fn stored_count(&self) -> usize {
        self.pages.lock().len()
    }
}

impl PageSink for MemoryPageSink {
    fn store_page(
        &self,
        page: usize,
        image: RgbaImage,
        records: Vec<PlacementRecord>,
    ) -> inkstamp_core::Result<()> {
        self.pages.lock().insert(page, StoredPage { image, records });
        Ok(())
    }
}

/// How a finished bake went.
#[derive(Debug, Clone, PartialEq)]
pub enum BakeOutcome {
    /// Every placement was stamped.
    Complete { stamped: usize },
    /// Some placements were skipped; the rest were stamped.
    Partial {
        stamped: usize,
        omitted: Vec<OmittedPlacement>,
    },
}

impl BakeOutcome {
    pub fn stamped(&self) -> usize {
        match self {
            Self::Complete { stamped } | Self::Partial { stamped, .. } => *stamped,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete { .. })
    }
}

/// Tracks which pages have a bake in flight.
#[derive(Debug, Clone)]
pub struct BakeCoordinator {
    in_flight: ThreadSafeSet<usize>,
}

impl Default for BakeCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl BakeCoordinator {
    pub fn new() -> Self {
        Self {
            in_flight: thread_safe_set(),
        }
    }

    /// Claims `page` for a bake. The claim ends when the guard drops.
    pub fn try_acquire(&self, page: usize) -> Result<BakeGuard, BakeError> {
        if !self.in_flight.lock().insert(page) {
            tracing::warn!("Rejecting save for page {}: already in progress", page);
            return Err(BakeError::SaveInProgress { page });
        }
        Ok(BakeGuard {
            page,
            in_flight: Arc::clone(&self.in_flight),
        })
    }

    pub fn is_locked(&self, page: usize) -> bool {
        self.in_flight.lock().contains(&page)
    }

    pub fn in_flight_count(&self) -> usize {
        self.in_flight.lock().len()
    }
}

/// Exclusive claim on a page's bake slot.
#[derive(Debug)]
pub struct BakeGuard {
    page: usize,
    in_flight: ThreadSafeSet<usize>,
}

impl BakeGuard {
    pub fn page(&self) -> usize {
        self.page
    }
}

impl Drop for BakeGuard {
    fn drop(&mut self) {
        self.in_flight.lock().remove(&self.page);
    }
}

/// What a successful bake produced, before the session applies it.
#[derive(Debug)]
pub(crate) struct BakeReport {
    pub stamped: usize,
    pub omitted: Vec<OmittedPlacement>,
    pub fingerprints: HashSet<Fingerprint>,
}

impl BakeReport {
    pub(crate) fn outcome(&self) -> BakeOutcome {
        if self.omitted.is_empty() {
            BakeOutcome::Complete {
                stamped: self.stamped,
            }
        } else {
            BakeOutcome::Partial {
                stamped: self.stamped,
                omitted: self.omitted.clone(),
            }
        }
    }
}

/// Composites the page and hands it to the sink.
pub(crate) fn run_bake(
    compositor: &Compositor,
    sink: &dyn PageSink,
    page: usize,
    image: &RgbaImage,
    placements: &[Placement],
) -> Result<BakeReport, BakeError> {
    let result = compositor.bake(image, placements)?;

    let omitted_ids: HashSet<_> = result.omitted.iter().map(|o| o.id).collect();
    let fingerprints = placements
        .iter()
        .filter(|p| !omitted_ids.contains(&p.id))
        .map(|p| p.source.fingerprint())
        .collect();
    let stamped = result.records.len();

    sink.store_page(page, result.image, result.records)
        .map_err(|e| BakeError::Sink {
            page,
            reason: e.to_string(),
        })?;

    Ok(BakeReport {
        stamped,
        omitted: result.omitted,
        fingerprints,
    })
}

/// What the worker hands back: the page claim and the bake result.
pub(crate) type WorkerOutput = (BakeGuard, Result<BakeReport, BakeError>);

/// A bake running on a blocking worker.
///
/// The worker owns the page claim and returns it with its result, so the
/// page stays locked until the bake is finished through the session. A
/// pending bake that is dropped keeps the page locked until the worker
/// returns; its result is then discarded and the placements stay unsaved.
#[derive(Debug)]
pub struct PendingBake {
    pub(crate) page: usize,
    pub(crate) handle: JoinHandle<WorkerOutput>,
}

impl PendingBake {
    pub fn page(&self) -> usize {
        self.page
    }

    /// True once the worker has returned.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}
