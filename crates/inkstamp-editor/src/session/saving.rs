//! Baking pages from a session.

use super::EditingSession;
use crate::bake::{run_bake, BakeGuard, BakeOutcome, BakeReport, PendingBake};
use crate::placement::Placement;
use image::RgbaImage;
use inkstamp_core::{BakeError, Result};
use std::sync::Arc;

impl EditingSession {
    /// Bakes a page's placements into `image` on the calling thread and hands
    /// the result to the page sink.
    ///
    /// On success the page's placements and history are cleared. On failure
    /// they are kept so the save can be retried.
    pub fn save_page(
        &mut self,
        page: usize,
        image: &RgbaImage,
        confirm_mixed: bool,
    ) -> Result<BakeOutcome> {
        let (guard, placements) = self.prepare_bake(page, image, confirm_mixed)?;
        tracing::info!("Baking {} placement(s) into page {}", placements.len(), page);

        let report = run_bake(
            &self.compositor,
            self.sink.as_ref(),
            page,
            image,
            &placements,
        )
        .inspect_err(|e| tracing::warn!("Bake of page {} failed: {}", page, e))?;

        let outcome = self.apply_report(page, report);
        drop(guard);
        Ok(outcome)
    }

    /// Starts baking a page on a blocking worker.
    ///
    /// The page stays locked until the returned bake is passed to
    /// [`finish_bake`](Self::finish_bake), or until the worker returns if the
    /// pending bake is dropped. Must be called from within a Tokio runtime.
    pub fn begin_bake(
        &mut self,
        page: usize,
        image: RgbaImage,
        confirm_mixed: bool,
    ) -> Result<PendingBake> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|e| BakeError::Worker {
            reason: e.to_string(),
        })?;
        let (guard, placements) = self.prepare_bake(page, &image, confirm_mixed)?;
        tracing::info!(
            "Baking {} placement(s) into page {} in the background",
            placements.len(),
            page
        );

        let compositor = self.compositor.clone();
        let sink = Arc::clone(&self.sink);
        let handle = runtime.spawn_blocking(move || {
            let result = run_bake(&compositor, sink.as_ref(), page, &image, &placements);
            (guard, result)
        });

        Ok(PendingBake { page, handle })
    }

    /// Waits for a background bake and applies its result to the session.
    pub async fn finish_bake(&mut self, pending: PendingBake) -> Result<BakeOutcome> {
        let PendingBake { page, handle } = pending;

        // a panicking worker drops the claim while unwinding
        let (guard, result) = handle.await.map_err(|e| BakeError::Worker {
            reason: e.to_string(),
        })?;
        let report =
            result.inspect_err(|e| tracing::warn!("Bake of page {} failed: {}", page, e))?;

        let outcome = self.apply_report(page, report);
        drop(guard);
        Ok(outcome)
    }

    /// Claims the page, checks the page and the signature mix, and copies
    /// the placements to stamp.
    fn prepare_bake(
        &self,
        page: usize,
        image: &RgbaImage,
        confirm_mixed: bool,
    ) -> Result<(BakeGuard, Vec<Placement>)> {
        if self.has_open_gesture(page) {
            tracing::warn!("Rejecting save for page {}: gesture in progress", page);
            return Err(BakeError::GestureInProgress { page }.into());
        }
        let guard = self.bakes.try_acquire(page)?;
        self.compositor.validate_page(image.width(), image.height())?;

        let count = self.distinct_signature_count(page);
        if count > 1 && !confirm_mixed {
            tracing::warn!(
                "Page {} mixes {} signatures, asking for confirmation",
                page,
                count
            );
            return Err(BakeError::MixedSignatures { page, count }.into());
        }

        Ok((guard, self.placements(page).to_vec()))
    }

    fn apply_report(&mut self, page: usize, report: BakeReport) -> BakeOutcome {
        let outcome = report.outcome();
        if let Some(editor) = self.pages.get_mut(&page) {
            editor.finish_bake(report.fingerprints);
        }
        match &outcome {
            BakeOutcome::Complete { stamped } => {
                tracing::info!("Page {} baked with {} stamp(s)", page, stamped);
            }
            BakeOutcome::Partial { stamped, omitted } => {
                tracing::warn!(
                    "Page {} baked with {} stamp(s), {} skipped",
                    page,
                    stamped,
                    omitted.len()
                );
            }
        }
        outcome
    }
}
