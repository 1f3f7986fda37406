use image::{Rgba, RgbaImage};
use inkstamp_core::{BakeError, Error, PlacementError};
use inkstamp_editor::{
    BakeOutcome, EditingSession, EditorOptions, InkColor, MemoryPageSink, PageRef, PageSink,
    PlacementField, PlacementRecord, Point, SignatureImage, Size,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

struct FailingSink;

/// Takes its time storing and counts how often it was asked to.
#[derive(Default)]
struct SlowSink {
    stores: AtomicUsize,
}

impl PageSink for SlowSink {
    fn store_page(
        &self,
        _page: usize,
        _image: RgbaImage,
        _records: Vec<PlacementRecord>,
    ) -> inkstamp_core::Result<()> {
        std::thread::sleep(Duration::from_millis(300));
        self.stores.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl PageSink for FailingSink {
    fn store_page(
        &self,
        _page: usize,
        _image: RgbaImage,
        _records: Vec<PlacementRecord>,
    ) -> inkstamp_core::Result<()> {
        Err(Error::other("disk full"))
    }
}

fn page_ref() -> PageRef {
    PageRef::new(0, Size::new(200.0, 100.0))
}

fn page_image() -> RgbaImage {
    RgbaImage::from_pixel(200, 100, Rgba([255, 255, 255, 255]))
}

fn signature(width: u32, height: u32) -> SignatureImage {
    SignatureImage::new(RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 255])))
}

fn session(sink: Arc<dyn PageSink>) -> EditingSession {
    EditingSession::new(EditorOptions::default(), sink)
}

#[test]
fn test_save_bakes_and_clears_store() {
    let sink = Arc::new(MemoryPageSink::new());
    let mut s = session(sink.clone());
    s.add_placement(page_ref(), signature(40, 20)).unwrap();
    s.add_placement(page_ref(), signature(40, 20)).unwrap();

    let outcome = s.save_page(0, &page_image(), false).unwrap();
    assert_eq!(outcome, BakeOutcome::Complete { stamped: 2 });
    assert!(s.placements(0).is_empty());
    assert_eq!(s.active_id(0), None);
    assert!(!s.can_undo(0));
    assert!(!s.can_redo(0));
    assert!(!s.is_locked(0));

    let stored = sink.page(0).unwrap();
    assert_eq!(stored.records.len(), 2);
    assert_ne!(stored.image, page_image());
}

#[test]
fn test_failed_sink_keeps_placements() {
    let mut s = session(Arc::new(FailingSink));
    s.add_placement(page_ref(), signature(40, 20)).unwrap();

    let err = s.save_page(0, &page_image(), false).unwrap_err();
    assert!(matches!(err, Error::Bake(BakeError::Sink { page: 0, .. })));
    assert_eq!(s.placements(0).len(), 1);
    assert!(s.can_undo(0));
    assert!(!s.is_locked(0));
}

#[test]
fn test_mixed_signatures_need_confirmation() {
    let sink = Arc::new(MemoryPageSink::new());
    let mut s = session(sink.clone());
    s.add_placement(page_ref(), signature(40, 20)).unwrap();
    s.add_placement(page_ref(), signature(30, 30)).unwrap();

    let err = s.save_page(0, &page_image(), false).unwrap_err();
    assert!(err.needs_confirmation());
    assert!(matches!(
        err,
        Error::Bake(BakeError::MixedSignatures { page: 0, count: 2 })
    ));
    assert_eq!(s.placements(0).len(), 2);
    assert_eq!(sink.stored_count(), 0);

    let outcome = s.save_page(0, &page_image(), true).unwrap();
    assert_eq!(outcome.stamped(), 2);
}

#[test]
fn test_baked_signatures_count_toward_mix() {
    let mut s = session(Arc::new(MemoryPageSink::new()));
    s.add_placement(page_ref(), signature(40, 20)).unwrap();
    s.save_page(0, &page_image(), false).unwrap();

    s.add_placement(page_ref(), signature(30, 30)).unwrap();
    assert_eq!(s.distinct_signature_count(0), 2);
    assert!(s.save_page(0, &page_image(), false).is_err());

    // the same signature again is not a mix
    let mut s = session(Arc::new(MemoryPageSink::new()));
    s.add_placement(page_ref(), signature(40, 20)).unwrap();
    s.save_page(0, &page_image(), false).unwrap();
    s.add_placement(page_ref(), signature(40, 20)).unwrap();
    assert_eq!(s.distinct_signature_count(0), 1);
}

#[test]
fn test_partial_outcome_lists_omissions() {
    let mut s = session(Arc::new(MemoryPageSink::new()));
    let p = s.add_placement(page_ref(), signature(40, 20)).unwrap();
    // the session never produces broken geometry, so break a copy directly
    let mut page = s.page(0).unwrap().placements().to_vec();
    page[0].aspect_ratio = f64::NAN;

    let result = s.compositor().bake(&page_image(), &page).unwrap();
    assert_eq!(result.omitted.len(), 1);
    assert_eq!(result.omitted[0].id, p.id);
    assert!(result.records.is_empty());
}

#[test]
fn test_page_too_large_rejected_before_work() {
    let options = EditorOptions {
        max_render_edge: 100,
        ..EditorOptions::default()
    };
    let mut s = EditingSession::new(options, Arc::new(MemoryPageSink::new()));
    s.add_placement(page_ref(), signature(40, 20)).unwrap();

    let err = s.save_page(0, &page_image(), false).unwrap_err();
    assert!(matches!(
        err,
        Error::Bake(BakeError::PageTooLarge { max_edge: 100, .. })
    ));
    assert_eq!(s.placements(0).len(), 1);
}

#[test]
fn test_record_restores_editable_placement() {
    let sink = Arc::new(MemoryPageSink::new());
    let mut s = session(sink.clone());
    let p = s.add_placement(page_ref(), signature(40, 20)).unwrap();
    s.mutate(0, p.id, PlacementField::Center(Point::new(0.3, 0.6)))
        .unwrap();
    s.mutate(0, p.id, PlacementField::Rotation(33.0)).unwrap();
    s.set_color(0, p.id, InkColor::Blue).unwrap();
    let before = s.placement(0, p.id).unwrap().clone();

    s.save_page(0, &page_image(), false).unwrap();
    let record = sink.page(0).unwrap().records[0].clone();
    let json = record.to_json().unwrap();

    let restored = s
        .restore_from_record(page_ref(), &PlacementRecord::from_json(&json).unwrap())
        .unwrap();
    assert_ne!(restored.id, before.id);
    assert_eq!(restored.center, before.center);
    assert_eq!(restored.width_ratio, before.width_ratio);
    assert_eq!(restored.rotation, before.rotation);
    assert_eq!(restored.color, before.color);
    assert_eq!(restored.aspect_ratio, before.aspect_ratio);
    assert_eq!(restored.source, before.source);
    assert_eq!(s.active_id(0), Some(restored.id));
    assert!(s.can_undo(0));
}

#[test]
fn test_begin_bake_outside_runtime() {
    let mut s = session(Arc::new(MemoryPageSink::new()));
    s.add_placement(page_ref(), signature(40, 20)).unwrap();
    let err = s.begin_bake(0, page_image(), false).unwrap_err();
    assert!(matches!(err, Error::Bake(BakeError::Worker { .. })));
    assert!(!s.is_locked(0));
}

#[tokio::test]
async fn test_background_bake_locks_page() {
    let sink = Arc::new(MemoryPageSink::new());
    let mut s = session(sink.clone());
    let p = s.add_placement(page_ref(), signature(40, 20)).unwrap();
    s.add_placement(PageRef::new(1, Size::new(200.0, 100.0)), signature(40, 20))
        .unwrap();

    let pending = s.begin_bake(0, page_image(), false).unwrap();
    assert_eq!(pending.page(), 0);
    assert!(s.is_locked(0));

    // edits and a second save on the same page are refused
    let err = s
        .mutate(0, p.id, PlacementField::Rotation(10.0))
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Placement(PlacementError::PageLocked { page: 0 })
    ));
    assert!(err.is_busy());
    let err = s.save_page(0, &page_image(), false).unwrap_err();
    assert!(matches!(
        err,
        Error::Bake(BakeError::SaveInProgress { page: 0 })
    ));
    assert!(s.begin_bake(0, page_image(), false).is_err());
    assert!(s.undo(0).is_err());

    // other pages stay editable and can bake in parallel
    assert!(!s.is_locked(1));
    let other = s.begin_bake(1, page_image(), false).unwrap();

    let outcome = s.finish_bake(pending).await.unwrap();
    assert_eq!(outcome, BakeOutcome::Complete { stamped: 1 });
    assert!(!s.is_locked(0));
    assert!(s.placements(0).is_empty());
    assert!(sink.page(0).is_some());

    s.finish_bake(other).await.unwrap();
    assert_eq!(sink.stored_count(), 2);
}

#[tokio::test]
async fn test_background_bake_failure_keeps_state() {
    let mut s = session(Arc::new(FailingSink));
    s.add_placement(page_ref(), signature(40, 20)).unwrap();

    let pending = s.begin_bake(0, page_image(), false).unwrap();
    let err = s.finish_bake(pending).await.unwrap_err();
    assert!(matches!(err, Error::Bake(BakeError::Sink { .. })));
    assert_eq!(s.placements(0).len(), 1);
    assert!(!s.is_locked(0));
}

#[tokio::test]
async fn test_dropped_bake_keeps_page_locked_until_worker_returns() {
    let sink = Arc::new(SlowSink::default());
    let mut s = session(sink.clone());
    s.add_placement(page_ref(), signature(40, 20)).unwrap();

    let pending = s.begin_bake(0, page_image(), false).unwrap();
    drop(pending);
    assert!(s.is_locked(0));
    let err = s.begin_bake(0, page_image(), false).unwrap_err();
    assert!(matches!(
        err,
        Error::Bake(BakeError::SaveInProgress { page: 0 })
    ));

    let mut waited = Duration::ZERO;
    while s.is_locked(0) && waited < Duration::from_secs(10) {
        tokio::time::sleep(Duration::from_millis(20)).await;
        waited += Duration::from_millis(20);
    }
    assert!(!s.is_locked(0));
    assert_eq!(sink.stores.load(Ordering::SeqCst), 1);
    // the abandoned result was never applied
    assert_eq!(s.placements(0).len(), 1);

    let retry = s.begin_bake(0, page_image(), false).unwrap();
    let outcome = s.finish_bake(retry).await.unwrap();
    assert_eq!(outcome.stamped(), 1);
    assert_eq!(sink.stores.load(Ordering::SeqCst), 2);
}
