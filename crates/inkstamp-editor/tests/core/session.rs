use image::{Rgba, RgbaImage};
use inkstamp_core::{Error, PlacementError};
use inkstamp_editor::{
    EditingSession, EditorOptions, InkColor, MemoryPageSink, PageRef, PlacementField, Point,
    SignatureImage, Size,
};
use std::sync::Arc;

fn session() -> EditingSession {
    EditingSession::new(EditorOptions::default(), Arc::new(MemoryPageSink::new()))
}

fn page() -> PageRef {
    PageRef::new(0, Size::new(600.0, 800.0))
}

fn signature(width: u32, height: u32) -> SignatureImage {
    SignatureImage::new(RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 255])))
}

#[test]
fn test_add_placement_defaults() {
    let mut s = session();
    let p = s.add_placement(page(), signature(200, 100)).unwrap();

    assert_eq!(p.center, Point::new(0.5, 0.5));
    assert_eq!(p.width_ratio, 0.3);
    assert_eq!(p.rotation, 0.0);
    assert_eq!(p.color, InkColor::Black);
    assert_eq!(p.aspect_ratio, 2.0);
    assert_eq!(s.active_id(0), Some(p.id));
}

#[test]
fn test_add_staggers_within_safe_region() {
    let mut s = session();
    let centers: Vec<Point> = (0..10)
        .map(|_| s.add_placement(page(), signature(200, 100)).unwrap().center)
        .collect();

    assert!((centers[1].x - 0.55).abs() < 1e-9);
    assert!((centers[1].y - 0.45).abs() < 1e-9);
    for c in &centers {
        assert!((0.2..=0.8).contains(&c.x));
        assert!((0.2..=0.8).contains(&c.y));
    }
}

#[test]
fn test_add_rejects_empty_image() {
    let mut s = session();
    let err = s
        .add_placement(page(), SignatureImage::new(RgbaImage::new(0, 0)))
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Placement(PlacementError::EmptyImage { .. })
    ));
    assert!(s.placements(0).is_empty());
    assert!(!s.can_undo(0));
    // a rejected add leaves no record of the page behind
    assert!(s.page(0).is_none());
    assert!(s.dirty_pages().is_empty());
    assert!(matches!(
        s.undo(0),
        Err(Error::Placement(PlacementError::UnknownPage { page: 0 }))
    ));
}

#[test]
fn test_duplicate_copies_fields_and_offsets() {
    let mut s = session();
    let p = s.add_placement(page(), signature(200, 100)).unwrap();
    s.mutate(0, p.id, PlacementField::Rotation(30.0)).unwrap();
    s.set_color(0, p.id, InkColor::Red).unwrap();

    let copy = s.duplicate_placement(0, p.id).unwrap();
    assert_ne!(copy.id, p.id);
    assert_eq!(copy.rotation, 30.0);
    assert_eq!(copy.color, InkColor::Red);
    assert_eq!(copy.width_ratio, p.width_ratio);
    assert!((copy.center.x - 0.54).abs() < 1e-9);
    assert!((copy.center.y - 0.46).abs() < 1e-9);
    assert_eq!(s.active_id(0), Some(copy.id));
    assert_eq!(s.placements(0).len(), 2);
}

#[test]
fn test_duplicate_near_edge_stays_on_page() {
    let mut s = session();
    let p = s.add_placement(page(), signature(200, 100)).unwrap();
    s.mutate(0, p.id, PlacementField::Center(Point::new(1.0, 0.0)))
        .unwrap();

    let copy = s.duplicate_placement(0, p.id).unwrap();
    let half_w = copy.width_ratio / 2.0;
    let half_h = copy.height_ratio(page().size) / 2.0;
    assert!((copy.center.x - (1.0 - half_w)).abs() < 1e-9);
    assert!((copy.center.y - half_h).abs() < 1e-9);
}

#[test]
fn test_width_ratio_clamped_through_session() {
    let mut s = session();
    let p = s.add_placement(page(), signature(200, 100)).unwrap();
    let wide = s.mutate(0, p.id, PlacementField::WidthRatio(5.0)).unwrap();
    assert_eq!(wide.width_ratio, 0.8);
    let narrow = s.mutate(0, p.id, PlacementField::WidthRatio(0.001)).unwrap();
    assert_eq!(narrow.width_ratio, 0.05);
}

#[test]
fn test_rotation_normalized_through_session() {
    let mut s = session();
    let p = s.add_placement(page(), signature(200, 100)).unwrap();
    s.mutate(0, p.id, PlacementField::Rotation(350.0)).unwrap();
    let p = s
        .mutate(0, p.id, PlacementField::Rotation(350.0 + 30.0))
        .unwrap();
    assert!((p.rotation - 20.0).abs() < 1e-9);
    let p = s.mutate(0, p.id, PlacementField::Rotation(-90.0)).unwrap();
    assert!((p.rotation - 270.0).abs() < 1e-9);
}

#[test]
fn test_set_active_validates_id() {
    let mut s = session();
    s.add_placement(page(), signature(200, 100)).unwrap();
    assert!(s.set_active(0, Some(uuid::Uuid::new_v4())).is_err());
    s.set_active(0, None).unwrap();
    assert_eq!(s.active_id(0), None);
    assert!(matches!(
        s.set_active(7, None),
        Err(Error::Placement(PlacementError::UnknownPage { page: 7 }))
    ));
}

#[test]
fn test_distinct_signature_count() {
    let mut s = session();
    let first = signature(200, 100);
    s.add_placement(page(), first.clone()).unwrap();
    s.add_placement(page(), first).unwrap();
    assert_eq!(s.distinct_signature_count(0), 1);

    s.add_placement(page(), signature(120, 40)).unwrap();
    assert_eq!(s.distinct_signature_count(0), 2);
    assert_eq!(s.distinct_signature_count(5), 0);
}

#[test]
fn test_set_same_color_records_nothing() {
    let mut s = session();
    let p = s.add_placement(page(), signature(200, 100)).unwrap();
    s.set_color(0, p.id, InkColor::Red).unwrap();
    s.undo(0).unwrap();
    let undo_depth = s.page(0).unwrap().history().undo_depth();
    assert!(s.can_redo(0));

    let unchanged = s.set_color(0, p.id, InkColor::Black).unwrap();
    assert_eq!(unchanged.color, InkColor::Black);
    assert_eq!(s.page(0).unwrap().history().undo_depth(), undo_depth);
    assert!(s.can_redo(0));

    // a real change still records a step and drops redo
    s.set_color(0, p.id, InkColor::Blue).unwrap();
    assert_eq!(s.page(0).unwrap().history().undo_depth(), undo_depth + 1);
    assert!(!s.can_redo(0));
}
