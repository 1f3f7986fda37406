use image::{Rgba, RgbaImage};
use inkstamp_editor::{
    EditingSession, EditorOptions, MemoryPageSink, PageRef, PlacementField, PlacementHistory,
    SignatureImage, Size,
};
use std::sync::Arc;

fn session_with_depth(depth: usize) -> EditingSession {
    let options = EditorOptions {
        history_depth: depth,
        ..EditorOptions::default()
    };
    EditingSession::new(options, Arc::new(MemoryPageSink::new()))
}

fn page() -> PageRef {
    PageRef::new(0, Size::new(600.0, 800.0))
}

fn signature() -> SignatureImage {
    SignatureImage::new(RgbaImage::from_pixel(200, 100, Rgba([0, 0, 0, 255])))
}

#[test]
fn test_history_creation() {
    let history = PlacementHistory::new(50);
    assert!(!history.can_undo());
    assert!(!history.can_redo());
    assert_eq!(history.undo_depth(), 0);
    assert_eq!(history.redo_depth(), 0);
}

#[test]
fn test_undo_redo_symmetry() {
    let mut session = session_with_depth(50);
    let a = session.add_placement(page(), signature()).unwrap();
    let b = session.add_placement(page(), signature()).unwrap();
    let after_adds = session.placements(0).to_vec();

    assert!(session.undo(0).unwrap());
    assert_eq!(session.placements(0).len(), 1);
    assert_eq!(session.placements(0)[0].id, a.id);
    assert_eq!(session.active_id(0), Some(a.id));

    assert!(session.undo(0).unwrap());
    assert!(session.placements(0).is_empty());
    assert_eq!(session.active_id(0), None);
    assert!(!session.undo(0).unwrap());

    assert!(session.redo(0).unwrap());
    assert!(session.redo(0).unwrap());
    assert_eq!(session.placements(0), after_adds.as_slice());
    assert_eq!(session.placements(0)[1].id, b.id);
    assert!(!session.redo(0).unwrap());
}

#[test]
fn test_new_action_after_undo_clears_redo() {
    let mut session = session_with_depth(50);
    let a = session.add_placement(page(), signature()).unwrap();
    session.add_placement(page(), signature()).unwrap();

    session.undo(0).unwrap();
    assert!(session.can_redo(0));

    session.duplicate_placement(0, a.id).unwrap();
    assert!(!session.can_redo(0));
    assert!(!session.redo(0).unwrap());
}

#[test]
fn test_snapshot_restores_field_values() {
    let mut session = session_with_depth(50);
    let p = session.add_placement(page(), signature()).unwrap();

    session.register_snapshot(0).unwrap();
    session
        .mutate(0, p.id, PlacementField::Rotation(45.0))
        .unwrap();
    session
        .mutate(0, p.id, PlacementField::WidthRatio(0.5))
        .unwrap();

    session.undo(0).unwrap();
    let restored = session.placement(0, p.id).unwrap();
    assert_eq!(restored.rotation, 0.0);
    assert_eq!(restored.width_ratio, 0.3);

    session.redo(0).unwrap();
    let redone = session.placement(0, p.id).unwrap();
    assert_eq!(redone.rotation, 45.0);
    assert_eq!(redone.width_ratio, 0.5);
}

#[test]
fn test_depth_bound() {
    let mut session = session_with_depth(3);
    for _ in 0..6 {
        session.add_placement(page(), signature()).unwrap();
    }
    assert_eq!(session.page(0).unwrap().history().undo_depth(), 3);

    let mut steps = 0;
    while session.undo(0).unwrap() {
        steps += 1;
    }
    assert_eq!(steps, 3);
    assert_eq!(session.placements(0).len(), 3);
}

#[test]
fn test_history_is_per_page() {
    let mut session = session_with_depth(50);
    session.add_placement(page(), signature()).unwrap();
    session
        .add_placement(PageRef::new(1, Size::new(800.0, 600.0)), signature())
        .unwrap();

    session.undo(1).unwrap();
    assert!(session.placements(1).is_empty());
    assert_eq!(session.placements(0).len(), 1);
    assert!(session.can_undo(0));
}
