//! # InkStamp Editor
//!
//! Interactive signature placement and page compositing.
//!
//! A user draws a signature once, then places any number of instances of it
//! on document pages: moving, resizing, rotating and recoloring them with
//! per-page undo/redo. On save the placements are flattened into the page's
//! pixels.
//!
//! ## Architecture
//!
//! ```text
//! EditingSession (one per open document)
//!   ├── PageEditor per page (placements, active id, history)
//!   ├── BakeCoordinator (one bake per page, page lock)
//!   ├── Compositor (tiny-skia stamping, shared with the preview)
//!   └── PageSink (injected, receives baked pages)
//!
//! GestureController (move / resize / rotate)
//!   └── PageTransform (normalized page space <-> screen)
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use inkstamp_editor::*;
//!
//! let mut session = EditingSession::new(EditorOptions::default(), Arc::new(MemoryPageSink::new()));
//! let page = PageRef::new(0, Size::new(600.0, 800.0));
//! let placement = session.add_placement(page, SignatureImage::new(signature))?;
//! let outcome = session.save_page(0, &page_image, false)?;
//! ```

pub mod bake;
pub mod compositor;
pub mod history;
pub mod interaction;
pub mod metadata;
pub mod placement;
pub mod session;
pub mod viewport;

pub use bake::{BakeCoordinator, BakeGuard, BakeOutcome, MemoryPageSink, PageSink, PendingBake, StoredPage};
pub use compositor::{fit_page_to_limit, recolor, BakeResult, Compositor, OmittedPlacement, StampBox};
pub use history::{PlacementHistory, SnapshotToken};
pub use interaction::{ActiveGesture, GestureController, GestureKind, GestureState};
pub use metadata::PlacementRecord;
pub use placement::{
    Fingerprint, PageRef, Placement, PlacementField, PlacementId, PlacementLimits, SignatureImage,
};
pub use session::{EditingSession, EditorOptions, PageEditor, SignatureSource};
pub use viewport::{Corner, Handle, PageTransform, ScreenRect};

pub use inkstamp_core::{BlendMode, InkColor, Point, Size};
