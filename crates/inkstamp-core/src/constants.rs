//! Engine-wide defaults and limits.
//!
//! Values here are the compiled-in defaults. Most of them can be overridden
//! through the settings crate.

/// Smallest signature width as a fraction of page width.
pub const MIN_WIDTH_RATIO: f64 = 0.05;

/// Largest signature width as a fraction of page width.
pub const MAX_WIDTH_RATIO: f64 = 0.8;

/// Width ratio given to a freshly added placement.
pub const DEFAULT_WIDTH_RATIO: f64 = 0.3;

/// Normalized offset applied per existing placement when staggering new ones.
pub const DEFAULT_STAGGER_STEP: f64 = 0.05;

/// Normalized offset applied to a duplicated placement's center.
pub const DEFAULT_DUPLICATE_OFFSET: f64 = 0.04;

/// Margin of the central region new placements are staggered into.
pub const DEFAULT_SAFE_REGION_MARGIN: f64 = 0.2;

/// Maximum number of snapshots kept on each undo/redo stack.
pub const DEFAULT_HISTORY_DEPTH: usize = 50;

/// Longest page edge (pixels) the compositor accepts.
pub const DEFAULT_MAX_RENDER_EDGE: u32 = 4096;

/// Pointer tolerance (screen pixels) for grabbing a handle.
pub const DEFAULT_HANDLE_TOLERANCE_PX: f64 = 22.0;

/// Distance (screen pixels) of the rotation handle above the top edge.
pub const ROTATION_HANDLE_OFFSET_PX: f64 = 28.0;

/// Tolerance used when comparing normalized coordinates.
pub const EPSILON: f64 = 1e-9;
