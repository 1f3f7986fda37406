//! # InkStamp Core
//!
//! Core types and utilities shared by the InkStamp crates.
//! Provides the geometry primitives used by the placement engine, the ink
//! vocabulary (tint colors, blend modes), the error taxonomy and the
//! shared-state aliases used to coordinate background bakes.

pub mod constants;
pub mod error;
pub mod geometry;
pub mod ink;
pub mod types;

pub use error::{BakeError, Error, MetadataError, PlacementError, Result};
pub use geometry::{normalize_degrees, Point, Size};
pub use ink::{BlendMode, InkColor};

// Re-export type aliases for convenience
pub use types::{thread_safe_map, thread_safe_set, ThreadSafeMap, ThreadSafeSet};
