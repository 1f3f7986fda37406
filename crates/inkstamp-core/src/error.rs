//! Error handling for InkStamp
//!
//! Provides error types for every layer of the placement engine:
//! - Placement errors (editing session and store operations)
//! - Bake errors (compositing and handing pages to storage)
//! - Metadata errors (stamp records used for re-editing)
//!
//! Geometry problems and out-of-range values are never errors: they are
//! deferred or clamped where they occur.
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;
use uuid::Uuid;

/// Placement error type
///
/// Raised by placement store and editing session operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlacementError {
    /// No placement with this id exists on the page
    #[error("Placement {id} not found on page {page}")]
    UnknownPlacement {
        /// The page that was searched.
        page: usize,
        /// The id that was not found.
        id: Uuid,
    },

    /// The page has no editing record yet
    #[error("Page {page} has no open editing record")]
    UnknownPage {
        /// The page index.
        page: usize,
    },

    /// The page is being baked and rejects edits
    #[error("Page {page} is locked while a save is in progress")]
    PageLocked {
        /// The locked page index.
        page: usize,
    },

    /// The signature artwork has no pixels
    #[error("Signature image is empty ({width}x{height})")]
    EmptyImage {
        /// Image width in pixels.
        width: u32,
        /// Image height in pixels.
        height: u32,
    },

    /// No signature is available from the signature source
    #[error("No signature available: {reason}")]
    NoSignature {
        /// Why the source could not provide one.
        reason: String,
    },

    /// A gesture was requested while another is still running
    #[error("A {active} gesture is already in progress")]
    GestureInProgress {
        /// Name of the active gesture.
        active: String,
    },
}

/// Bake error type
///
/// Raised when flattening placements into a page fails as a whole. Individual
/// placements that cannot be rendered are reported as omissions instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BakeError {
    /// Another save for the same page has not finished
    #[error("Save already in progress for page {page}")]
    SaveInProgress {
        /// The page index.
        page: usize,
    },

    /// A pointer gesture is still open on the page
    #[error("Cannot save page {page} while a gesture is in progress")]
    GestureInProgress {
        /// The page index.
        page: usize,
    },

    /// Placements use more than one distinct signature and the caller did not confirm
    #[error("Page {page} mixes {count} distinct signatures; confirmation required")]
    MixedSignatures {
        /// The page index.
        page: usize,
        /// Number of distinct signature fingerprints.
        count: usize,
    },

    /// The page has no usable dimensions
    #[error("Invalid page geometry {width}x{height}")]
    InvalidPage {
        /// Page width in pixels.
        width: u32,
        /// Page height in pixels.
        height: u32,
    },

    /// The page exceeds the render bound
    #[error("Page {width}x{height} exceeds the render limit of {max_edge}px")]
    PageTooLarge {
        /// Page width in pixels.
        width: u32,
        /// Page height in pixels.
        height: u32,
        /// Longest accepted edge.
        max_edge: u32,
    },

    /// The storage collaborator refused the baked page
    #[error("Failed to store page {page}: {reason}")]
    Sink {
        /// The page index.
        page: usize,
        /// The reason reported by the sink.
        reason: String,
    },

    /// The background worker running the bake died
    #[error("Bake worker failed: {reason}")]
    Worker {
        /// The reason for the failure.
        reason: String,
    },
}

/// Metadata error type
///
/// Raised while encoding or decoding the record kept next to a baked stamp.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MetadataError {
    /// The record JSON is malformed
    #[error("Invalid stamp record: {reason}")]
    InvalidRecord {
        /// The reason the record is invalid.
        reason: String,
    },

    /// The embedded image payload could not be decoded
    #[error("Invalid stamp image: {reason}")]
    InvalidImage {
        /// The reason the image is invalid.
        reason: String,
    },

    /// The image could not be encoded
    #[error("Failed to encode stamp image: {reason}")]
    Encode {
        /// The reason encoding failed.
        reason: String,
    },
}

/// Main error type for InkStamp
///
/// A unified error type that can represent any error from all layers.
#[derive(Error, Debug)]
pub enum Error {
    /// Placement error
    #[error(transparent)]
    Placement(#[from] PlacementError),

    /// Bake error
    #[error(transparent)]
    Bake(#[from] BakeError),

    /// Metadata error
    #[error(transparent)]
    Metadata(#[from] MetadataError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this error means the page is busy with a save
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            Error::Bake(BakeError::SaveInProgress { .. })
                | Error::Bake(BakeError::GestureInProgress { .. })
                | Error::Placement(PlacementError::PageLocked { .. })
        )
    }

    /// Check if this error asks the user for a confirmation
    pub fn needs_confirmation(&self) -> bool {
        matches!(self, Error::Bake(BakeError::MixedSignatures { .. }))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
