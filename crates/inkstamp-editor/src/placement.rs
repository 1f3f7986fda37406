//! Placement model.
//!
//! A placement is one signature instance on a page. Its position and size are
//! stored in normalized page space (both axes in `[0, 1]`, origin bottom-left)
//! so the same placement renders identically on screen and on the native page.

use image::RgbaImage;
use inkstamp_core::constants::{MAX_WIDTH_RATIO, MIN_WIDTH_RATIO};
use inkstamp_core::{normalize_degrees, InkColor, PlacementError, Point, Size};
use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Unique identifier of a placement, stable across mutations.
pub type PlacementId = Uuid;

/// SHA-256 digest of a signature image (dimensions + pixels).
///
/// Two placements share a signature when their fingerprints match.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// Computes the fingerprint of an RGBA buffer.
    pub fn of(image: &RgbaImage) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(image.width().to_le_bytes());
        hasher.update(image.height().to_le_bytes());
        hasher.update(image.as_raw());
        Self(hasher.finalize().into())
    }

    /// Raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // short form is enough to tell signatures apart in logs
        for byte in &self.0[..6] {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

/// Signature artwork shared between placements and history snapshots.
///
/// The pixel buffer is immutable and reference counted; cloning is cheap.
#[derive(Clone)]
pub struct SignatureImage {
    pixels: Arc<RgbaImage>,
    fingerprint: Fingerprint,
}

impl SignatureImage {
    /// Wraps an RGBA buffer. Empty buffers are accepted here and rejected
    /// when a placement is created from them.
    pub fn new(image: RgbaImage) -> Self {
        let fingerprint = Fingerprint::of(&image);
        Self {
            pixels: Arc::new(image),
            fingerprint,
        }
    }

    /// The pixel buffer.
    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// True when the buffer has no pixels.
    pub fn is_empty(&self) -> bool {
        self.pixels.width() == 0 || self.pixels.height() == 0
    }

    /// Width divided by height, `None` for an empty buffer.
    pub fn aspect_ratio(&self) -> Option<f64> {
        Size::from_pixels(self.width(), self.height()).aspect_ratio()
    }

    pub fn fingerprint(&self) -> Fingerprint {
        self.fingerprint
    }

    /// True when both handles point at the same buffer allocation.
    pub fn shares_buffer_with(&self, other: &SignatureImage) -> bool {
        Arc::ptr_eq(&self.pixels, &other.pixels)
    }
}

impl PartialEq for SignatureImage {
    fn eq(&self, other: &Self) -> bool {
        self.fingerprint == other.fingerprint
    }
}

impl fmt::Debug for SignatureImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignatureImage")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("fingerprint", &self.fingerprint)
            .finish()
    }
}

impl From<RgbaImage> for SignatureImage {
    fn from(image: RgbaImage) -> Self {
        Self::new(image)
    }
}

/// Identifies a page and its native size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageRef {
    /// Zero-based page index within the document.
    pub index: usize,
    /// Native page size in pixels.
    pub size: Size,
}

impl PageRef {
    pub fn new(index: usize, size: Size) -> Self {
        Self { index, size }
    }
}

/// Bounds on the width ratio of a placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementLimits {
    pub min_width_ratio: f64,
    pub max_width_ratio: f64,
}

impl Default for PlacementLimits {
    fn default() -> Self {
        Self {
            min_width_ratio: MIN_WIDTH_RATIO,
            max_width_ratio: MAX_WIDTH_RATIO,
        }
    }
}

impl PlacementLimits {
    /// Clamps a width ratio into the limits. Non-finite input falls to the
    /// minimum.
    pub fn clamp_width_ratio(&self, value: f64) -> f64 {
        if !value.is_finite() {
            return self.min_width_ratio;
        }
        value.clamp(self.min_width_ratio, self.max_width_ratio)
    }
}

/// A single-field mutation of a placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlacementField {
    Center(Point),
    WidthRatio(f64),
    Rotation(f64),
    Color(InkColor),
}

/// One signature instance on a page.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub id: PlacementId,
    /// Center of the bounding box, normalized, origin bottom-left.
    pub center: Point,
    /// Width as a fraction of the page width.
    pub width_ratio: f64,
    /// Degrees, clockwise on screen, in `[0, 360)`.
    pub rotation: f64,
    pub color: InkColor,
    /// Width/height of the source image, fixed at creation.
    pub aspect_ratio: f64,
    pub source: SignatureImage,
}

impl Placement {
    /// Creates a placement with a fresh id, rotation 0 and black ink.
    ///
    /// The width ratio and center are clamped for the given page.
    pub fn new(
        source: SignatureImage,
        center: Point,
        width_ratio: f64,
        page: Size,
        limits: &PlacementLimits,
    ) -> Result<Self, PlacementError> {
        let aspect_ratio = source.aspect_ratio().ok_or(PlacementError::EmptyImage {
            width: source.width(),
            height: source.height(),
        })?;

        let mut placement = Self {
            id: Uuid::new_v4(),
            center,
            width_ratio: limits.clamp_width_ratio(width_ratio),
            rotation: 0.0,
            color: InkColor::Black,
            aspect_ratio,
            source,
        };
        placement.center = placement.clamped_center(center, page);
        Ok(placement)
    }

    /// Height as a fraction of the page height.
    pub fn height_ratio(&self, page: Size) -> f64 {
        if page.is_empty() || self.aspect_ratio <= 0.0 {
            return 0.0;
        }
        self.width_ratio * page.width / self.aspect_ratio / page.height
    }

    /// Size of the unrotated bounding box in page pixels.
    pub fn size_in(&self, page: Size) -> Size {
        let width = page.width * self.width_ratio;
        Size::new(width, width / self.aspect_ratio)
    }

    /// Clamps a candidate center so the unrotated bounding box stays on the
    /// page. An axis where the box is larger than the page pins to 0.5.
    pub fn clamped_center(&self, center: Point, page: Size) -> Point {
        clamp_axis_center(center, self.width_ratio, self.height_ratio(page))
    }

    /// Applies a single-field mutation with clamping.
    pub fn apply(&mut self, field: PlacementField, page: Size, limits: &PlacementLimits) {
        match field {
            PlacementField::Center(center) => {
                self.center = self.clamped_center(center, page);
            }
            PlacementField::WidthRatio(ratio) => {
                self.width_ratio = limits.clamp_width_ratio(ratio);
                self.center = self.clamped_center(self.center, page);
            }
            PlacementField::Rotation(degrees) => {
                self.rotation = normalize_degrees(degrees);
            }
            PlacementField::Color(color) => {
                self.color = color;
            }
        }
    }

    /// Copy with a new id and a shifted center, clamped on-page.
    pub fn duplicate(&self, offset: Point, page: Size) -> Placement {
        let mut copy = self.clone();
        copy.id = Uuid::new_v4();
        copy.center = self.clamped_center(self.center + offset, page);
        copy
    }
}

fn clamp_axis_center(center: Point, width_ratio: f64, height_ratio: f64) -> Point {
    fn axis(value: f64, extent: f64) -> f64 {
        if !value.is_finite() || !extent.is_finite() || extent >= 1.0 {
            return 0.5;
        }
        let half = extent / 2.0;
        value.clamp(half, 1.0 - half)
    }
    Point::new(axis(center.x, width_ratio), axis(center.y, height_ratio))
}
