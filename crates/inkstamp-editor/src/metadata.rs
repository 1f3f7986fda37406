//! Stamp records kept alongside a baked page.
//!
//! A record carries everything needed to turn a flattened stamp back into an
//! editable placement: geometry, tint and the untinted source as PNG.

use crate::placement::{Placement, SignatureImage};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use image::ImageFormat;
use inkstamp_core::{InkColor, MetadataError, Point};
use serde::{Deserialize, Serialize};
use std::io::Cursor;

/// Lossless description of one baked stamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementRecord {
    pub center: Point,
    pub width_ratio: f64,
    pub rotation: f64,
    pub color: InkColor,
    pub aspect_ratio: f64,
    /// Source artwork before any recolor, PNG encoded.
    pub source_png_base64: String,
    pub baked_at: DateTime<Utc>,
}

impl PlacementRecord {
    /// Builds the record for a placement being baked now.
    pub fn from_placement(placement: &Placement) -> Result<Self, MetadataError> {
        Ok(Self {
            center: placement.center,
            width_ratio: placement.width_ratio,
            rotation: placement.rotation,
            color: placement.color,
            aspect_ratio: placement.aspect_ratio,
            source_png_base64: encode_png(&placement.source)?,
            baked_at: Utc::now(),
        })
    }

    pub fn to_json(&self) -> Result<String, MetadataError> {
        serde_json::to_string(self).map_err(|e| MetadataError::Encode {
            reason: e.to_string(),
        })
    }

    pub fn from_json(json: &str) -> Result<Self, MetadataError> {
        serde_json::from_str(json).map_err(|e| MetadataError::InvalidRecord {
            reason: e.to_string(),
        })
    }

    /// Decodes the embedded source artwork.
    pub fn to_signature_image(&self) -> Result<SignatureImage, MetadataError> {
        let bytes = STANDARD
            .decode(self.source_png_base64.as_bytes())
            .map_err(|e| MetadataError::InvalidImage {
                reason: format!("base64: {}", e),
            })?;
        let image = image::load_from_memory_with_format(&bytes, ImageFormat::Png)
            .map_err(|e| MetadataError::InvalidImage {
                reason: e.to_string(),
            })?
            .to_rgba8();
        Ok(SignatureImage::new(image))
    }
}

fn encode_png(source: &SignatureImage) -> Result<String, MetadataError> {
    let mut buffer = Vec::new();
    source
        .pixels()
        .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
        .map_err(|e| MetadataError::Encode {
            reason: e.to_string(),
        })?;
    Ok(STANDARD.encode(buffer))
}
