//! Page compositor using tiny-skia.
//!
//! Burns placements into a page raster. The on-screen preview goes through the
//! same stamp transform so what the user sees is what gets baked.
//!
//! Pipeline per placement:
//! - size in page pixels from the width ratio and aspect ratio
//! - center flipped from normalized Y-up to raster rows
//! - box shifted (never resized) to stay on the page
//! - optional monochrome recolor
//! - drawn rotated about the box center

use crate::metadata::PlacementRecord;
use crate::placement::{Placement, PlacementId};
use crate::viewport::PageTransform;
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use inkstamp_core::constants::DEFAULT_MAX_RENDER_EDGE;
use inkstamp_core::{BakeError, BlendMode, InkColor, Size};
use tiny_skia::{ColorU8, FilterQuality, Pixmap, PixmapPaint, Transform};

/// A placement the compositor could not draw.
#[derive(Debug, Clone, PartialEq)]
pub struct OmittedPlacement {
    pub id: PlacementId,
    pub reason: String,
}

/// Result of flattening placements into a page.
#[derive(Debug, Clone)]
pub struct BakeResult {
    pub image: RgbaImage,
    /// One record per stamped placement, in z-order.
    pub records: Vec<PlacementRecord>,
    pub omitted: Vec<OmittedPlacement>,
}

/// Resolved box of a stamp in page pixels (raster, Y down).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StampBox {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub rotation: f64,
}

impl StampBox {
    /// Resolves where a placement lands on a page of the given pixel size.
    pub fn resolve(placement: &Placement, page: Size) -> Option<Self> {
        if page.is_empty() {
            return None;
        }
        let width = page.width * placement.width_ratio;
        let height = width / placement.aspect_ratio;
        if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
            return None;
        }

        let cx = placement.center.x * page.width;
        let cy = (1.0 - placement.center.y) * page.height;

        Some(Self {
            left: shift_into(cx - width / 2.0, width, page.width),
            top: shift_into(cy - height / 2.0, height, page.height),
            width,
            height,
            rotation: placement.rotation,
        })
    }

    /// Maps the source image's pixel grid onto this box.
    fn transform(&self, source_width: u32, source_height: u32) -> Transform {
        let sx = (self.width / f64::from(source_width)) as f32;
        let sy = (self.height / f64::from(source_height)) as f32;
        let cx = (self.left + self.width / 2.0) as f32;
        let cy = (self.top + self.height / 2.0) as f32;
        Transform::from_scale(sx, sy)
            .post_translate(self.left as f32, self.top as f32)
            .post_rotate_at(self.rotation as f32, cx, cy)
    }
}

fn shift_into(start: f64, extent: f64, limit: f64) -> f64 {
    if extent >= limit {
        (limit - extent) / 2.0
    } else {
        start.clamp(0.0, limit - extent)
    }
}

/// Flattens placements into page rasters.
#[derive(Debug, Clone)]
pub struct Compositor {
    blend_mode: BlendMode,
    max_render_edge: u32,
}

impl Default for Compositor {
    fn default() -> Self {
        Self::new(BlendMode::Normal, DEFAULT_MAX_RENDER_EDGE)
    }
}

impl Compositor {
    pub fn new(blend_mode: BlendMode, max_render_edge: u32) -> Self {
        Self {
            blend_mode,
            max_render_edge,
        }
    }

    pub fn blend_mode(&self) -> BlendMode {
        self.blend_mode
    }

    pub fn max_render_edge(&self) -> u32 {
        self.max_render_edge
    }

    /// Checks a page before any pixel work.
    pub fn validate_page(&self, width: u32, height: u32) -> Result<(), BakeError> {
        if width == 0 || height == 0 {
            return Err(BakeError::InvalidPage { width, height });
        }
        if width.max(height) > self.max_render_edge {
            return Err(BakeError::PageTooLarge {
                width,
                height,
                max_edge: self.max_render_edge,
            });
        }
        Ok(())
    }

    /// Burns `placements` into a copy of `page`.
    ///
    /// Placements with unusable artwork are skipped and listed in
    /// [`BakeResult::omitted`]; the rest are stamped in order.
    pub fn bake(&self, page: &RgbaImage, placements: &[Placement]) -> Result<BakeResult, BakeError> {
        let (width, height) = page.dimensions();
        self.validate_page(width, height)?;

        let mut pixmap = rgba_to_pixmap(page).ok_or(BakeError::InvalidPage { width, height })?;
        let page_size = Size::from_pixels(width, height);

        let mut records = Vec::with_capacity(placements.len());
        let mut omitted = Vec::new();

        for placement in placements {
            let record = match PlacementRecord::from_placement(placement) {
                Ok(record) => record,
                Err(e) => {
                    tracing::warn!("Skipping placement {}: {}", placement.id, e);
                    omitted.push(OmittedPlacement {
                        id: placement.id,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            match self.draw_stamp(&mut pixmap, placement, page_size, Transform::identity()) {
                Ok(()) => records.push(record),
                Err(reason) => {
                    tracing::warn!("Skipping placement {}: {}", placement.id, reason);
                    omitted.push(OmittedPlacement {
                        id: placement.id,
                        reason,
                    });
                }
            }
        }

        Ok(BakeResult {
            image: pixmap_to_rgba(&pixmap),
            records,
            omitted,
        })
    }

    /// Renders the page and its placements at screen resolution.
    ///
    /// The result has the viewport's size with the page letterboxed inside.
    /// Returns `None` while either size is unusable.
    pub fn render_preview(
        &self,
        page: &RgbaImage,
        placements: &[Placement],
        viewport: Size,
    ) -> Option<RgbaImage> {
        let page_size = Size::from_pixels(page.width(), page.height());
        let transform = PageTransform::compute(page_size, viewport)?;

        let mut pixmap = Pixmap::new(
            viewport.width.round().max(1.0) as u32,
            viewport.height.round().max(1.0) as u32,
        )?;

        let scale = transform.scale() as f32;
        let offset = transform.offset();
        let to_screen =
            Transform::from_scale(scale, scale).post_translate(offset.x as f32, offset.y as f32);

        let page_pixmap = rgba_to_pixmap(page)?;
        pixmap.draw_pixmap(
            0,
            0,
            page_pixmap.as_ref(),
            &PixmapPaint {
                quality: FilterQuality::Bilinear,
                ..PixmapPaint::default()
            },
            to_screen,
            None,
        );

        for placement in placements {
            if let Err(reason) = self.draw_stamp(&mut pixmap, placement, page_size, to_screen) {
                tracing::debug!("Preview skips placement {}: {}", placement.id, reason);
            }
        }

        Some(pixmap_to_rgba(&pixmap))
    }

    fn draw_stamp(
        &self,
        target: &mut Pixmap,
        placement: &Placement,
        page: Size,
        outer: Transform,
    ) -> Result<(), String> {
        let source = placement.source.pixels();
        if placement.source.is_empty() {
            return Err(format!(
                "source image is empty ({}x{})",
                source.width(),
                source.height()
            ));
        }
        let stamp_box = StampBox::resolve(placement, page)
            .ok_or_else(|| format!("unusable geometry (aspect ratio {})", placement.aspect_ratio))?;

        let tinted;
        let artwork = if placement.color.needs_recolor() {
            tinted = recolor(source, placement.color);
            &tinted
        } else {
            source
        };
        let stamp = rgba_to_pixmap(artwork).ok_or_else(|| "source image too large".to_string())?;

        let paint = PixmapPaint {
            opacity: 1.0,
            blend_mode: match self.blend_mode {
                BlendMode::Normal => tiny_skia::BlendMode::SourceOver,
                BlendMode::Multiply => tiny_skia::BlendMode::Multiply,
            },
            quality: FilterQuality::Bicubic,
        };
        let transform = stamp_box
            .transform(source.width(), source.height())
            .post_concat(outer);
        target.draw_pixmap(0, 0, stamp.as_ref(), &paint, transform, None);
        Ok(())
    }
}

/// Monochrome recolor at full intensity.
///
/// RGB becomes the tint; alpha is scaled by the inverse luminance so dark ink
/// stays opaque and white paper turns transparent. Black returns the source.
pub fn recolor(source: &RgbaImage, color: InkColor) -> RgbaImage {
    if !color.needs_recolor() {
        return source.clone();
    }
    let [r, g, b] = color.rgb();
    let mut out = RgbaImage::new(source.width(), source.height());
    for (dst, src) in out.pixels_mut().zip(source.pixels()) {
        let [sr, sg, sb, sa] = src.0;
        let luminance = 0.299 * f64::from(sr) + 0.587 * f64::from(sg) + 0.114 * f64::from(sb);
        let alpha = f64::from(sa) * (1.0 - luminance / 255.0);
        *dst = Rgba([r, g, b, alpha.round().clamp(0.0, 255.0) as u8]);
    }
    out
}

/// Downscales a page so its longest edge fits `max_edge`, keeping the aspect
/// ratio. Pages already within the limit are returned unchanged.
pub fn fit_page_to_limit(page: &RgbaImage, max_edge: u32) -> RgbaImage {
    let (width, height) = page.dimensions();
    let longest = width.max(height);
    if longest <= max_edge || max_edge == 0 {
        return page.clone();
    }
    let factor = f64::from(max_edge) / f64::from(longest);
    let new_width = ((f64::from(width) * factor).round() as u32).clamp(1, max_edge);
    let new_height = ((f64::from(height) * factor).round() as u32).clamp(1, max_edge);
    tracing::info!(
        "Downscaling page {}x{} to {}x{}",
        width,
        height,
        new_width,
        new_height
    );
    imageops::resize(page, new_width, new_height, FilterType::Lanczos3)
}

fn rgba_to_pixmap(image: &RgbaImage) -> Option<Pixmap> {
    let mut pixmap = Pixmap::new(image.width(), image.height())?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(image.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Some(pixmap)
}

fn pixmap_to_rgba(pixmap: &Pixmap) -> RgbaImage {
    let mut image = RgbaImage::new(pixmap.width(), pixmap.height());
    for (dst, src) in image.pixels_mut().zip(pixmap.pixels()) {
        let c = src.demultiply();
        *dst = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }
    image
}
