//! Page-to-screen coordinate transformation.
//!
//! Maps between normalized page space (0..1, origin bottom-left, Y up) and
//! screen pixels (origin top-left, Y down). The page is letterboxed into the
//! viewport: scaled uniformly to fit and centered.

use crate::placement::Placement;
use inkstamp_core::constants::ROTATION_HANDLE_OFFSET_PX;
use inkstamp_core::{Point, Size};

/// Uniform page-to-viewport mapping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageTransform {
    page: Size,
    scale: f64,
    display: Size,
    offset: Point,
}

impl PageTransform {
    /// Computes the letterbox transform.
    ///
    /// Returns `None` while the page or viewport has no usable size.
    pub fn compute(page: Size, viewport: Size) -> Option<Self> {
        if page.is_empty() || viewport.is_empty() {
            return None;
        }
        let scale = (viewport.width / page.width).min(viewport.height / page.height);
        let display = Size::new(page.width * scale, page.height * scale);
        let offset = Point::new(
            (viewport.width - display.width) / 2.0,
            (viewport.height - display.height) / 2.0,
        );
        Some(Self {
            page,
            scale,
            display,
            offset,
        })
    }

    /// Native page size.
    pub fn page_size(&self) -> Size {
        self.page
    }

    /// Screen pixels per page pixel.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Size of the page on screen.
    pub fn display_size(&self) -> Size {
        self.display
    }

    /// Top-left corner of the page on screen.
    pub fn offset(&self) -> Point {
        self.offset
    }

    /// Normalized page point to screen point.
    pub fn to_screen(&self, normalized: Point) -> Point {
        Point::new(
            self.offset.x + normalized.x * self.display.width,
            self.offset.y + (1.0 - normalized.y) * self.display.height,
        )
    }

    /// Screen point to normalized page point. Points outside the page map
    /// outside `[0, 1]`.
    pub fn to_normalized(&self, screen: Point) -> Point {
        Point::new(
            (screen.x - self.offset.x) / self.display.width,
            1.0 - (screen.y - self.offset.y) / self.display.height,
        )
    }

    /// Like [`to_normalized`](Self::to_normalized), clamped into `[0, 1]`.
    pub fn to_normalized_clamped(&self, screen: Point) -> Point {
        self.to_normalized(screen).clamp_unit()
    }

    /// Screen displacement to normalized displacement. Screen-down is page-down.
    pub fn delta_to_normalized(&self, dx: f64, dy: f64) -> Point {
        Point::new(dx / self.display.width, -dy / self.display.height)
    }

    /// On-screen size of a placement's unrotated box.
    pub fn size_on_screen(&self, width_ratio: f64, aspect_ratio: f64) -> Size {
        let width = self.page.width * width_ratio * self.scale;
        Size::new(width, width / aspect_ratio)
    }

    /// Screen-space box of a placement.
    pub fn placement_screen_rect(&self, placement: &Placement) -> ScreenRect {
        ScreenRect {
            center: self.to_screen(placement.center),
            size: self.size_on_screen(placement.width_ratio, placement.aspect_ratio),
            rotation: placement.rotation,
        }
    }

    /// Screen positions of the four corner handles, rotated with the shape.
    pub fn corner_handles(&self, placement: &Placement) -> [(Corner, Point); 4] {
        let rect = self.placement_screen_rect(placement);
        Corner::ALL.map(|corner| (corner, rect.corner(corner)))
    }

    /// Screen position of the rotation handle, above the top edge.
    pub fn rotation_handle(&self, placement: &Placement) -> Point {
        self.placement_screen_rect(placement).rotation_handle()
    }

    /// Which handle of `placement`, if any, lies under `pointer`.
    ///
    /// Priority: rotation handle, then corners, then the body.
    pub fn hit_test(&self, placement: &Placement, pointer: Point, tolerance: f64) -> Option<Handle> {
        let rect = self.placement_screen_rect(placement);

        if rect.rotation_handle().distance_to(&pointer) <= tolerance {
            return Some(Handle::Rotate);
        }

        let corner = Corner::ALL
            .iter()
            .map(|&c| (c, rect.corner(c).distance_to(&pointer)))
            .filter(|(_, d)| *d <= tolerance)
            .min_by(|a, b| a.1.total_cmp(&b.1));
        if let Some((corner, _)) = corner {
            return Some(Handle::Corner(corner));
        }

        if rect.contains(pointer) {
            Some(Handle::Body)
        } else {
            None
        }
    }
}

/// Corner of a placement's box, named in its unrotated screen frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomRight,
        Corner::BottomLeft,
    ];

    /// Unit signs of the corner relative to the center (screen frame, Y down).
    pub fn signs(&self) -> Point {
        match self {
            Corner::TopLeft => Point::new(-1.0, -1.0),
            Corner::TopRight => Point::new(1.0, -1.0),
            Corner::BottomRight => Point::new(1.0, 1.0),
            Corner::BottomLeft => Point::new(-1.0, 1.0),
        }
    }
}

/// What a pointer landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handle {
    Corner(Corner),
    Rotate,
    Body,
}

/// A rotated rectangle in screen space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenRect {
    pub center: Point,
    pub size: Size,
    /// Degrees, clockwise.
    pub rotation: f64,
}

impl ScreenRect {
    /// Offset of a corner from the center in the unrotated frame.
    pub fn local_corner(&self, corner: Corner) -> Point {
        let s = corner.signs();
        Point::new(s.x * self.size.width / 2.0, s.y * self.size.height / 2.0)
    }

    pub fn corner(&self, corner: Corner) -> Point {
        self.center + self.local_corner(corner).rotated(self.rotation)
    }

    pub fn rotation_handle(&self) -> Point {
        let local = Point::new(0.0, -self.size.height / 2.0 - ROTATION_HANDLE_OFFSET_PX);
        self.center + local.rotated(self.rotation)
    }

    /// Converts a screen point into the rectangle's unrotated local frame.
    pub fn to_local(&self, point: Point) -> Point {
        (point - self.center).rotated(-self.rotation)
    }

    pub fn contains(&self, point: Point) -> bool {
        let local = self.to_local(point);
        local.x.abs() <= self.size.width / 2.0 && local.y.abs() <= self.size.height / 2.0
    }
}
