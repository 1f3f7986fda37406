//! Geometry primitives shared by the transform, the placement model and the
//! compositor.
//!
//! `Point` is used for normalized page points, screen points and plain 2D
//! vectors alike; the coordinate space is given by context.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// A 2D point (or vector).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Creates a new point.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Length of this point taken as a vector.
    pub fn length(&self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: &Point) -> f64 {
        (*self - *other).length()
    }

    /// Dot product with another vector.
    pub fn dot(&self, other: &Point) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Angle in degrees of the vector from `self` to `other`, measured with
    /// `atan2(dy, dx)`.
    ///
    /// In a Y-down (screen) space a growing angle is a clockwise turn.
    pub fn angle_to(&self, other: &Point) -> f64 {
        let d = *other - *self;
        d.y.atan2(d.x).to_degrees()
    }

    /// Rotates this vector by `degrees` about the origin.
    ///
    /// In a Y-down space positive angles rotate clockwise on screen.
    pub fn rotated(&self, degrees: f64) -> Point {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Point::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }

    /// Returns a unit vector in the same direction, or `None` for a
    /// (near) zero vector.
    pub fn normalized(&self) -> Option<Point> {
        let len = self.length();
        if len < 1e-12 || !len.is_finite() {
            None
        } else {
            Some(Point::new(self.x / len, self.y / len))
        }
    }

    /// Clamps both components into `[0, 1]`.
    pub fn clamp_unit(&self) -> Point {
        Point::new(self.x.clamp(0.0, 1.0), self.y.clamp(0.0, 1.0))
    }

    /// Returns true if both components are finite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.4}, {:.4})", self.x, self.y)
    }
}

/// A width/height pair.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    /// Creates a new size.
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Size of a pixel buffer.
    pub fn from_pixels(width: u32, height: u32) -> Self {
        Self::new(f64::from(width), f64::from(height))
    }

    /// True when either side is zero, negative or not finite.
    ///
    /// Such a size describes a page or viewport that is not laid out yet.
    pub fn is_empty(&self) -> bool {
        !(self.width.is_finite() && self.height.is_finite())
            || self.width <= 0.0
            || self.height <= 0.0
    }

    /// Width divided by height, `None` for an empty size.
    pub fn aspect_ratio(&self) -> Option<f64> {
        if self.is_empty() {
            None
        } else {
            Some(self.width / self.height)
        }
    }

    /// The longer of the two sides.
    pub fn longest_edge(&self) -> f64 {
        self.width.max(self.height)
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}x{:.1}", self.width, self.height)
    }
}

/// Normalizes an angle in degrees into `[0, 360)`.
pub fn normalize_degrees(degrees: f64) -> f64 {
    if !degrees.is_finite() {
        return 0.0;
    }
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}
