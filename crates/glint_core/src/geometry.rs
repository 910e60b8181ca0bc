//! Geometry value types.
//!
//! All coordinates are `f32` pixels with the origin at the top left and `y`
//! growing downwards.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

/// A 2D point (or vector).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate.
    pub x: f32,
    /// Y coordinate.
    pub y: f32,
}

impl Point {
    /// The origin.
    pub const ZERO: Self = Self::new(0.0, 0.0);

    /// Creates a new point.
    #[inline]
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Creates a point with both coordinates set to `value`.
    #[inline]
    #[must_use]
    pub const fn splat(value: f32) -> Self {
        Self::new(value, value)
    }
}

impl Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Point {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

/// A 2D extent.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Size {
    /// Width.
    pub width: f32,
    /// Height.
    pub height: f32,
}

impl Size {
    /// Zero size.
    pub const ZERO: Self = Self::new(0.0, 0.0);

    /// Creates a new size.
    #[inline]
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Grows the size by `amount` on every side.
    #[inline]
    #[must_use]
    pub fn pad(self, amount: Point) -> Self {
        Self::new(self.width + amount.x * 2.0, self.height + amount.y * 2.0)
    }
}

/// Axis-aligned rectangle stored as edges.
///
/// A bounds with `right <= left` or `bottom <= top` is empty.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Bounds {
    /// Left edge.
    pub left: f32,
    /// Top edge.
    pub top: f32,
    /// Right edge.
    pub right: f32,
    /// Bottom edge.
    pub bottom: f32,
}

impl Bounds {
    /// Zero-sized bounds at the origin. Used as the placeholder for regions
    /// whose final bounds are patched in later.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    /// Creates bounds from edges.
    #[inline]
    #[must_use]
    pub const fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self { left, top, right, bottom }
    }

    /// Creates bounds from a position and size.
    #[inline]
    #[must_use]
    pub fn from_pos_size(pos: Point, size: Size) -> Self {
        Self::new(pos.x, pos.y, pos.x + size.width, pos.y + size.height)
    }

    /// Creates bounds at the origin with the given size.
    #[inline]
    #[must_use]
    pub fn from_size(size: Size) -> Self {
        Self::from_pos_size(Point::ZERO, size)
    }

    /// Smallest bounds containing both points.
    #[must_use]
    pub fn from_points(a: Point, b: Point) -> Self {
        Self::new(a.x.min(b.x), a.y.min(b.y), a.x.max(b.x), a.y.max(b.y))
    }

    /// Width (may be negative for inverted bounds).
    #[inline]
    #[must_use]
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    /// Height (may be negative for inverted bounds).
    #[inline]
    #[must_use]
    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    /// Size of the bounds.
    #[inline]
    #[must_use]
    pub fn size(&self) -> Size {
        Size::new(self.width(), self.height())
    }

    /// Top-left corner.
    #[inline]
    #[must_use]
    pub fn origin(&self) -> Point {
        Point::new(self.left, self.top)
    }

    /// Center point.
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new((self.left + self.right) * 0.5, (self.top + self.bottom) * 0.5)
    }

    /// Returns true if the bounds cover no area.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.right <= self.left || self.bottom <= self.top
    }

    /// Returns true if the point is inside (right and bottom edges exclusive).
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.left && point.x < self.right && point.y >= self.top && point.y < self.bottom
    }

    /// Returns true if two bounds overlap with a non-zero area.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        !self.intersection(other).is_empty()
    }

    /// Intersection of two bounds. The result may be empty.
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Self {
        Self::new(
            self.left.max(other.left),
            self.top.max(other.top),
            self.right.min(other.right),
            self.bottom.min(other.bottom),
        )
    }

    /// Translates the bounds by `offset`.
    #[inline]
    #[must_use]
    pub fn offset(&self, offset: Point) -> Self {
        Self::new(
            self.left + offset.x,
            self.top + offset.y,
            self.right + offset.x,
            self.bottom + offset.y,
        )
    }

    /// Expands the bounds by the given amount on all sides.
    #[must_use]
    pub fn expand(&self, amount: f32) -> Self {
        Self::new(
            self.left - amount,
            self.top - amount,
            self.right + amount,
            self.bottom + amount,
        )
    }

    /// Shrinks the bounds by the given amount on all sides.
    #[must_use]
    pub fn shrink(&self, amount: f32) -> Self {
        self.expand(-amount)
    }

    /// Moves the bounds so its top-left corner is at `origin`, keeping its size.
    #[must_use]
    pub fn with_origin(&self, origin: Point) -> Self {
        Self::from_pos_size(origin, self.size())
    }
}
