//! Core geometry types: Size, Rectangle, Margins.
//!
//! Coordinates are native pixels. A [`Rectangle`] is always expressed in the
//! client coordinates of the parent window, the same space `set_bounds` uses.

use std::fmt;
use std::ops::{Add, Sub};

// ---------------------------------------------------------------------------
// Size
// ---------------------------------------------------------------------------

/// A 2D size in pixels (width x height).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    /// A zero-sized size.
    pub const ZERO: Size = Size { width: 0, height: 0 };

    /// Create a new size.
    #[inline]
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Convert dialog units into pixels using the platform's dialog base units.
    ///
    /// Horizontal base units cover 4 dialog units, vertical base units cover 8.
    #[inline]
    pub const fn from_dialog_units(dialog_units: Size, base_units: Size) -> Size {
        Size {
            width: dialog_units.width * base_units.width / 4,
            height: dialog_units.height * base_units.height / 8,
        }
    }

    /// Convert to a [`Rectangle`] positioned at the origin.
    #[inline]
    pub const fn to_rectangle(self) -> Rectangle {
        Rectangle { x: 0, y: 0, width: self.width, height: self.height }
    }
}

impl Add for Size {
    type Output = Size;
    #[inline]
    fn add(self, rhs: Size) -> Size {
        Size { width: self.width + rhs.width, height: self.height + rhs.height }
    }
}

impl Sub for Size {
    type Output = Size;
    #[inline]
    fn sub(self, rhs: Size) -> Size {
        Size { width: self.width - rhs.width, height: self.height - rhs.height }
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

// ---------------------------------------------------------------------------
// Rectangle
// ---------------------------------------------------------------------------

/// A rectangle defined by its top-left corner and size.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rectangle {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rectangle {
    /// An empty rectangle at the origin.
    pub const EMPTY: Rectangle = Rectangle { x: 0, y: 0, width: 0, height: 0 };

    /// Create a new rectangle.
    #[inline]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// The right edge (exclusive): `x + width`.
    #[inline]
    pub const fn right(self) -> i32 {
        self.x + self.width
    }

    /// The bottom edge (exclusive): `y + height`.
    #[inline]
    pub const fn bottom(self) -> i32 {
        self.y + self.height
    }

    /// The dimensions as a [`Size`].
    #[inline]
    pub const fn size(self) -> Size {
        Size { width: self.width, height: self.height }
    }

    /// Whether the rectangle has zero or negative area.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Shrink the rectangle by the given margins on each side.
    ///
    /// Width and height are clamped at zero.
    #[inline]
    pub fn shrink(self, margins: Margins) -> Rectangle {
        Rectangle {
            x: self.x + margins.left,
            y: self.y + margins.top,
            width: (self.width - margins.horizontal()).max(0),
            height: (self.height - margins.vertical()).max(0),
        }
    }

    /// Move the rectangle by `(dx, dy)`.
    #[inline]
    pub const fn translate(self, dx: i32, dy: i32) -> Rectangle {
        Rectangle { x: self.x + dx, y: self.y + dy, width: self.width, height: self.height }
    }
}

impl fmt::Display for Rectangle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{} {}x{}", self.x, self.y, self.width, self.height)
    }
}

// ---------------------------------------------------------------------------
// Margins
// ---------------------------------------------------------------------------

/// Four-sided spacing (top, right, bottom, left), as used by layout margins.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Margins {
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub left: i32,
}

impl Margins {
    /// No spacing.
    pub const ZERO: Margins = Margins { top: 0, right: 0, bottom: 0, left: 0 };

    /// Create margins from individual sides.
    #[inline]
    pub const fn new(top: i32, right: i32, bottom: i32, left: i32) -> Self {
        Self { top, right, bottom, left }
    }

    /// Same spacing on all four sides.
    #[inline]
    pub const fn all(value: i32) -> Self {
        Self { top: value, right: value, bottom: value, left: value }
    }

    /// Total horizontal spacing (`left + right`).
    #[inline]
    pub const fn horizontal(self) -> i32 {
        self.left + self.right
    }

    /// Total vertical spacing (`top + bottom`).
    #[inline]
    pub const fn vertical(self) -> i32 {
        self.top + self.bottom
    }
}

// ===========================================================================
// Tests
// ===========================================================================
