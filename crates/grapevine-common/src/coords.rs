//! Screen-space coordinate types.
//!
//! All positions are integer pixels with the origin at the top-left corner of
//! the window, so a smaller `y` is higher on screen.

use serde::{Deserialize, Serialize};

/// A position in screen space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ScreenPos {
    /// Horizontal coordinate in pixels
    pub x: i32,
    /// Vertical coordinate in pixels (grows downwards)
    pub y: i32,
}

impl ScreenPos {
    /// Creates a new screen position.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns this position moved by the given offset.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }

    /// Per-axis absolute distance to another position.
    #[must_use]
    pub const fn axis_distance(self, other: Self) -> (u32, u32) {
        (self.x.abs_diff(other.x), self.y.abs_diff(other.y))
    }
}

/// Width and height of a rectangle in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Extent {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Extent {
    /// Creates a new extent.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for Extent {
    fn default() -> Self {
        // Default character surface size.
        Self::new(30, 20)
    }
}

/// Axis-aligned rectangle anchored at its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScreenRect {
    /// Top-left corner
    pub origin: ScreenPos,
    /// Size of the rectangle
    pub extent: Extent,
}

impl ScreenRect {
    /// Creates a rectangle from its top-left corner and size.
    #[must_use]
    pub const fn new(origin: ScreenPos, extent: Extent) -> Self {
        Self { origin, extent }
    }

    /// Left edge (inclusive).
    #[must_use]
    pub const fn left(&self) -> i64 {
        self.origin.x as i64
    }

    /// Right edge (exclusive).
    #[must_use]
    pub const fn right(&self) -> i64 {
        self.origin.x as i64 + self.extent.width as i64
    }

    /// Top edge (inclusive).
    #[must_use]
    pub const fn top(&self) -> i64 {
        self.origin.y as i64
    }

    /// Bottom edge (exclusive).
    #[must_use]
    pub const fn bottom(&self) -> i64 {
        self.origin.y as i64 + self.extent.height as i64
    }

    /// Checks whether two rectangles share any interior area.
    ///
    /// Rectangles that only touch along an edge do not intersect.
    #[must_use]
    pub const fn intersects(&self, other: &Self) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }

    /// Clamps a position so that a rectangle of `extent` placed there stays
    /// inside `self`.
    #[must_use]
    pub fn clamp_inside(&self, pos: ScreenPos, extent: Extent) -> ScreenPos {
        let max_x = (self.right() - extent.width as i64).max(self.left());
        let max_y = (self.bottom() - extent.height as i64).max(self.top());
        ScreenPos {
            x: (pos.x as i64).clamp(self.left(), max_x) as i32,
            y: (pos.y as i64).clamp(self.top(), max_y) as i32,
        }
    }
}
