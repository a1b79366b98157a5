//! Geometric primitives for board layout.
//!
//! This module provides the fundamental geometric types used throughout
//! Copperflow for positioning components, checking collisions, and building
//! trace geometry.
//!
//! # Coordinate System
//!
//! All coordinates are in **millimeters** of board space:
//!
//! ```text
//!   (0,0) ────────► +X
//!     │
//!     │
//!     ▼
//!    +Y
//! ```
//!
//! - **Origin**: Top-left corner of the board at `(0, 0)`
//! - **X-axis**: Increases rightward
//! - **Y-axis**: Increases downward
//!
//! This matches the convention used by board-description formats the output
//! is eventually written into.

use serde::{Deserialize, Serialize};

/// A 2D point in board space, in millimeters.
///
/// # Examples
///
/// ```
/// # use copperflow_core::geometry::Point;
/// let a = Point::new(10.0, 20.0);
/// let b = Point::new(13.0, 24.0);
/// assert_eq!(a.distance_to(b), 5.0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    x: f32,
    y: f32,
}

impl Point {
    /// Creates a new point with the specified coordinates.
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Returns the x-coordinate of the point.
    pub fn x(self) -> f32 {
        self.x
    }

    /// Returns the y-coordinate of the point.
    pub fn y(self) -> f32 {
        self.y
    }

    /// Adds an offset to this point, returning a new point.
    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Euclidean distance between this point and another.
    pub fn distance_to(self, other: Point) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Returns true if both coordinates are finite.
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Converts a center point and size into a bounds rectangle.
    pub fn to_bounds(self, size: Size) -> Bounds {
        Bounds::from_center(self, size)
    }
}

/// Width and height of an element, in millimeters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    width: f32,
    height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Returns the width dimension.
    pub fn width(self) -> f32 {
        self.width
    }

    /// Returns the height dimension.
    pub fn height(self) -> f32 {
        self.height
    }

    /// Returns the size with width and height exchanged.
    pub fn swapped(self) -> Self {
        Self {
            width: self.height,
            height: self.width,
        }
    }

    /// Returns the larger of the two dimensions.
    pub fn max_dimension(self) -> f32 {
        self.width.max(self.height)
    }

    /// Returns true if width and height are equal.
    pub fn is_square(self) -> bool {
        self.width == self.height
    }
}

/// An axis-aligned rectangle defined by minimum and maximum coordinates.
///
/// Used both for component bounding boxes (collision and zone checks) and
/// for rectangular regions such as grid cells and copper pours.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    min_x: f32,
    min_y: f32,
    max_x: f32,
    max_y: f32,
}

impl Bounds {
    /// Creates bounds from a center point and a size.
    pub fn from_center(center: Point, size: Size) -> Self {
        let half_width = size.width / 2.0;
        let half_height = size.height / 2.0;
        Self {
            min_x: center.x - half_width,
            min_y: center.y - half_height,
            max_x: center.x + half_width,
            max_y: center.y + half_height,
        }
    }

    /// Creates bounds from a top-left corner and a size.
    pub fn from_top_left(top_left: Point, size: Size) -> Self {
        Self {
            min_x: top_left.x,
            min_y: top_left.y,
            max_x: top_left.x + size.width,
            max_y: top_left.y + size.height,
        }
    }

    /// Returns the minimum x-coordinate.
    pub fn min_x(self) -> f32 {
        self.min_x
    }

    /// Returns the minimum y-coordinate.
    pub fn min_y(self) -> f32 {
        self.min_y
    }

    /// Returns the maximum x-coordinate.
    pub fn max_x(self) -> f32 {
        self.max_x
    }

    /// Returns the maximum y-coordinate.
    pub fn max_y(self) -> f32 {
        self.max_y
    }

    /// Returns the width of the bounds.
    pub fn width(self) -> f32 {
        self.max_x - self.min_x
    }

    /// Returns the height of the bounds.
    pub fn height(self) -> f32 {
        self.max_y - self.min_y
    }

    /// Returns the center point of the bounds.
    pub fn center(self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    /// Returns the four corners in clockwise order starting at the top-left.
    pub fn corners(self) -> [Point; 4] {
        [
            Point::new(self.min_x, self.min_y),
            Point::new(self.max_x, self.min_y),
            Point::new(self.max_x, self.max_y),
            Point::new(self.min_x, self.max_y),
        ]
    }

    /// Grows the bounds outward by `amount` on all four sides.
    ///
    /// A negative amount shrinks the bounds; the caller is responsible for
    /// keeping the result non-degenerate.
    ///
    /// # Examples
    ///
    /// ```
    /// # use copperflow_core::geometry::{Bounds, Point, Size};
    /// let b = Bounds::from_center(Point::new(5.0, 5.0), Size::new(2.0, 2.0));
    /// let inflated = b.inflate(1.0);
    /// assert_eq!(inflated.min_x(), 3.0);
    /// assert_eq!(inflated.max_y(), 7.0);
    /// ```
    pub fn inflate(self, amount: f32) -> Self {
        Self {
            min_x: self.min_x - amount,
            min_y: self.min_y - amount,
            max_x: self.max_x + amount,
            max_y: self.max_y + amount,
        }
    }

    /// Returns true if the interiors of the two rectangles overlap.
    ///
    /// Rectangles that merely share an edge do **not** intersect; collision
    /// checks treat exactly-touching boxes as clear.
    pub fn intersects(self, other: Bounds) -> bool {
        let separated = self.max_x <= other.min_x
            || other.max_x <= self.min_x
            || self.max_y <= other.min_y
            || other.max_y <= self.min_y;
        !separated
    }

    /// Returns true if `other` lies entirely within this rectangle
    /// (boundary contact allowed).
    pub fn contains(self, other: Bounds) -> bool {
        other.min_x >= self.min_x
            && other.max_x <= self.max_x
            && other.min_y >= self.min_y
            && other.max_y <= self.max_y
    }

    /// Returns true if the point lies within this rectangle
    /// (boundary contact allowed).
    pub fn contains_point(self, point: Point) -> bool {
        point.x >= self.min_x
            && point.x <= self.max_x
            && point.y >= self.min_y
            && point.y <= self.max_y
    }
}
