//! Hex geometry for a flat-top grid laid out in offset (row, col) coordinates.
//!
//! This module provides the primitives the grid is built from:
//! - `Point`: a position in pixel space
//! - `OffsetCoord`: the logical (row, col) address of a cell
//! - `Side`: one of the six edges of a hex
//! - `HexMetrics`: cell size and step distances derived from a radius
//!
//! Odd columns are shifted down by half a cell, so neighbor lookups are a
//! closed-form function of the coordinate and never need the geometry.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Tolerance for matching corner points, relative to a radius of 1.
pub const CORNER_EPSILON: f64 = 1e-6;

/// A point in pixel space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Create a new point
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance_to(&self, other: &Point) -> f64 {
        ((other.x - self.x).powi(2) + (other.y - self.y).powi(2)).sqrt()
    }

    /// Whether both components are within `epsilon` of the other point
    pub fn approx_eq(&self, other: &Point, epsilon: f64) -> bool {
        (self.x - other.x).abs() < epsilon && (self.y - other.y).abs() < epsilon
    }
}

/// Logical address of a cell in the grid.
///
/// Rows grow downwards, columns grow to the right. Odd columns sit half a
/// cell lower than even ones.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct OffsetCoord {
    pub row: usize,
    pub col: usize,
}

impl OffsetCoord {
    /// Create a new offset coordinate
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Whether this cell sits in a column shifted down by half a cell
    pub const fn is_odd_column(&self) -> bool {
        self.col % 2 == 1
    }

    /// The coordinate across the given side.
    ///
    /// Returns `None` when the neighbor would have a negative row or column.
    /// Upper bounds are the grid's concern.
    pub fn neighbor(&self, side: Side) -> Option<OffsetCoord> {
        let odd = self.is_odd_column();
        let (dr, dc): (isize, isize) = match side {
            Side::NorthEast => (if odd { 0 } else { -1 }, 1),
            Side::SouthEast => (if odd { 1 } else { 0 }, 1),
            Side::South => (1, 0),
            Side::SouthWest => (if odd { 1 } else { 0 }, -1),
            Side::NorthWest => (if odd { 0 } else { -1 }, -1),
            Side::North => (-1, 0),
        };

        let row = self.row.checked_add_signed(dr)?;
        let col = self.col.checked_add_signed(dc)?;
        Some(OffsetCoord::new(row, col))
    }

    /// All six potential neighbors, indexed by side
    pub fn neighbors(&self) -> [Option<OffsetCoord>; 6] {
        Side::ALL.map(|side| self.neighbor(side))
    }
}

/// One of the six sides of a flat-top hex, in clockwise screen order.
///
/// Side `s` is the edge between corners `(s + 5) % 6` and `s`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Upper right edge
    NorthEast = 0,
    /// Lower right edge
    SouthEast = 1,
    /// Bottom edge
    South = 2,
    /// Lower left edge
    SouthWest = 3,
    /// Upper left edge
    NorthWest = 4,
    /// Top edge
    North = 5,
}

impl Side {
    /// All sides in slot order
    pub const ALL: [Side; 6] = [
        Side::NorthEast,
        Side::SouthEast,
        Side::South,
        Side::SouthWest,
        Side::NorthWest,
        Side::North,
    ];

    /// Slot index of this side (0..6)
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Side for a slot index, wrapping modulo 6
    pub const fn from_index(index: usize) -> Side {
        Self::ALL[index % 6]
    }

    /// The side of the neighbor that faces back across this edge
    pub const fn opposite(self) -> Side {
        Self::from_index(self.index() + 3)
    }

    /// Indices of the two corners bounding this side
    pub const fn corners(self) -> [usize; 2] {
        [(self.index() + 5) % 6, self.index()]
    }

    /// Index of the neighbor's corner that coincides with corner `index()` of this cell
    pub const fn matching_corner(self) -> usize {
        (self.index() + 2) % 6
    }
}

/// The six corners of a hex, corner `i` at angle `i/6 * 2π` from the center
pub fn hex_corners(center: Point, radius: f64) -> [Point; 6] {
    std::array::from_fn(|i| {
        let angle = i as f64 / 6.0 * 2.0 * PI;
        Point::new(
            center.x + angle.cos() * radius,
            center.y + angle.sin() * radius,
        )
    })
}

/// Sizes and step distances of a single cell, derived from its radius
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HexMetrics {
    /// Distance from center to any corner
    pub radius: f64,
    /// Bounding box width (corner to corner)
    pub width: f64,
    /// Bounding box height (edge to edge)
    pub height: f64,
    /// Horizontal distance between the centers of adjacent columns
    pub column_step: f64,
    /// Vertical distance between the centers of adjacent rows
    pub row_step: f64,
}

impl HexMetrics {
    /// Measure a hex of the given radius centered on the origin
    pub fn from_radius(radius: f64) -> Self {
        let corners = hex_corners(Point::default(), radius);
        let (min_x, max_x) = extent(corners.iter().map(|p| p.x));
        let (min_y, max_y) = extent(corners.iter().map(|p| p.y));
        let height = max_y - min_y;

        Self {
            radius,
            width: max_x - min_x,
            height,
            column_step: radius * 1.5,
            row_step: height,
        }
    }

    /// Vertical shift applied to odd columns
    pub fn odd_column_offset(&self) -> f64 {
        self.height / 2.0
    }

    /// Pixel center of the cell at `coord`, with the grid's top-left at the origin
    pub fn center_of(&self, coord: OffsetCoord) -> Point {
        let offset = if coord.is_odd_column() {
            self.odd_column_offset()
        } else {
            0.0
        };
        Point::new(
            self.radius + self.column_step * coord.col as f64,
            self.height / 2.0 + self.row_step * coord.row as f64 + offset,
        )
    }

    /// Corner comparison tolerance scaled to this radius
    pub fn epsilon(&self) -> f64 {
        CORNER_EPSILON * self.radius.max(1.0)
    }
}

fn extent(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    })
}
