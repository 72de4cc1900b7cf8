//! Row/column positions and relative lengths.
//!
//! Nodes never store absolute positions. They store a [`Length`] (byte count plus
//! row/column extent) and absolute positions are recovered by summing lengths
//! while walking the tree. This is what lets an edit shift everything after it
//! without touching the shifted nodes.

use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};
use text_size::TextSize;

/// A position in source code (0-indexed row, byte column).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Point {
    pub row: u32,
    pub column: u32,
}

/// A start/end pair of points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PointRange {
    pub start: Point,
    pub end: Point,
}

impl Point {
    pub const ZERO: Point = Point { row: 0, column: 0 };

    pub fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }
}

impl PointRange {
    pub fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    /// Check if a point falls within this range (end inclusive).
    pub fn contains(&self, point: Point) -> bool {
        self.start <= point && point <= self.end
    }
}

/// Size of a span of source text: bytes plus row/column extent.
///
/// The extent follows the usual convention: if the span crosses line breaks,
/// `extent.row` counts them and `extent.column` is the column of the end on the
/// last line; otherwise `extent.column` is the width in bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Length {
    pub bytes: TextSize,
    pub extent: Point,
}

impl Length {
    pub const ZERO: Length = Length { bytes: TextSize::new(0), extent: Point::ZERO };

    pub fn new(bytes: TextSize, extent: Point) -> Self {
        Self { bytes, extent }
    }

    /// Measure a slice of source text.
    pub fn of(text: &[u8]) -> Self {
        let mut extent = Point::ZERO;
        for &byte in text {
            if byte == b'\n' {
                extent.row += 1;
                extent.column = 0;
            } else {
                extent.column += 1;
            }
        }
        Self { bytes: TextSize::new(text.len() as u32), extent }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes == TextSize::new(0)
    }

    /// Byte offset as `usize`, for slicing.
    pub fn offset(&self) -> usize {
        u32::from(self.bytes) as usize
    }
}

impl Add for Length {
    type Output = Length;

    fn add(self, rhs: Length) -> Length {
        let extent = if rhs.extent.row > 0 {
            Point::new(self.extent.row + rhs.extent.row, rhs.extent.column)
        } else {
            Point::new(self.extent.row, self.extent.column + rhs.extent.column)
        };
        Length { bytes: self.bytes + rhs.bytes, extent }
    }
}

impl Sub for Length {
    type Output = Length;

    /// Distance from `rhs` to `self`. Saturates at zero.
    fn sub(self, rhs: Length) -> Length {
        if self.bytes <= rhs.bytes {
            return Length::ZERO;
        }
        let extent = if self.extent.row > rhs.extent.row {
            Point::new(self.extent.row - rhs.extent.row, self.extent.column)
        } else {
            Point::new(0, self.extent.column.saturating_sub(rhs.extent.column))
        };
        Length { bytes: self.bytes - rhs.bytes, extent }
    }
}
