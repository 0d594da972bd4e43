//! Integer Pixel Vector
//!
//! Board-space pixel coordinates for tile animation.
//! Origin is the top-left corner of the board, y grows downward.

use std::fmt;
use std::ops::Add;
use serde::{Serialize, Deserialize};

use crate::CELL_SIZE;

/// 2D vector with integer pixel components.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PixelVec {
    /// X component (pixels, grows right)
    pub x: i32,
    /// Y component (pixels, grows down)
    pub y: i32,
}

impl PixelVec {
    /// Create a new vector.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Top-left corner of the cell at `(row, col)`.
    #[inline]
    pub const fn from_cell(row: u8, col: u8) -> Self {
        Self {
            x: col as i32 * CELL_SIZE,
            y: row as i32 * CELL_SIZE,
        }
    }
}

impl Add for PixelVec {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self {
            x: self.x.wrapping_add(rhs.x),
            y: self.y.wrapping_add(rhs.y),
        }
    }
}

impl fmt::Debug for PixelVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Px({}, {})", self.x, self.y)
    }
}

impl fmt::Display for PixelVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// =============================================================================
// TESTS
// =============================================================================
