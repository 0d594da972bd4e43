//! Directions and Board Traversal
//!
//! A move is described by a single [`Traversal`]: an axis selector and a
//! sign. Every direction-dependent question the resolver asks (which tiles
//! go first, where the edge is, what lies ahead, how a pixel coordinate maps
//! back to a cell) is answered here, so the resolver has one code path for
//! all four directions.

use std::fmt;
use std::str::FromStr;
use serde::{Serialize, Deserialize};

use crate::core::vec2::PixelVec;
use crate::{CELL_SIZE, COLS, ROWS};

// =============================================================================
// DIRECTION
// =============================================================================

/// Direction a move slides tiles towards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Direction {
    /// Towards column 0
    Left = 0,
    /// Towards the last column
    Right = 1,
    /// Towards row 0
    Up = 2,
    /// Towards the last row
    Down = 3,
}

impl Direction {
    /// All directions, in a fixed order.
    pub const ALL: [Direction; 4] = [
        Direction::Left,
        Direction::Right,
        Direction::Up,
        Direction::Down,
    ];

    /// The traversal parameters for this direction.
    #[inline]
    pub fn traversal(self) -> Traversal {
        match self {
            Direction::Left => Traversal::new(Axis::Horizontal, -1),
            Direction::Right => Traversal::new(Axis::Horizontal, 1),
            Direction::Up => Traversal::new(Axis::Vertical, -1),
            Direction::Down => Traversal::new(Axis::Vertical, 1),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Left => "left",
            Direction::Right => "right",
            Direction::Up => "up",
            Direction::Down => "down",
        };
        f.write_str(name)
    }
}

impl FromStr for Direction {
    type Err = String;

    /// Accepts direction names and WASD letters, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" | "a" => Ok(Direction::Left),
            "right" | "d" => Ok(Direction::Right),
            "up" | "w" => Ok(Direction::Up),
            "down" | "s" => Ok(Direction::Down),
            other => Err(format!("unknown direction {:?}", other)),
        }
    }
}

// =============================================================================
// COMMANDS
// =============================================================================

/// Discrete command produced by the event loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Slide all tiles in a direction
    Move(Direction),
    /// Leave the game
    Quit,
}

// =============================================================================
// TRAVERSAL
// =============================================================================

/// Axis a move travels along.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    /// Along x (left/right moves)
    Horizontal,
    /// Along y (up/down moves)
    Vertical,
}

/// Direction-independent description of a move.
///
/// `sign` is -1 when travelling towards coordinate 0 and +1 otherwise.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Traversal {
    /// Axis of travel
    pub axis: Axis,
    /// -1 or +1
    pub sign: i32,
}

impl Traversal {
    /// Create a traversal. Any negative sign means "towards 0".
    pub const fn new(axis: Axis, sign: i32) -> Self {
        let sign = if sign < 0 { -1 } else { 1 };
        Self { axis, sign }
    }

    /// Number of cells along the axis of travel.
    #[inline]
    pub fn lane_len(&self) -> u8 {
        match self.axis {
            Axis::Horizontal => COLS,
            Axis::Vertical => ROWS,
        }
    }

    /// Coordinate along the axis of travel.
    #[inline]
    pub fn along(&self, pos: PixelVec) -> i32 {
        match self.axis {
            Axis::Horizontal => pos.x,
            Axis::Vertical => pos.y,
        }
    }

    /// Coordinate across the axis of travel (identifies the line).
    #[inline]
    pub fn across(&self, pos: PixelVec) -> i32 {
        match self.axis {
            Axis::Horizontal => pos.y,
            Axis::Vertical => pos.x,
        }
    }

    /// Pixel coordinate of the target edge along the axis.
    #[inline]
    pub fn edge(&self) -> i32 {
        if self.sign < 0 {
            0
        } else {
            (self.lane_len() as i32 - 1) * CELL_SIZE
        }
    }

    /// Whether a tile at `pos` already sits on the target edge.
    #[inline]
    pub fn at_edge(&self, pos: PixelVec) -> bool {
        self.along(pos) == self.edge()
    }

    /// Remaining travel before the edge.
    #[inline]
    pub fn distance_to_edge(&self, pos: PixelVec) -> i32 {
        (self.edge() - self.along(pos)) * self.sign
    }

    /// Displacement of `amount` pixels in the direction of travel.
    #[inline]
    pub fn delta(&self, amount: i32) -> PixelVec {
        let signed = amount * self.sign;
        match self.axis {
            Axis::Horizontal => PixelVec::new(signed, 0),
            Axis::Vertical => PixelVec::new(0, signed),
        }
    }

    /// Gap from `from` to `to` when `to` lies strictly ahead on the same line.
    #[inline]
    pub fn gap_ahead(&self, from: PixelVec, to: PixelVec) -> Option<i32> {
        if self.across(from) != self.across(to) {
            return None;
        }
        let gap = (self.along(to) - self.along(from)) * self.sign;
        (gap > 0).then_some(gap)
    }

    /// Sort key putting tiles nearest the target edge first.
    ///
    /// Ties (same distance, different lines) break on the across coordinate.
    #[inline]
    pub fn order_key(&self, pos: PixelVec) -> (i32, i32) {
        (self.distance_to_edge(pos), self.across(pos))
    }

    /// Cell index for a coordinate along the axis, rounded toward the
    /// direction of travel and clamped to the board.
    pub fn cell_index(&self, along: i32) -> u8 {
        let index = if self.sign < 0 {
            along.div_euclid(CELL_SIZE)
        } else {
            (along + CELL_SIZE - 1).div_euclid(CELL_SIZE)
        };
        index.clamp(0, self.lane_len() as i32 - 1) as u8
    }

    /// Cell index for a coordinate across the axis (exact, lines never shift).
    pub fn line_index(&self, across: i32) -> u8 {
        let len = match self.axis {
            Axis::Horizontal => ROWS,
            Axis::Vertical => COLS,
        };
        across.div_euclid(CELL_SIZE).clamp(0, len as i32 - 1) as u8
    }

    /// `(row, col)` of the cell a pixel position settles into.
    pub fn settle_cell(&self, pos: PixelVec) -> (u8, u8) {
        let along = self.cell_index(self.along(pos));
        let line = self.line_index(self.across(pos));
        match self.axis {
            Axis::Horizontal => (line, along),
            Axis::Vertical => (along, line),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
