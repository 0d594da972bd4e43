//! Error types for the engine.

use thiserror::Error;

use crate::game::state::{Cell, TileId};

/// Errors produced by board and game operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// Tile values must be a power of two, at least 2.
    #[error("invalid tile value {0}: must be a power of two >= 2")]
    InvalidTileValue(u32),

    /// Coordinates outside the board.
    #[error("cell ({row}, {col}) is outside the board")]
    CellOutOfBounds {
        /// Requested row
        row: u8,
        /// Requested column
        col: u8,
    },

    /// A cell key that is not of the form `row,col`.
    #[error("invalid cell key {0:?}")]
    InvalidCellKey(String),

    /// A second tile was placed on an occupied cell.
    #[error("cell {0} is already occupied")]
    CellOccupied(Cell),

    /// No tile where one was expected.
    #[error("no tile on cell {0}")]
    TileMissing(Cell),

    /// A stored board keyed a tile under a cell other than its own.
    #[error("tile on {tile} stored under key {key}")]
    CellMismatch {
        /// Map key
        key: Cell,
        /// The tile's own cell
        tile: Cell,
    },

    /// A stored tile id that is not unique or not below the board's next id.
    #[error("tile id {0} is reused")]
    InvalidTileId(TileId),

    /// No empty cell left to spawn into.
    #[error("board is full")]
    BoardFull,

    /// The game has ended; no further moves are accepted.
    #[error("game is over")]
    GameOver,

    /// A move is still animating.
    #[error("a move is already in progress")]
    MoveInProgress,
}

/// Errors produced while loading configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The seed variable was set but did not parse as a u64.
    #[error("invalid seed {value:?} in {var}")]
    InvalidSeed {
        /// Environment variable name
        var: &'static str,
        /// Raw value found
        value: String,
    },
}
