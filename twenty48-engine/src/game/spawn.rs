//! Tile Spawning
//!
//! New tiles appear on a uniformly random empty cell. All randomness comes
//! from the game's [`DeterministicRng`].

use serde::{Serialize, Deserialize};
use tracing::debug;

use crate::core::rng::DeterministicRng;
use crate::error::GameError;
use crate::game::state::{Board, Cell, TileId};
use crate::{INITIAL_TILE_COUNT, INITIAL_TILE_VALUE, SPAWN_VALUES};

/// A tile placed by the spawner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnedTile {
    /// New tile's identity
    pub id: TileId,
    /// Where it landed
    pub cell: Cell,
    /// Its value
    pub value: u32,
}

/// Spawn a 2 or a 4 on a random empty cell.
///
/// Returns [`GameError::BoardFull`] when there is nowhere to put it; the
/// RNG is not advanced in that case.
pub fn spawn_tile(board: &mut Board, rng: &mut DeterministicRng) -> Result<SpawnedTile, GameError> {
    let empty = board.empty_cells();
    let cell = *rng.choose(&empty).ok_or(GameError::BoardFull)?;
    let value = rng.choose(&SPAWN_VALUES).copied().unwrap_or(INITIAL_TILE_VALUE);
    place(board, cell, value)
}

/// Place the opening tiles of a game, each on a distinct empty cell.
pub fn spawn_initial_tiles(board: &mut Board, rng: &mut DeterministicRng) -> Result<Vec<SpawnedTile>, GameError> {
    (0..INITIAL_TILE_COUNT)
        .map(|_| {
            let empty = board.empty_cells();
            let cell = *rng.choose(&empty).ok_or(GameError::BoardFull)?;
            place(board, cell, INITIAL_TILE_VALUE)
        })
        .collect()
}

fn place(board: &mut Board, cell: Cell, value: u32) -> Result<SpawnedTile, GameError> {
    let id = board.place(cell, value)?;
    debug!("Spawned {} {} at {}", value, id, cell);
    Ok(SpawnedTile { id, cell, value })
}
