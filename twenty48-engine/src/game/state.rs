//! Game State Definitions
//!
//! Tiles, the board mapping and the top-level game state.
//! Uses BTreeMap for deterministic iteration order.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::core::hash::{compute_state_hash, StateHash, StateHasher};
use crate::core::rng::DeterministicRng;
use crate::core::vec2::PixelVec;
use crate::error::GameError;
use crate::game::events::GameEvent;
use crate::game::input::Direction;
use crate::game::slide::Slide;
use crate::game::spawn::spawn_initial_tiles;
use crate::{BOARD_CELLS, COLS, ROWS};

// =============================================================================
// CELL
// =============================================================================

/// A board coordinate.
///
/// Ordered row-major. Serializes as the string `"row,col"`, so a board
/// serializes as a JSON object keyed by cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Cell {
    /// Row, 0 at the top
    pub row: u8,
    /// Column, 0 at the left
    pub col: u8,
}

impl Cell {
    /// Create a cell, rejecting coordinates outside the board.
    pub fn new(row: u8, col: u8) -> Result<Self, GameError> {
        if row >= ROWS || col >= COLS {
            return Err(GameError::CellOutOfBounds { row, col });
        }
        Ok(Self { row, col })
    }

    /// All cells in row-major order.
    pub fn all() -> impl Iterator<Item = Cell> {
        (0..ROWS).flat_map(|row| (0..COLS).map(move |col| Cell { row, col }))
    }

    /// Pixel position of this cell's top-left corner.
    #[inline]
    pub fn origin(self) -> PixelVec {
        PixelVec::from_cell(self.row, self.col)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.row, self.col)
    }
}

impl FromStr for Cell {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || GameError::InvalidCellKey(s.to_string());
        let (row, col) = s.split_once(',').ok_or_else(invalid)?;
        let row = row.trim().parse::<u8>().map_err(|_| invalid())?;
        let col = col.trim().parse::<u8>().map_err(|_| invalid())?;
        Cell::new(row, col)
    }
}

impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Cell {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// TILE
// =============================================================================

/// Stable identity of a tile for its whole life on the board.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TileId(pub u32);

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A numbered tile.
///
/// `cell` is the logical position; `pos` is the pixel position, which runs
/// ahead of `cell` while a move animates and is reconciled when it settles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    /// Identity
    pub id: TileId,
    /// Power of two, at least 2
    pub value: u32,
    /// Logical cell
    pub cell: Cell,
    /// Top-left corner in board pixels
    pub pos: PixelVec,
}

impl Tile {
    /// Create a tile resting on `cell`.
    pub fn new(id: TileId, value: u32, cell: Cell) -> Result<Self, GameError> {
        if !Self::is_valid_value(value) {
            return Err(GameError::InvalidTileValue(value));
        }
        Ok(Self {
            id,
            value,
            cell,
            pos: cell.origin(),
        })
    }

    /// Whether `value` may appear on a tile.
    #[inline]
    pub fn is_valid_value(value: u32) -> bool {
        value >= 2 && value.is_power_of_two()
    }

    /// Double the value after a merge. Returns the new value.
    pub fn promote(&mut self) -> Result<u32, GameError> {
        self.value = self
            .value
            .checked_mul(2)
            .ok_or(GameError::InvalidTileValue(self.value))?;
        Ok(self.value)
    }

    /// Whether the pixel position agrees with the logical cell.
    #[inline]
    pub fn is_at_rest(&self) -> bool {
        self.pos == self.cell.origin()
    }

    /// Feed this tile into a state hash.
    pub fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.update_u32(self.id.0);
        hasher.update_u32(self.value);
        hasher.update_u8(self.cell.row);
        hasher.update_u8(self.cell.col);
        hasher.update_vec(self.pos);
    }
}

// =============================================================================
// BOARD
// =============================================================================

/// Mapping from cell to tile. At most one tile per cell.
///
/// While a move animates the map stays keyed by the cells tiles held when
/// the move began; it is rebuilt when the move settles.
///
/// Deserializing checks the stored board: keys must match each tile's
/// cell, values must be valid and ids unique and below `next_id`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StoredBoard")]
pub struct Board {
    pub(crate) tiles: BTreeMap<Cell, Tile>,
    next_id: u32,
}

/// Unchecked serialized form of a [`Board`].
#[derive(Deserialize)]
struct StoredBoard {
    tiles: BTreeMap<Cell, Tile>,
    next_id: u32,
}

impl TryFrom<StoredBoard> for Board {
    type Error = GameError;

    /// Tiles come back at rest on their cells.
    fn try_from(stored: StoredBoard) -> Result<Self, Self::Error> {
        let mut ids = BTreeSet::new();
        let mut tiles = Vec::with_capacity(stored.tiles.len());
        for (key, tile) in stored.tiles {
            if key != tile.cell {
                return Err(GameError::CellMismatch { key, tile: tile.cell });
            }
            if tile.id.0 >= stored.next_id || !ids.insert(tile.id) {
                return Err(GameError::InvalidTileId(tile.id));
            }
            tiles.push(Tile::new(tile.id, tile.value, tile.cell)?);
        }

        let mut board = Board {
            tiles: BTreeMap::new(),
            next_id: stored.next_id,
        };
        board.rebuild(tiles)?;
        Ok(board)
    }
}

impl Board {
    /// Empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a board from row values, 0 meaning empty.
    ///
    /// ```
    /// use twenty48::Board;
    ///
    /// let board = Board::from_rows([
    ///     [2, 2, 0, 0],
    ///     [0, 0, 0, 0],
    ///     [0, 0, 0, 4],
    ///     [0, 0, 0, 0],
    /// ]).unwrap();
    /// assert_eq!(board.len(), 3);
    /// ```
    pub fn from_rows(rows: [[u32; COLS as usize]; ROWS as usize]) -> Result<Self, GameError> {
        let mut board = Self::new();
        for cell in Cell::all() {
            let value = rows[cell.row as usize][cell.col as usize];
            if value != 0 {
                board.place(cell, value)?;
            }
        }
        Ok(board)
    }

    /// Values by row, 0 meaning empty.
    pub fn to_rows(&self) -> [[u32; COLS as usize]; ROWS as usize] {
        let mut rows = [[0u32; COLS as usize]; ROWS as usize];
        for (cell, tile) in &self.tiles {
            rows[cell.row as usize][cell.col as usize] = tile.value;
        }
        rows
    }

    /// Place a new tile on an empty cell.
    pub fn place(&mut self, cell: Cell, value: u32) -> Result<TileId, GameError> {
        if self.tiles.contains_key(&cell) {
            return Err(GameError::CellOccupied(cell));
        }
        let id = TileId(self.next_id);
        let tile = Tile::new(id, value, cell)?;
        self.next_id += 1;
        self.tiles.insert(cell, tile);
        Ok(id)
    }

    /// Tile on a cell.
    pub fn get(&self, cell: Cell) -> Option<&Tile> {
        self.tiles.get(&cell)
    }

    /// Value on a cell.
    pub fn value_at(&self, cell: Cell) -> Option<u32> {
        self.tiles.get(&cell).map(|t| t.value)
    }

    /// Find a tile by identity.
    pub fn find(&self, id: TileId) -> Option<&Tile> {
        self.tiles.values().find(|t| t.id == id)
    }

    /// Tiles in cell order.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.values()
    }

    /// Number of tiles.
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// No tiles at all.
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Every cell holds a tile.
    pub fn is_full(&self) -> bool {
        self.tiles.len() >= BOARD_CELLS
    }

    /// Cells without a tile, in row-major order.
    pub fn empty_cells(&self) -> Vec<Cell> {
        Cell::all().filter(|c| !self.tiles.contains_key(c)).collect()
    }

    /// Highest tile value, 0 on an empty board.
    pub fn max_value(&self) -> u32 {
        self.tiles.values().map(|t| t.value).max().unwrap_or(0)
    }

    /// Replace all tiles, keyed by each tile's `cell`.
    pub(crate) fn rebuild(&mut self, tiles: Vec<Tile>) -> Result<(), GameError> {
        self.tiles.clear();
        for tile in tiles {
            if self.tiles.insert(tile.cell, tile).is_some() {
                return Err(GameError::CellOccupied(tile.cell));
            }
        }
        Ok(())
    }

    /// Feed the board into a state hash.
    pub fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.update_u32(self.next_id);
        hasher.update_u32(self.tiles.len() as u32);
        for tile in self.tiles.values() {
            tile.hash_into(hasher);
        }
    }

    /// Hash of the board alone.
    pub fn compute_hash(&self) -> StateHash {
        let mut hasher = StateHasher::for_board();
        self.hash_into(&mut hasher);
        hasher.finalize()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.to_rows() {
            for value in row {
                if value == 0 {
                    write!(f, "{:>6}", ".")?;
                } else {
                    write!(f, "{:>6}", value)?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

// =============================================================================
// GAME PHASE
// =============================================================================

/// Current phase of the game.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum GamePhase {
    /// Waiting for a direction
    #[default]
    Idle,
    /// A move is animating; input is not accepted
    Sliding(Slide),
    /// A move settled on a full board
    GameOver,
}

impl GamePhase {
    fn code(&self) -> u8 {
        match self {
            GamePhase::Idle => 0,
            GamePhase::Sliding(_) => 1,
            GamePhase::GameOver => 2,
        }
    }
}

// =============================================================================
// GAME STATE
// =============================================================================

/// Complete state of one game.
#[derive(Clone, Debug)]
pub struct GameState {
    /// Tile mapping
    pub board: Board,

    /// Current phase
    pub phase: GamePhase,

    /// RNG seed (for verification)
    pub rng_seed: u64,

    /// Deterministic RNG state
    pub rng: DeterministicRng,

    /// Animation ticks run so far
    pub tick: u32,

    /// Completed moves that changed the board
    pub moves: u32,

    /// Events generated since the last `take_events`
    pub pending_events: Vec<GameEvent>,
}

impl GameState {
    /// Start a new game: two value-2 tiles on distinct random cells.
    pub fn new(rng_seed: u64) -> Result<Self, GameError> {
        let mut state = Self::with_board(Board::new(), rng_seed);
        let spawned = spawn_initial_tiles(&mut state.board, &mut state.rng)?;
        for tile in spawned {
            state.push_event(GameEvent::tile_spawned(state.tick, tile));
        }
        Ok(state)
    }

    /// Continue from an existing board.
    pub fn with_board(board: Board, rng_seed: u64) -> Self {
        Self {
            board,
            phase: GamePhase::Idle,
            rng_seed,
            rng: DeterministicRng::new(rng_seed),
            tick: 0,
            moves: 0,
            pending_events: Vec::new(),
        }
    }

    /// Start sliding tiles towards `direction`.
    ///
    /// The move runs over subsequent ticks; no other move is accepted
    /// until it settles.
    pub fn begin_move(&mut self, direction: Direction) -> Result<(), GameError> {
        let rejection = match self.phase {
            GamePhase::GameOver => GameError::GameOver,
            GamePhase::Sliding(_) => GameError::MoveInProgress,
            GamePhase::Idle => {
                self.phase = GamePhase::Sliding(Slide::begin(&self.board, direction));
                return Ok(());
            }
        };
        self.push_event(GameEvent::move_rejected(self.tick, direction, &rejection));
        Err(rejection)
    }

    /// Whether a move is animating.
    pub fn is_sliding(&self) -> bool {
        matches!(self.phase, GamePhase::Sliding(_))
    }

    /// Whether the game has ended.
    pub fn is_over(&self) -> bool {
        matches!(self.phase, GamePhase::GameOver)
    }

    /// Highest tile value on the board.
    pub fn max_tile(&self) -> u32 {
        self.board.max_value()
    }

    /// Compute hash of current state for verification.
    pub fn compute_hash(&self) -> StateHash {
        compute_state_hash(self.moves, self.rng_seed, |hasher| {
            self.board.hash_into(hasher);
            hasher.update_u8(self.phase.code());
            let [s0, s1] = self.rng.state();
            hasher.update_u64(s0);
            hasher.update_u64(s1);
        })
    }

    /// Take pending events (consumes them).
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Push a game event.
    pub fn push_event(&mut self, event: GameEvent) {
        self.pending_events.push(event);
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(row: u8, col: u8) -> Cell {
        Cell::new(row, col).unwrap()
    }

    #[test]
    fn test_cell_bounds() {
        assert!(Cell::new(3, 3).is_ok());
        assert_eq!(
            Cell::new(4, 0),
            Err(GameError::CellOutOfBounds { row: 4, col: 0 })
        );
        assert_eq!(Cell::all().count(), BOARD_CELLS);
    }

    #[test]
    fn test_cell_key_format() {
        assert_eq!(cell(1, 2).to_string(), "1,2");
        assert_eq!("3,0".parse::<Cell>(), Ok(cell(3, 0)));
        assert_eq!(" 2 , 1 ".parse::<Cell>(), Ok(cell(2, 1)));
        assert!(matches!("12".parse::<Cell>(), Err(GameError::InvalidCellKey(_))));
        assert!(matches!("0,9".parse::<Cell>(), Err(GameError::CellOutOfBounds { .. })));
    }

    #[test]
    fn test_tile_values() {
        let id = TileId(0);
        assert!(Tile::new(id, 2, cell(0, 0)).is_ok());
        assert!(Tile::new(id, 2048, cell(0, 0)).is_ok());
        assert_eq!(Tile::new(id, 0, cell(0, 0)), Err(GameError::InvalidTileValue(0)));
        assert_eq!(Tile::new(id, 1, cell(0, 0)), Err(GameError::InvalidTileValue(1)));
        assert_eq!(Tile::new(id, 6, cell(0, 0)), Err(GameError::InvalidTileValue(6)));
    }

    #[test]
    fn test_tile_promote() {
        let mut tile = Tile::new(TileId(0), 2, cell(1, 1)).unwrap();
        assert_eq!(tile.promote(), Ok(4));
        assert_eq!(tile.promote(), Ok(8));
        assert!(tile.is_at_rest());

        let mut huge = Tile::new(TileId(1), 1 << 31, cell(0, 0)).unwrap();
        assert!(huge.promote().is_err());
    }

    #[test]
    fn test_place_rejects_occupied() {
        let mut board = Board::new();
        let first = board.place(cell(1, 1), 2).unwrap();
        let second = board.place(cell(1, 2), 4).unwrap();
        assert_ne!(first, second);

        assert_eq!(board.place(cell(1, 1), 4), Err(GameError::CellOccupied(cell(1, 1))));
        assert_eq!(board.len(), 2);
        assert_eq!(board.value_at(cell(1, 1)), Some(2));
        assert_eq!(board.find(second).map(|t| t.cell), Some(cell(1, 2)));
    }

    #[test]
    fn test_rows_roundtrip_and_display() {
        let rows = [[2, 0, 0, 4], [0, 8, 0, 0], [0, 0, 0, 0], [16, 0, 0, 2048]];
        let board = Board::from_rows(rows).unwrap();
        assert_eq!(board.to_rows(), rows);
        assert_eq!(board.max_value(), 2048);
        assert_eq!(board.empty_cells().len(), BOARD_CELLS - 5);

        let text = board.to_string();
        assert_eq!(text.lines().count(), ROWS as usize);
        assert!(text.lines().next().unwrap().trim_start().starts_with('2'));
    }

    #[test]
    fn test_from_rows_rejects_bad_values() {
        let rows = [[3, 0, 0, 0], [0; 4], [0; 4], [0; 4]];
        assert_eq!(Board::from_rows(rows), Err(GameError::InvalidTileValue(3)));
    }

    #[test]
    fn test_is_full() {
        let mut board = Board::from_rows([
            [2, 4, 2, 4],
            [4, 2, 4, 2],
            [2, 4, 2, 4],
            [4, 2, 4, 0],
        ])
        .unwrap();
        assert!(!board.is_full());
        assert_eq!(board.empty_cells(), vec![cell(3, 3)]);

        board.place(cell(3, 3), 2).unwrap();
        assert!(board.is_full());
        assert!(board.empty_cells().is_empty());
    }

    #[test]
    fn test_board_json_keys() {
        let board = Board::from_rows([[2, 0, 0, 0], [0; 4], [0; 4], [0, 0, 0, 4]]).unwrap();
        let json = serde_json::to_string(&board).unwrap();
        assert!(json.contains("\"0,0\""));
        assert!(json.contains("\"3,3\""));

        let back: Board = serde_json::from_str(&json).unwrap();
        assert_eq!(back, board);
    }

    #[test]
    fn test_stored_board_is_checked() {
        let tile = |id: u32, value: u32, row: u8, col: u8| {
            serde_json::json!({
                "id": id,
                "value": value,
                "cell": format!("{},{}", row, col),
                "pos": { "x": col as i32 * 100, "y": row as i32 * 100 },
            })
        };
        let load = |tiles: serde_json::Value, next_id: u32| {
            serde_json::from_value::<Board>(serde_json::json!({ "tiles": tiles, "next_id": next_id }))
        };

        let good = load(serde_json::json!({ "0,0": tile(0, 2, 0, 0), "1,2": tile(1, 4, 1, 2) }), 2).unwrap();
        assert_eq!(good.value_at(cell(1, 2)), Some(4));

        // Key disagrees with the tile's own cell
        assert!(load(serde_json::json!({ "0,1": tile(0, 2, 0, 0) }), 1).is_err());
        // Not a tile value
        assert!(load(serde_json::json!({ "0,0": tile(0, 3, 0, 0) }), 1).is_err());
        // Id not below next_id, so the next spawn would reuse it
        assert!(load(serde_json::json!({ "0,0": tile(4, 2, 0, 0) }), 4).is_err());
        // Same id twice
        assert!(load(serde_json::json!({ "0,0": tile(0, 2, 0, 0), "0,1": tile(0, 2, 0, 1) }), 2).is_err());
    }

    #[test]
    fn test_stored_board_errors() {
        let stored = StoredBoard {
            tiles: BTreeMap::from([(cell(0, 1), Tile::new(TileId(0), 2, cell(0, 0)).unwrap())]),
            next_id: 1,
        };
        assert_eq!(
            Board::try_from(stored),
            Err(GameError::CellMismatch { key: cell(0, 1), tile: cell(0, 0) })
        );

        let stored = StoredBoard {
            tiles: BTreeMap::from([(cell(0, 0), Tile::new(TileId(3), 2, cell(0, 0)).unwrap())]),
            next_id: 3,
        };
        assert_eq!(Board::try_from(stored), Err(GameError::InvalidTileId(TileId(3))));
    }

    #[test]
    fn test_new_game_spawns_two_twos() {
        let state = GameState::new(12345).unwrap();
        assert_eq!(state.board.len(), 2);
        assert!(state.board.tiles().all(|t| t.value == 2));
        assert_eq!(state.pending_events.len(), 2);
        assert_eq!(state.phase, GamePhase::Idle);
    }

    #[test]
    fn test_game_state_determinism() {
        let state1 = GameState::new(777).unwrap();
        let state2 = GameState::new(777).unwrap();
        assert_eq!(state1.board, state2.board);
        assert_eq!(state1.compute_hash(), state2.compute_hash());

        let other = GameState::new(778).unwrap();
        assert_ne!(state1.compute_hash(), other.compute_hash());
    }

    #[test]
    fn test_begin_move_guards() {
        let mut state = GameState::new(1).unwrap();
        state.begin_move(Direction::Left).unwrap();
        assert!(state.is_sliding());
        assert_eq!(state.begin_move(Direction::Up), Err(GameError::MoveInProgress));

        state.phase = GamePhase::GameOver;
        assert_eq!(state.begin_move(Direction::Up), Err(GameError::GameOver));

        let rejected = state
            .take_events()
            .into_iter()
            .filter(|e| matches!(e.data, crate::game::events::GameEventData::MoveRejected { .. }))
            .count();
        assert_eq!(rejected, 2);
    }
}
