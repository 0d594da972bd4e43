//! Game Logic Module
//!
//! All game simulation code. 100% deterministic.
//!
//! ## Module Structure
//!
//! - `input`: Directions, commands and the shared traversal
//! - `state`: Cells, tiles, board and game state
//! - `slide`: Tick-by-tick move resolution
//! - `spawn`: Random tile placement
//! - `tick`: Frame loop and move lifecycle
//! - `events`: Game events for renderer and replay

pub mod input;
pub mod state;
pub mod slide;
pub mod spawn;
pub mod tick;
pub mod events;

// Re-export key types
pub use input::{Direction, Command, Traversal};
pub use state::{Board, Cell, GamePhase, GameState, Tile, TileId};
pub use slide::{Merge, Slide, TileMove};
pub use spawn::SpawnedTile;
pub use tick::{MoveOutcome, TickResult};
pub use events::{GameEvent, GameEventData};
