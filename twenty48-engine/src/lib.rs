//! # twenty48
//!
//! Deterministic rules engine for the 2048 sliding-tile puzzle.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TWENTY48 ENGINE                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Deterministic primitives                  │
//! │  ├── vec2.rs     - Integer pixel vector                      │
//! │  ├── rng.rs      - Deterministic Xorshift128+ PRNG           │
//! │  └── hash.rs     - Board hashing for verification            │
//! │                                                              │
//! │  game/           - Game logic (deterministic)                │
//! │  ├── input.rs    - Directions and the shared traversal       │
//! │  ├── state.rs    - Tiles, board and game state               │
//! │  ├── slide.rs    - Animated move resolver                    │
//! │  ├── spawn.rs    - Tile spawning                             │
//! │  ├── tick.rs     - Frame loop and move lifecycle             │
//! │  └── events.rs   - Events for renderer and replay            │
//! │                                                              │
//! │  config.rs       - Runtime configuration                     │
//! │  error.rs        - Error types                               │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism
//!
//! - Integer pixel math only, no floating point in game logic
//! - No HashMap (BTreeMap for sorted iteration)
//! - All randomness from a seeded Xorshift128+
//!
//! Given the same seed and the same sequence of directions, a game
//! produces identical boards and events on any platform.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod config;
pub mod core;
pub mod error;
pub mod game;

// Re-export commonly used types
pub use config::GameConfig;
pub use core::rng::DeterministicRng;
pub use core::vec2::PixelVec;
pub use error::{ConfigError, GameError};
pub use game::input::{Command, Direction};
pub use game::state::{Board, Cell, GamePhase, GameState, Tile, TileId};
pub use game::tick::{apply_move, replay_moves, tick, MoveOutcome, TickResult};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Number of board rows.
pub const ROWS: u8 = 4;

/// Number of board columns.
pub const COLS: u8 = 4;

/// Maximum number of tiles on the board.
pub const BOARD_CELLS: usize = ROWS as usize * COLS as usize;

/// Side length of one cell in pixels.
pub const CELL_SIZE: i32 = 100;

/// Board width in pixels.
pub const BOARD_WIDTH: i32 = COLS as i32 * CELL_SIZE;

/// Board height in pixels.
pub const BOARD_HEIGHT: i32 = ROWS as i32 * CELL_SIZE;

/// Pixels a tile travels per animation tick.
pub const MOVE_STEP: i32 = 20;

/// Animation tick rate (Hz)
pub const TICK_RATE: u32 = 60;

/// Values a spawned tile can take, chosen uniformly.
pub const SPAWN_VALUES: [u32; 2] = [2, 4];

/// Value of the tiles placed when a game starts.
pub const INITIAL_TILE_VALUE: u32 = 2;

/// Number of tiles placed when a game starts.
pub const INITIAL_TILE_COUNT: usize = 2;

// Animated positions must land exactly on cell boundaries.
const _: () = assert!(CELL_SIZE % MOVE_STEP == 0);
const _: () = assert!(ROWS > 0 && COLS > 0);
