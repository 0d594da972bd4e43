//! Game Events
//!
//! Events generated while moves resolve, for the renderer and for replay
//! comparison.

use serde::{Serialize, Deserialize};

use crate::core::vec2::PixelVec;
use crate::error::GameError;
use crate::game::input::Direction;
use crate::game::slide::{Merge, TileMove};
use crate::game::spawn::SpawnedTile;
use crate::game::state::{Cell, TileId};

/// Priority for event processing order.
///
/// Lower value = processed first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum EventPriority {
    /// Merges first, so a renderer drops the absorbed tile before moving others
    Merge = 0,
    /// Then tiles that changed cell
    Movement = 1,
    /// Then the new tile
    Spawn = 2,
    /// Then the move summary
    Settle = 3,
    /// Lowest priority
    Other = 255,
}

/// Game event data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEventData {
    /// A tile appeared on an empty cell
    TileSpawned {
        tile: TileId,
        cell: Cell,
        value: u32,
    },

    /// `source` slid into `target`, which doubled
    TilesMerged {
        source: TileId,
        target: TileId,
        value: u32,
        position: PixelVec,
    },

    /// A tile ended a move on a different cell
    TileMoved {
        tile: TileId,
        from: Cell,
        to: Cell,
    },

    /// A move finished animating
    MoveSettled {
        direction: Direction,
        changed: bool,
        merges: u32,
        ticks: u32,
    },

    /// Input refused because a move is animating or the game ended
    MoveRejected {
        direction: Direction,
        reason: String,
    },

    /// A move settled on a full board
    GameOver {
        moves: u32,
        max_tile: u32,
    },
}

/// A game event with timing and priority.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEvent {
    /// Tick when event occurred
    pub tick: u32,

    /// Processing priority
    pub priority: EventPriority,

    /// Tile involved (for tie-breaking)
    pub tile: Option<TileId>,

    /// Event data
    pub data: GameEventData,
}

impl GameEvent {
    /// Create a new event.
    pub fn new(tick: u32, priority: EventPriority, data: GameEventData) -> Self {
        let tile = match &data {
            GameEventData::TileSpawned { tile, .. } => Some(*tile),
            GameEventData::TilesMerged { target, .. } => Some(*target),
            GameEventData::TileMoved { tile, .. } => Some(*tile),
            _ => None,
        };

        Self {
            tick,
            priority,
            tile,
            data,
        }
    }

    /// Create tile spawned event.
    pub fn tile_spawned(tick: u32, spawned: SpawnedTile) -> Self {
        Self::new(
            tick,
            EventPriority::Spawn,
            GameEventData::TileSpawned {
                tile: spawned.id,
                cell: spawned.cell,
                value: spawned.value,
            },
        )
    }

    /// Create tiles merged event.
    pub fn tiles_merged(tick: u32, merge: Merge) -> Self {
        Self::new(
            tick,
            EventPriority::Merge,
            GameEventData::TilesMerged {
                source: merge.source,
                target: merge.target,
                value: merge.value,
                position: merge.position,
            },
        )
    }

    /// Create tile moved event.
    pub fn tile_moved(tick: u32, moved: TileMove) -> Self {
        Self::new(
            tick,
            EventPriority::Movement,
            GameEventData::TileMoved {
                tile: moved.tile,
                from: moved.from,
                to: moved.to,
            },
        )
    }

    /// Create move settled event.
    pub fn move_settled(tick: u32, direction: Direction, changed: bool, merges: u32, ticks: u32) -> Self {
        Self::new(
            tick,
            EventPriority::Settle,
            GameEventData::MoveSettled {
                direction,
                changed,
                merges,
                ticks,
            },
        )
    }

    /// Create move rejected event.
    pub fn move_rejected(tick: u32, direction: Direction, reason: &GameError) -> Self {
        Self::new(
            tick,
            EventPriority::Other,
            GameEventData::MoveRejected {
                direction,
                reason: reason.to_string(),
            },
        )
    }

    /// Create game over event.
    pub fn game_over(tick: u32, moves: u32, max_tile: u32) -> Self {
        Self::new(tick, EventPriority::Other, GameEventData::GameOver { moves, max_tile })
    }

    /// Sort key: tick, then priority, then tile id.
    pub fn order_key(&self) -> (u32, EventPriority, Option<TileId>) {
        (self.tick, self.priority, self.tile)
    }
}

/// Sort events into processing order. Stable for equal keys.
pub fn sort_events(events: &mut [GameEvent]) {
    events.sort_by_key(GameEvent::order_key);
}
