//! Animated Move Resolution
//!
//! A move runs over several ticks. Each tick every tile advances up to
//! [`MOVE_STEP`] pixels towards the target edge, stopping flush behind the
//! tile ahead or merging into it. When a tick moves nothing the move
//! settles: pixel positions are rounded back onto cells and the board map
//! is rebuilt.
//!
//! Processing order is nearest-the-edge first, so a tile always sees the
//! final position of the tile ahead of it for this tick. A tile takes part
//! in at most one merge per move, as absorber or absorbed.

use std::collections::{BTreeMap, BTreeSet};
use serde::{Serialize, Deserialize};

use crate::core::vec2::PixelVec;
use crate::error::GameError;
use crate::game::input::{Direction, Traversal};
use crate::game::state::{Board, Cell, Tile, TileId};
use crate::{CELL_SIZE, MOVE_STEP};

/// One merge: `source` was absorbed by `target`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Merge {
    /// Removed tile
    pub source: TileId,
    /// Surviving tile
    pub target: TileId,
    /// New value of `target`
    pub value: u32,
    /// Where `target` sits
    pub position: PixelVec,
}

/// A tile that ended the move on a different cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileMove {
    /// Tile
    pub tile: TileId,
    /// Cell when the move began
    pub from: Cell,
    /// Cell after settling
    pub to: Cell,
}

/// What a single tick did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SlideStep {
    /// Tiles that advanced
    pub moved: u32,
    /// Merges completed this tick
    pub merges: Vec<Merge>,
}

impl SlideStep {
    /// Nothing moved and nothing merged: the move is ready to settle.
    pub fn is_idle(&self) -> bool {
        self.moved == 0 && self.merges.is_empty()
    }
}

/// Result of settling a move.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settled {
    /// Direction of the move
    pub direction: Direction,
    /// Tiles that changed cell
    pub moved: Vec<TileMove>,
    /// Merges over the whole move
    pub merges: u32,
    /// Ticks the move took, including the final idle tick
    pub ticks: u32,
}

impl Settled {
    /// Whether the board differs from before the move.
    pub fn changed(&self) -> bool {
        !self.moved.is_empty() || self.merges > 0
    }
}

/// An in-progress move.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Slide {
    /// Direction of travel
    pub direction: Direction,
    traversal: Traversal,
    origins: BTreeMap<TileId, Cell>,
    merged: BTreeSet<TileId>,
    removed: BTreeSet<TileId>,
    ticks: u32,
    merges: u32,
}

impl Slide {
    /// Start a move from the current (settled) board.
    pub fn begin(board: &Board, direction: Direction) -> Self {
        Self {
            direction,
            traversal: direction.traversal(),
            origins: board.tiles().map(|t| (t.id, t.cell)).collect(),
            merged: BTreeSet::new(),
            removed: BTreeSet::new(),
            ticks: 0,
            merges: 0,
        }
    }

    /// Advance every tile by one tick.
    pub fn step(&mut self, board: &mut Board) -> Result<SlideStep, GameError> {
        let t = self.traversal;
        let mut order: Vec<(Cell, TileId, (i32, i32))> = board
            .tiles
            .iter()
            .map(|(key, tile)| (*key, tile.id, t.order_key(tile.pos)))
            .collect();
        order.sort_by_key(|(_, id, key)| (*key, *id));

        let mut step = SlideStep::default();
        for (key, id, _) in order {
            if self.removed.contains(&id) {
                continue;
            }
            let Some(tile) = board.tiles.get(&key).copied() else {
                continue;
            };
            if t.at_edge(tile.pos) {
                continue;
            }

            let ahead = board
                .tiles
                .iter()
                .filter_map(|(k, other)| t.gap_ahead(tile.pos, other.pos).map(|gap| (gap, *k, *other)))
                .min_by_key(|(gap, _, _)| *gap);

            let advance = match ahead {
                None => MOVE_STEP.min(t.distance_to_edge(tile.pos)),
                Some((gap, target_key, target)) if self.can_merge(&tile, &target) => {
                    if gap > MOVE_STEP {
                        MOVE_STEP
                    } else {
                        step.merges.push(self.merge(board, key, &tile, target_key)?);
                        continue;
                    }
                }
                Some((gap, _, _)) => MOVE_STEP.min(gap - CELL_SIZE),
            };

            if advance <= 0 {
                continue;
            }
            if let Some(entry) = board.tiles.get_mut(&key) {
                entry.pos = entry.pos + t.delta(advance);
                step.moved += 1;
            }
        }

        self.ticks += 1;
        Ok(step)
    }

    /// Round every tile onto its cell and rebuild the board map.
    pub fn settle(self, board: &mut Board) -> Result<Settled, GameError> {
        let t = self.traversal;
        let mut moved = Vec::new();

        let tiles: Vec<Tile> = std::mem::take(&mut board.tiles)
            .into_values()
            .map(|mut tile| {
                let (row, col) = t.settle_cell(tile.pos);
                let cell = Cell { row, col };
                if let Some(from) = self.origins.get(&tile.id) {
                    if *from != cell {
                        moved.push(TileMove { tile: tile.id, from: *from, to: cell });
                    }
                }
                tile.cell = cell;
                tile.pos = cell.origin();
                tile
            })
            .collect();
        board.rebuild(tiles)?;

        Ok(Settled {
            direction: self.direction,
            moved,
            merges: self.merges,
            ticks: self.ticks,
        })
    }

    fn can_merge(&self, tile: &Tile, target: &Tile) -> bool {
        tile.value == target.value && !self.merged.contains(&tile.id) && !self.merged.contains(&target.id)
    }

    fn merge(&mut self, board: &mut Board, source_key: Cell, source: &Tile, target_key: Cell) -> Result<Merge, GameError> {
        let target = board
            .tiles
            .get_mut(&target_key)
            .ok_or(GameError::TileMissing(target_key))?;
        let value = target.promote()?;
        let merge = Merge {
            source: source.id,
            target: target.id,
            value,
            position: target.pos,
        };

        board.tiles.remove(&source_key);
        self.merged.insert(merge.target);
        self.removed.insert(merge.source);
        self.merges += 1;
        Ok(merge)
    }
}

// =============================================================================
// TESTS
// =============================================================================
