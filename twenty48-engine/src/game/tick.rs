//! Frame Tick and Move Lifecycle
//!
//! The renderer calls [`tick`] once per frame. While a move is sliding each
//! tick advances it; the tick on which nothing moves settles the move.
//! A settled move on a full board ends the game; otherwise a move that
//! changed the board spawns one tile.
//!
//! [`apply_move`] runs a whole move headlessly.

use serde::{Serialize, Deserialize};
use tracing::{debug, info};

use crate::core::hash::short_hex;
use crate::error::GameError;
use crate::game::events::GameEvent;
use crate::game::input::Direction;
use crate::game::slide::Slide;
use crate::game::spawn::{spawn_tile, SpawnedTile};
use crate::game::state::{GamePhase, GameState};

/// Result of a tick.
#[derive(Debug, Default)]
pub struct TickResult {
    /// Events generated this tick
    pub events: Vec<GameEvent>,
    /// Set on the tick a move settles
    pub settled: Option<MoveOutcome>,
    /// Whether the game is over
    pub game_over: bool,
}

/// Summary of one completed move.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveOutcome {
    /// Direction played
    pub direction: Direction,
    /// Whether any tile moved or merged
    pub changed: bool,
    /// Merges performed
    pub merges: u32,
    /// Ticks the move animated for
    pub ticks: u32,
    /// Tile spawned afterwards, if the board changed
    pub spawned: Option<SpawnedTile>,
    /// Whether the move settled on a full board, ending the game
    pub game_over: bool,
}

/// Run one frame.
///
/// # Determinism
///
/// - Tiles are processed in a fixed order (nearest the target edge, then
///   line, then tile id)
/// - Integer pixel math only
/// - Spawning draws only from `state.rng`
pub fn tick(state: &mut GameState) -> Result<TickResult, GameError> {
    let mut result = TickResult::default();

    match state.phase {
        GamePhase::Idle => return Ok(result),
        GamePhase::GameOver => {
            result.game_over = true;
            return Ok(result);
        }
        GamePhase::Sliding(_) => {}
    }

    state.tick += 1;

    let step = match &mut state.phase {
        GamePhase::Sliding(slide) => slide.step(&mut state.board)?,
        _ => return Ok(result),
    };

    #[cfg(feature = "debug-tracing")]
    tracing::trace!("Tick {}: {} tiles moved, {} merges", state.tick, step.moved, step.merges.len());

    for merge in step.merges.iter().copied() {
        state.push_event(GameEvent::tiles_merged(state.tick, merge));
    }

    if step.is_idle() {
        if let GamePhase::Sliding(slide) = std::mem::take(&mut state.phase) {
            let outcome = finish_move(state, slide)?;
            result.game_over = outcome.game_over;
            result.settled = Some(outcome);
        }
    }

    result.events = state.take_events();
    Ok(result)
}

/// Settle a finished slide, spawn, and update the phase.
fn finish_move(state: &mut GameState, slide: Slide) -> Result<MoveOutcome, GameError> {
    let settled = slide.settle(&mut state.board)?;
    let changed = settled.changed();

    for moved in settled.moved.iter().copied() {
        state.push_event(GameEvent::tile_moved(state.tick, moved));
    }

    if changed {
        state.moves += 1;
    }

    // Full board: no room to spawn. A move that changed nothing consumes
    // no randomness and spawns nothing.
    let game_over = state.board.is_full();
    let mut spawned = None;
    if changed && !game_over {
        let tile = spawn_tile(&mut state.board, &mut state.rng)?;
        state.push_event(GameEvent::tile_spawned(state.tick, tile));
        spawned = Some(tile);
    }

    state.push_event(GameEvent::move_settled(
        state.tick,
        settled.direction,
        changed,
        settled.merges,
        settled.ticks,
    ));

    debug!(
        "Move {} settled after {} ticks: changed={}, merges={}, board={}",
        settled.direction,
        settled.ticks,
        changed,
        settled.merges,
        short_hex(&state.board.compute_hash())
    );

    if game_over {
        end_game(state);
    } else {
        state.phase = GamePhase::Idle;
    }

    Ok(MoveOutcome {
        direction: settled.direction,
        changed,
        merges: settled.merges,
        ticks: settled.ticks,
        spawned,
        game_over,
    })
}

/// End the game.
fn end_game(state: &mut GameState) {
    state.phase = GamePhase::GameOver;
    let max_tile = state.max_tile();
    info!("Game over after {} moves, max tile {}", state.moves, max_tile);
    state.push_event(GameEvent::game_over(state.tick, state.moves, max_tile));
}

/// Play a whole move without a renderer.
///
/// Returns the outcome and every event the move generated.
pub fn apply_move(state: &mut GameState, direction: Direction) -> Result<(MoveOutcome, Vec<GameEvent>), GameError> {
    state.begin_move(direction)?;
    let mut events = Vec::new();
    loop {
        let result = tick(state)?;
        events.extend(result.events);
        if let Some(outcome) = result.settled {
            return Ok((outcome, events));
        }
    }
}

/// Replay a game from its seed and the directions played.
///
/// Stops early if the game ends. Returns the final state and all events,
/// including the opening spawns.
pub fn replay_moves(rng_seed: u64, directions: &[Direction]) -> Result<(GameState, Vec<GameEvent>), GameError> {
    let mut state = GameState::new(rng_seed)?;
    let mut all_events = state.take_events();

    for direction in directions {
        if state.is_over() {
            break;
        }
        let (_, events) = apply_move(&mut state, *direction)?;
        all_events.extend(events);
    }

    Ok((state, all_events))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::events::GameEventData;
    use crate::game::state::{Board, Cell};
    use crate::BOARD_CELLS;
    use proptest::prelude::*;

    fn cell(row: u8, col: u8) -> Cell {
        Cell::new(row, col).unwrap()
    }

    fn state_with(rows: [[u32; 4]; 4]) -> GameState {
        GameState::with_board(Board::from_rows(rows).unwrap(), 12345)
    }

    /// Textbook line compression, used as the oracle for the animated resolver.
    fn reference_slide(rows: [[u32; 4]; 4], direction: Direction) -> [[u32; 4]; 4] {
        let mut out = [[0u32; 4]; 4];
        for line in 0..4 {
            let cells: Vec<(usize, usize)> = (0..4)
                .map(|i| match direction {
                    Direction::Left => (line, i),
                    Direction::Right => (line, 3 - i),
                    Direction::Up => (i, line),
                    Direction::Down => (3 - i, line),
                })
                .collect();

            let mut packed: Vec<u32> = Vec::new();
            let mut last_merged = false;
            for &(r, c) in &cells {
                let value = rows[r][c];
                if value == 0 {
                    continue;
                }
                if !last_merged && packed.last() == Some(&value) {
                    *packed.last_mut().unwrap() *= 2;
                    last_merged = true;
                } else {
                    packed.push(value);
                    last_merged = false;
                }
            }
            for (i, value) in packed.into_iter().enumerate() {
                let (r, c) = cells[i];
                out[r][c] = value;
            }
        }
        out
    }

    #[test]
    fn test_tick_idle_does_nothing() {
        let mut state = GameState::new(1).unwrap();
        state.take_events();
        let hash = state.compute_hash();

        let result = tick(&mut state).unwrap();
        assert!(result.events.is_empty());
        assert!(result.settled.is_none());
        assert_eq!(state.tick, 0);
        assert_eq!(state.compute_hash(), hash);
    }

    #[test]
    fn test_pair_merges_left() {
        let mut state = state_with([[2, 2, 0, 0], [0; 4], [0; 4], [0; 4]]);
        let (outcome, events) = apply_move(&mut state, Direction::Left).unwrap();

        assert!(outcome.changed);
        assert_eq!(outcome.merges, 1);
        // 4 ticks of approach, the merge tick, then the idle tick
        assert_eq!(outcome.ticks, 6);
        assert_eq!(state.board.value_at(cell(0, 0)), Some(4));
        assert_eq!(state.board.len(), 2);
        assert_eq!(state.moves, 1);

        let spawned = outcome.spawned.unwrap();
        assert_ne!(spawned.cell, cell(0, 0));
        assert_eq!(state.board.value_at(spawned.cell), Some(spawned.value));

        assert!(events.iter().any(|e| matches!(e.data, GameEventData::TilesMerged { value: 4, .. })));
        assert!(events.iter().any(|e| matches!(e.data, GameEventData::TileSpawned { .. })));
    }

    #[test]
    fn test_unequal_tiles_stack_left() {
        let mut state = state_with([[2, 0, 0, 4], [0; 4], [0; 4], [0; 4]]);
        let (outcome, _) = apply_move(&mut state, Direction::Left).unwrap();

        assert!(outcome.changed);
        assert_eq!(outcome.merges, 0);
        assert_eq!(state.board.value_at(cell(0, 0)), Some(2));
        assert_eq!(state.board.value_at(cell(0, 1)), Some(4));
        assert_eq!(state.board.len(), 3);
    }

    #[test]
    fn test_noop_move_absorbed() {
        let mut state = state_with([[2, 4, 0, 0], [0; 4], [0; 4], [0; 4]]);
        let before = state.board.clone();
        let rng_before = state.rng.clone();

        let (outcome, events) = apply_move(&mut state, Direction::Left).unwrap();

        assert!(!outcome.changed);
        assert_eq!(outcome.spawned, None);
        assert!(!outcome.game_over);
        assert_eq!(state.board, before);
        assert_eq!(state.rng, rng_before);
        assert_eq!(state.moves, 0);
        assert_eq!(state.phase, GamePhase::Idle);
        assert!(events.iter().all(|e| !matches!(e.data, GameEventData::TileSpawned { .. })));
    }

    #[test]
    fn test_input_rejected_while_sliding() {
        let mut state = state_with([[0, 0, 0, 2], [0; 4], [0; 4], [0; 4]]);
        state.begin_move(Direction::Left).unwrap();
        tick(&mut state).unwrap();

        assert_eq!(state.begin_move(Direction::Right), Err(GameError::MoveInProgress));
        assert_eq!(apply_move(&mut state, Direction::Up).err(), Some(GameError::MoveInProgress));

        while state.is_sliding() {
            tick(&mut state).unwrap();
        }
        assert_eq!(state.board.value_at(cell(0, 0)), Some(2));
        assert!(state.begin_move(Direction::Right).is_ok());
    }

    #[test]
    fn test_stuck_board_is_game_over() {
        let mut state = state_with([
            [2, 4, 2, 4],
            [4, 2, 4, 2],
            [2, 4, 2, 4],
            [4, 2, 4, 2],
        ]);
        let (outcome, events) = apply_move(&mut state, Direction::Left).unwrap();

        assert!(!outcome.changed);
        assert!(outcome.game_over);
        assert!(state.is_over());
        assert!(events.iter().any(|e| matches!(e.data, GameEventData::GameOver { max_tile: 4, .. })));

        assert_eq!(apply_move(&mut state, Direction::Right).err(), Some(GameError::GameOver));
        assert!(tick(&mut state).unwrap().game_over);
    }

    #[test]
    fn test_filling_spawn_ends_game_on_next_move() {
        let mut state = state_with([
            [8, 16, 32, 0],
            [64, 4, 2, 4],
            [2, 64, 4, 2],
            [4, 2, 64, 4],
        ]);
        let (outcome, _) = apply_move(&mut state, Direction::Right).unwrap();

        // The spawn fills the board but the game goes on until a move settles
        assert!(outcome.changed);
        assert_eq!(outcome.spawned.map(|s| s.cell), Some(cell(0, 0)));
        assert_eq!(state.board.len(), BOARD_CELLS);
        assert!(!outcome.game_over);
        assert!(!state.is_over());

        let full = state.board.clone();
        let (outcome, events) = apply_move(&mut state, Direction::Right).unwrap();
        assert!(!outcome.changed);
        assert_eq!(outcome.spawned, None);
        assert!(outcome.game_over);
        assert!(state.is_over());
        assert_eq!(state.board, full);
        assert!(events.iter().any(|e| matches!(e.data, GameEventData::GameOver { .. })));
    }

    #[test]
    fn test_full_board_noop_move_ends_game() {
        // A merge is still available left, but the move played is up
        let mut state = state_with([
            [2, 2, 4, 8],
            [4, 8, 16, 32],
            [8, 16, 32, 64],
            [16, 32, 64, 128],
        ]);
        let rng_before = state.rng.clone();
        let (outcome, _) = apply_move(&mut state, Direction::Up).unwrap();

        assert!(!outcome.changed);
        assert_eq!(outcome.spawned, None);
        assert!(outcome.game_over);
        assert!(state.is_over());
        assert_eq!(state.rng, rng_before);
        assert_eq!(apply_move(&mut state, Direction::Left).err(), Some(GameError::GameOver));
    }

    #[test]
    fn test_full_board_with_merge_continues() {
        let mut state = state_with([
            [2, 2, 4, 8],
            [4, 8, 16, 32],
            [8, 16, 32, 64],
            [16, 32, 64, 128],
        ]);
        let (outcome, _) = apply_move(&mut state, Direction::Left).unwrap();

        assert!(outcome.changed);
        assert_eq!(outcome.merges, 1);
        assert_eq!(state.board.to_rows()[0][..3], [4, 4, 8]);
        assert!(outcome.spawned.is_some());
        assert_eq!(state.board.len(), BOARD_CELLS);
        assert!(!state.is_over());
    }

    #[test]
    fn test_events_carry_tick_numbers() {
        let mut state = state_with([[0, 0, 0, 2], [0; 4], [0; 4], [0; 4]]);
        let (outcome, events) = apply_move(&mut state, Direction::Left).unwrap();

        let last = events.last().unwrap();
        assert!(events.iter().all(|e| e.tick == state.tick));
        assert!(matches!(last.data, GameEventData::MoveSettled { changed: true, .. }));
        assert_eq!(state.tick, outcome.ticks);
    }

    #[test]
    fn test_replay_determinism() {
        let directions: Vec<Direction> = (0..60).map(|i| Direction::ALL[(i * 7 + i / 3) % 4]).collect();

        let (final1, events1) = replay_moves(99999, &directions).unwrap();
        let (final2, events2) = replay_moves(99999, &directions).unwrap();

        assert_eq!(final1.compute_hash(), final2.compute_hash());
        assert_eq!(final1.board, final2.board);
        assert_eq!(events1, events2);

        let (other, _) = replay_moves(11111, &directions).unwrap();
        assert_ne!(final1.compute_hash(), other.compute_hash());
    }

    #[test]
    fn test_tick_determinism() {
        let mut state1 = GameState::new(12345).unwrap();
        let mut state2 = GameState::new(12345).unwrap();

        for dir in [Direction::Left, Direction::Up, Direction::Right, Direction::Down, Direction::Left] {
            let _ = state1.begin_move(dir);
            let _ = state2.begin_move(dir);
            for _ in 0..40 {
                tick(&mut state1).unwrap();
                tick(&mut state2).unwrap();
            }
        }

        assert_eq!(state1.tick, state2.tick);
        assert_eq!(state1.compute_hash(), state2.compute_hash());
    }

    fn value() -> impl Strategy<Value = u32> {
        prop_oneof![Just(0u32), Just(0), Just(2), Just(4), Just(8), Just(16)]
    }

    fn rows() -> impl Strategy<Value = [[u32; 4]; 4]> {
        prop::array::uniform4(prop::array::uniform4(value()))
    }

    fn direction() -> impl Strategy<Value = Direction> {
        prop::sample::select(Direction::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn prop_matches_reference(rows in rows(), dir in direction()) {
            let mut board = Board::from_rows(rows).unwrap();
            let mut slide = Slide::begin(&board, dir);
            while !slide.step(&mut board).unwrap().is_idle() {}
            let settled = slide.settle(&mut board).unwrap();

            let expected = reference_slide(rows, dir);
            prop_assert_eq!(board.to_rows(), expected);
            prop_assert_eq!(settled.changed(), expected != rows);
            prop_assert!(board.tiles().all(|t| t.is_at_rest()));
        }

        #[test]
        fn prop_move_conserves_value(rows in rows(), dir in direction()) {
            let mut state = state_with(rows);
            let before_len = state.board.len() as u32;
            let before_sum: u32 = state.board.tiles().map(|t| t.value).sum();

            let (outcome, _) = apply_move(&mut state, dir).unwrap();
            let spawned_value = outcome.spawned.map(|s| s.value).unwrap_or(0);
            let spawned_count = outcome.spawned.is_some() as u32;

            let after_sum: u32 = state.board.tiles().map(|t| t.value).sum();
            prop_assert_eq!(after_sum, before_sum + spawned_value);
            prop_assert_eq!(state.board.len() as u32, before_len - outcome.merges + spawned_count);
            prop_assert_eq!(outcome.spawned.is_some(), outcome.changed);
            prop_assert_eq!(outcome.game_over, before_len as usize == BOARD_CELLS && !outcome.changed);
        }
    }
}
