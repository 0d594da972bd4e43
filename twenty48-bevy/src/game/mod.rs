//! Game module - board state, keyboard input and tile sprites
//!
//! The engine owns all rules. This module feeds it directions, advances it
//! at the fixed tick rate and mirrors its tiles as sprites.

use std::collections::HashSet;

use bevy::prelude::*;
use twenty48::{
    game::events::{sort_events, GameEvent, GameEventData},
    tick, Command, Direction, GameConfig, GameState, TileId,
};

use crate::AppState;

pub mod components;
pub mod visuals;

pub use components::*;
pub use visuals::*;

// ============================================================================
// GAME PLUGIN
// ============================================================================

pub struct GamePlugin;

impl Plugin for GamePlugin {
    fn build(&self, app: &mut App) {
        app
            // Resources
            .init_resource::<TileSprites>()

            // Events
            .add_event::<TileMergedEvent>()
            .add_event::<TileSpawnedEvent>()

            // Static board
            .add_systems(Startup, setup_board)

            // Game setup
            .add_systems(OnEnter(AppState::Playing), (clear_tiles, new_game).chain())

            // Move animation (fixed timestep, one engine tick per step)
            .add_systems(FixedUpdate, advance_game
                .run_if(in_state(AppState::Playing))
                .run_if(resource_exists::<Game>))

            // Input and sprite updates (variable timestep)
            .add_systems(Update, (
                keyboard_input
                    .run_if(in_state(AppState::Playing))
                    .run_if(resource_exists::<Game>),
                exit_on_escape,
            ))
            .add_systems(Update, (
                sync_tiles,
                start_tile_pops,
                update_tile_pops,
            ).chain().run_if(resource_exists::<Game>));
    }
}

// ============================================================================
// RESOURCES
// ============================================================================

/// The running game
#[derive(Resource)]
pub struct Game {
    pub state: GameState,
}

/// Where new games get their seed.
///
/// With a configured seed, game N uses `seed + N`, so a whole session
/// replays identically.
#[derive(Resource, Debug, Default)]
pub struct GameSeeds {
    pub config: GameConfig,
    pub games: u64,
}

impl GameSeeds {
    pub fn new(config: GameConfig) -> Self {
        Self { config, games: 0 }
    }

    pub fn next_seed(&mut self) -> u64 {
        let games = self.games;
        self.games += 1;
        match self.config.seed {
            Some(seed) => seed.wrapping_add(games),
            None => rand::random::<u64>(),
        }
    }
}

// ============================================================================
// EVENTS
// ============================================================================

#[derive(Event, Debug, Clone, Copy)]
pub struct TileMergedEvent {
    pub source: TileId,
    pub target: TileId,
    pub value: u32,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct TileSpawnedEvent {
    pub tile: TileId,
    pub value: u32,
}

/// Translate engine events into Bevy events, merges before spawns.
fn forward_events(
    mut events: Vec<GameEvent>,
    merged: &mut EventWriter<TileMergedEvent>,
    spawned: &mut EventWriter<TileSpawnedEvent>,
) {
    sort_events(&mut events);
    for event in events {
        match event.data {
            GameEventData::TilesMerged { source, target, value, .. } => {
                merged.send(TileMergedEvent { source, target, value });
            }
            GameEventData::TileSpawned { tile, value, .. } => {
                spawned.send(TileSpawnedEvent { tile, value });
            }
            GameEventData::MoveRejected { direction, reason } => {
                debug!("Dropped {} input: {}", direction, reason);
            }
            _ => {}
        }
    }
}

// ============================================================================
// GAME SETUP
// ============================================================================

fn setup_board(mut commands: Commands) {
    spawn_grid(&mut commands);
}

fn clear_tiles(
    mut commands: Commands,
    mut sprites: ResMut<TileSprites>,
    query: Query<Entity, With<TileSprite>>,
) {
    for entity in query.iter() {
        commands.entity(entity).despawn_recursive();
    }
    sprites.0.clear();
}

fn new_game(
    mut commands: Commands,
    mut seeds: ResMut<GameSeeds>,
    mut merged: EventWriter<TileMergedEvent>,
    mut spawned: EventWriter<TileSpawnedEvent>,
    mut exit: EventWriter<AppExit>,
) {
    let seed = seeds.next_seed();

    match GameState::new(seed) {
        Ok(mut state) => {
            info!(
                "New game: seed {}, board {}",
                seed,
                hex::encode(&state.board.compute_hash()[..6])
            );
            forward_events(state.take_events(), &mut merged, &mut spawned);
            commands.insert_resource(Game { state });
        }
        Err(err) => {
            error!("Could not start a game: {}", err);
            exit.send(AppExit::error());
        }
    }
}

// ============================================================================
// INPUT
// ============================================================================

/// Command bound to a key: arrows and WASD move, Escape quits.
pub fn key_command(key: KeyCode) -> Option<Command> {
    let direction = match key {
        KeyCode::ArrowLeft | KeyCode::KeyA => Direction::Left,
        KeyCode::ArrowRight | KeyCode::KeyD => Direction::Right,
        KeyCode::ArrowUp | KeyCode::KeyW => Direction::Up,
        KeyCode::ArrowDown | KeyCode::KeyS => Direction::Down,
        KeyCode::Escape => return Some(Command::Quit),
        _ => return None,
    };
    Some(Command::Move(direction))
}

fn pressed_commands(keyboard: &ButtonInput<KeyCode>) -> impl Iterator<Item = Command> + '_ {
    keyboard.get_just_pressed().filter_map(|key| key_command(*key))
}

/// Start a move on key press. Presses during a move are dropped.
fn keyboard_input(keyboard: Res<ButtonInput<KeyCode>>, mut game: ResMut<Game>) {
    let Some(direction) = pressed_commands(&keyboard).find_map(|command| match command {
        Command::Move(direction) => Some(direction),
        Command::Quit => None,
    }) else {
        return;
    };

    if game.state.begin_move(direction).is_ok() {
        debug!("Move {}", direction);
    }
}

fn exit_on_escape(keyboard: Res<ButtonInput<KeyCode>>, mut exit: EventWriter<AppExit>) {
    if pressed_commands(&keyboard).any(|command| command == Command::Quit) {
        info!("Quit");
        exit.send(AppExit::Success);
    }
}

// ============================================================================
// SIMULATION
// ============================================================================

fn advance_game(
    mut game: ResMut<Game>,
    mut next_state: ResMut<NextState<AppState>>,
    mut merged: EventWriter<TileMergedEvent>,
    mut spawned: EventWriter<TileSpawnedEvent>,
    mut exit: EventWriter<AppExit>,
) {
    if !game.state.is_sliding() {
        return;
    }

    match tick(&mut game.state) {
        Ok(result) => {
            forward_events(result.events, &mut merged, &mut spawned);

            if result.game_over {
                info!(
                    "Game over! Max tile {} after {} moves",
                    game.state.max_tile(),
                    game.state.moves
                );
                next_state.set(AppState::GameOver);
            }
        }
        Err(err) => {
            error!("Move failed: {}", err);
            exit.send(AppExit::error());
        }
    }
}

// ============================================================================
// SPRITES
// ============================================================================

/// Mirror engine tiles as sprites: spawn new ones, move and relabel
/// existing ones, despawn tiles that merged away.
fn sync_tiles(
    mut commands: Commands,
    game: Res<Game>,
    mut sprites: ResMut<TileSprites>,
    mut tiles: Query<(&mut TileSprite, &mut Transform, &mut Sprite)>,
    mut labels: Query<(&mut Text2d, &mut TextFont), With<TileLabel>>,
) {
    let board = &game.state.board;

    for tile in board.tiles() {
        let translation = pixel_to_world(tile.pos).extend(1.0);

        if let Some(&entity) = sprites.0.get(&tile.id) {
            if let Ok((mut tile_sprite, mut transform, mut sprite)) = tiles.get_mut(entity) {
                transform.translation = translation;
                if tile_sprite.value != tile.value {
                    tile_sprite.value = tile.value;
                    sprite.color = tile_color(tile.value);
                    if let Ok((mut text, mut font)) = labels.get_mut(tile_sprite.label) {
                        text.0 = tile.value.to_string();
                        font.font_size = label_font_size(tile.value);
                    }
                }
            }
            continue;
        }

        let label = commands
            .spawn((
                Text2d::new(tile.value.to_string()),
                TextFont {
                    font_size: label_font_size(tile.value),
                    ..default()
                },
                TextColor(FONT_COLOR),
                Transform::from_xyz(0.0, 0.0, 1.0),
                TileLabel,
            ))
            .id();

        let entity = commands
            .spawn((
                Sprite::from_color(tile_color(tile.value), Vec2::splat(twenty48::CELL_SIZE as f32)),
                Transform::from_translation(translation),
                TileSprite {
                    value: tile.value,
                    label,
                },
            ))
            .add_child(label)
            .id();

        sprites.0.insert(tile.id, entity);
    }

    let live: HashSet<TileId> = board.tiles().map(|t| t.id).collect();
    sprites.0.retain(|id, entity| {
        let keep = live.contains(id);
        if !keep {
            commands.entity(*entity).despawn_recursive();
        }
        keep
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_bindings() {
        assert_eq!(key_command(KeyCode::ArrowLeft), Some(Command::Move(Direction::Left)));
        assert_eq!(key_command(KeyCode::KeyD), Some(Command::Move(Direction::Right)));
        assert_eq!(key_command(KeyCode::KeyW), Some(Command::Move(Direction::Up)));
        assert_eq!(key_command(KeyCode::ArrowDown), Some(Command::Move(Direction::Down)));
        assert_eq!(key_command(KeyCode::Escape), Some(Command::Quit));
        assert_eq!(key_command(KeyCode::Space), None);
    }

    #[test]
    fn test_pressed_commands() {
        let mut keyboard = ButtonInput::<KeyCode>::default();
        keyboard.press(KeyCode::KeyS);
        keyboard.press(KeyCode::ShiftLeft);

        let commands: Vec<Command> = pressed_commands(&keyboard).collect();
        assert_eq!(commands, vec![Command::Move(Direction::Down)]);

        keyboard.clear();
        assert_eq!(pressed_commands(&keyboard).count(), 0);
    }

    #[test]
    fn test_configured_seeds_advance() {
        let mut seeds = GameSeeds::new(GameConfig { seed: Some(10) });
        assert_eq!(seeds.next_seed(), 10);
        assert_eq!(seeds.next_seed(), 11);
        assert_eq!(seeds.games, 2);
    }
}
