//! UI module - game over overlay

use bevy::prelude::*;
use crate::AppState;
use crate::game::{Game, FONT_COLOR};

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app
            .add_systems(OnEnter(AppState::GameOver), setup_game_over)
            .add_systems(Update, handle_game_over_input.run_if(in_state(AppState::GameOver)))
            .add_systems(OnExit(AppState::GameOver), cleanup_game_over);
    }
}

/// Marker for game over UI
#[derive(Component)]
struct GameOverUI;

fn setup_game_over(mut commands: Commands, game: Option<Res<Game>>) {
    let (max_tile, moves) = game
        .map(|g| (g.state.max_tile(), g.state.moves))
        .unwrap_or_default();

    commands.spawn((
        Node {
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            flex_direction: FlexDirection::Column,
            justify_content: JustifyContent::Center,
            align_items: AlignItems::Center,
            ..default()
        },
        BackgroundColor(Color::srgba(0.93, 0.89, 0.85, 0.75)),
        GameOverUI,
    )).with_children(|parent| {
        parent.spawn((
            Text::new("Game over!"),
            TextFont {
                font_size: 48.0,
                ..default()
            },
            TextColor(FONT_COLOR),
            Node {
                margin: UiRect::bottom(Val::Px(16.0)),
                ..default()
            },
        ));

        parent.spawn((
            Text::new(format!("Max tile: {}", max_tile)),
            TextFont {
                font_size: 28.0,
                ..default()
            },
            TextColor(FONT_COLOR),
            Node {
                margin: UiRect::bottom(Val::Px(8.0)),
                ..default()
            },
        ));

        parent.spawn((
            Text::new(format!("Moves: {}", moves)),
            TextFont {
                font_size: 28.0,
                ..default()
            },
            TextColor(FONT_COLOR),
            Node {
                margin: UiRect::bottom(Val::Px(32.0)),
                ..default()
            },
        ));

        parent.spawn((
            Text::new("SPACE to play again, ESC to quit"),
            TextFont {
                font_size: 18.0,
                ..default()
            },
            TextColor(FONT_COLOR),
        ));
    });
}

fn handle_game_over_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut next_state: ResMut<NextState<AppState>>,
) {
    if keyboard.just_pressed(KeyCode::Space) {
        next_state.set(AppState::Playing);
    }
}

fn cleanup_game_over(
    mut commands: Commands,
    query: Query<Entity, With<GameOverUI>>,
) {
    for entity in query.iter() {
        commands.entity(entity).despawn_recursive();
    }
}
