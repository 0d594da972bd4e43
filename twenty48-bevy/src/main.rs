//! 2048
//!
//! Slide numbered tiles with the arrow keys (or WASD); equal tiles merge.
//! Rules live in the `twenty48` engine; this binary draws them.

mod game;
mod ui;

use bevy::log::LogPlugin;
use bevy::prelude::*;
use twenty48::{GameConfig, BOARD_HEIGHT, BOARD_WIDTH, TICK_RATE, VERSION};

use game::{GamePlugin, GameSeeds, BACKGROUND_COLOR};
use ui::UiPlugin;

/// Game states
#[derive(States, Debug, Clone, Copy, Eq, PartialEq, Hash, Default)]
pub enum AppState {
    #[default]
    Playing,
    GameOver,
}

fn main() -> AppExit {
    let config = match GameConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("twenty48: {}", err);
            return AppExit::error();
        }
    };

    App::new()
        // Bevy defaults with a fixed-size window
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "2048".into(),
                        resolution: (BOARD_WIDTH as f32, BOARD_HEIGHT as f32).into(),
                        resizable: false,
                        ..default()
                    }),
                    ..default()
                })
                .set(LogPlugin {
                    filter: "info,wgpu=error,naga=warn,twenty48=info".into(),
                    ..default()
                }),
        )
        .insert_resource(ClearColor(BACKGROUND_COLOR))
        // One engine tick per fixed step
        .insert_resource(Time::<Fixed>::from_hz(TICK_RATE as f64))
        .insert_resource(GameSeeds::new(config))
        // Game state
        .init_state::<AppState>()
        // Our plugins
        .add_plugins((
            GamePlugin,
            UiPlugin,
        ))
        // Startup
        .add_systems(Startup, setup_2d_camera)
        .run()
}

/// 2D camera, one world unit per window pixel
fn setup_2d_camera(mut commands: Commands) {
    commands.spawn(Camera2d);

    info!("2048 v{} initialized!", VERSION);
}
