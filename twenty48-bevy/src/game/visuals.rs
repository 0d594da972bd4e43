//! Visuals - palette, board geometry and tile pop animation

use bevy::prelude::*;
use twenty48::{PixelVec, BOARD_HEIGHT, BOARD_WIDTH, CELL_SIZE, COLS, ROWS};

use super::{GridLine, TileMergedEvent, TilePop, TileSpawnedEvent, TileSprites};

// ============================================================================
// PALETTE
// ============================================================================

pub const BACKGROUND_COLOR: Color = Color::srgb(205.0 / 255.0, 192.0 / 255.0, 180.0 / 255.0);
pub const OUTLINE_COLOR: Color = Color::srgb(187.0 / 255.0, 173.0 / 255.0, 160.0 / 255.0);
pub const FONT_COLOR: Color = Color::srgb(119.0 / 255.0, 110.0 / 255.0, 101.0 / 255.0);

/// Grid line thickness in pixels
pub const OUTLINE_THICKNESS: f32 = 10.0;

/// Tile colours for 2, 4, 8 ... 2048
const TILE_COLORS: [(u8, u8, u8); 11] = [
    (237, 229, 218),
    (238, 225, 201),
    (243, 178, 122),
    (246, 150, 101),
    (247, 124, 95),
    (247, 94, 59),
    (237, 208, 115),
    (237, 204, 99),
    (237, 202, 80),
    (237, 197, 63),
    (237, 194, 46),
];

/// Background colour for a tile value. Values above 2048 reuse the 2048 colour.
pub fn tile_color(value: u32) -> Color {
    let index = (value.max(2).trailing_zeros() as usize - 1).min(TILE_COLORS.len() - 1);
    let (r, g, b) = TILE_COLORS[index];
    Color::srgb_u8(r, g, b)
}

/// Font size that keeps the number inside one cell.
pub fn label_font_size(value: u32) -> f32 {
    match value {
        0..=99 => 60.0,
        100..=999 => 48.0,
        1000..=9999 => 36.0,
        _ => 28.0,
    }
}

// ============================================================================
// GEOMETRY
// ============================================================================

/// World-space centre of a tile whose top-left corner is at `pos`.
///
/// Board pixels grow right and down from the window's top-left corner;
/// Bevy's world origin is the window centre with y up.
pub fn pixel_to_world(pos: PixelVec) -> Vec2 {
    let half = CELL_SIZE as f32 / 2.0;
    Vec2::new(
        pos.x as f32 + half - BOARD_WIDTH as f32 / 2.0,
        BOARD_HEIGHT as f32 / 2.0 - pos.y as f32 - half,
    )
}

/// Spawn the grid lines and the outer border.
pub fn spawn_grid(commands: &mut Commands) {
    let width = BOARD_WIDTH as f32;
    let height = BOARD_HEIGHT as f32;
    let inset = OUTLINE_THICKNESS / 2.0;

    // Inner lines sit on cell boundaries, the border inside the window edge
    let mut horizontal: Vec<f32> = (1..ROWS).map(|r| (r as i32 * CELL_SIZE) as f32).collect();
    horizontal.extend([inset, height - inset]);
    let mut vertical: Vec<f32> = (1..COLS).map(|c| (c as i32 * CELL_SIZE) as f32).collect();
    vertical.extend([inset, width - inset]);

    for y in horizontal {
        commands.spawn((
            Sprite::from_color(OUTLINE_COLOR, Vec2::new(width, OUTLINE_THICKNESS)),
            Transform::from_xyz(0.0, height / 2.0 - y, 5.0),
            GridLine,
        ));
    }
    for x in vertical {
        commands.spawn((
            Sprite::from_color(OUTLINE_COLOR, Vec2::new(OUTLINE_THICKNESS, height)),
            Transform::from_xyz(x - width / 2.0, 0.0, 5.0),
            GridLine,
        ));
    }
}

// ============================================================================
// POP ANIMATION
// ============================================================================

/// Per-frame decay at 60 fps
const POP_DECAY: f32 = 0.85;

/// Move `scale` towards 1.0. Returns `None` once it has arrived.
pub fn ease_pop(scale: f32, dt: f32) -> Option<f32> {
    let next = 1.0 + (scale - 1.0) * POP_DECAY.powf(dt * 60.0);
    if (next - 1.0).abs() < 0.005 {
        None
    } else {
        Some(next)
    }
}

/// Start a pop on merged and spawned tiles
pub fn start_tile_pops(
    mut commands: Commands,
    sprites: Res<TileSprites>,
    mut merged: EventReader<TileMergedEvent>,
    mut spawned: EventReader<TileSpawnedEvent>,
) {
    for event in merged.read() {
        debug!("Merged {} into {} making {}", event.source, event.target, event.value);
        if let Some(&entity) = sprites.0.get(&event.target) {
            commands.entity(entity).insert(TilePop::merge());
        }
    }
    for event in spawned.read() {
        debug!("Spawned {} {}", event.value, event.tile);
        if let Some(&entity) = sprites.0.get(&event.tile) {
            commands.entity(entity).insert(TilePop::spawn());
        }
    }
}

/// Ease pops back to normal size
pub fn update_tile_pops(
    mut commands: Commands,
    time: Res<Time>,
    mut query: Query<(Entity, &mut TilePop, &mut Transform)>,
) {
    let dt = time.delta_secs();

    for (entity, mut pop, mut transform) in query.iter_mut() {
        match ease_pop(pop.scale, dt) {
            Some(scale) => {
                pop.scale = scale;
                transform.scale = Vec3::splat(scale);
            }
            None => {
                transform.scale = Vec3::ONE;
                commands.entity(entity).remove::<TilePop>();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_color_clamps() {
        assert_eq!(tile_color(2), Color::srgb_u8(237, 229, 218));
        assert_eq!(tile_color(2048), Color::srgb_u8(237, 194, 46));
        assert_eq!(tile_color(8192), tile_color(2048));
    }

    #[test]
    fn test_pixel_to_world_corners() {
        assert_eq!(pixel_to_world(PixelVec::from_cell(0, 0)), Vec2::new(-150.0, 150.0));
        assert_eq!(pixel_to_world(PixelVec::from_cell(3, 3)), Vec2::new(150.0, -150.0));
        assert_eq!(pixel_to_world(PixelVec::new(150, 0)), Vec2::new(0.0, 150.0));
    }

    #[test]
    fn test_label_fits() {
        assert!(label_font_size(2048) < label_font_size(128));
        assert!(label_font_size(128) < label_font_size(64));
    }

    #[test]
    fn test_pop_settles() {
        for start in [TilePop::MERGE, TilePop::SPAWN] {
            let mut scale = start;
            let mut frames = 0;
            while let Some(next) = ease_pop(scale, 1.0 / 60.0) {
                assert!((next - 1.0).abs() < (scale - 1.0).abs());
                scale = next;
                frames += 1;
                assert!(frames < 120);
            }
        }
    }
}
