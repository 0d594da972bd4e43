//! Board components
//!
//! Tile sprites mirror engine tiles by `TileId`; everything else on the
//! board is static decoration.

use std::collections::HashMap;

use bevy::prelude::*;
use twenty48::TileId;

// ============================================================================
// TILES
// ============================================================================

/// Sprite standing in for one engine tile, keyed in [`TileSprites`].
#[derive(Component, Debug)]
pub struct TileSprite {
    /// Value currently drawn, to detect promotions
    pub value: u32,
    /// Child entity holding the number
    pub label: Entity,
}

/// Marks the text child of a tile sprite.
#[derive(Component)]
pub struct TileLabel;

/// Live sprites keyed by tile identity.
#[derive(Resource, Default)]
pub struct TileSprites(pub HashMap<TileId, Entity>);

// ============================================================================
// ANIMATION
// ============================================================================

/// Short scale animation on a tile sprite.
///
/// Starts away from 1.0 and eases back to it.
#[derive(Component, Debug, Clone, Copy)]
pub struct TilePop {
    pub scale: f32,
}

impl TilePop {
    /// Bump after a merge
    pub const MERGE: f32 = 1.1;
    /// Grow-in for a spawned tile
    pub const SPAWN: f32 = 0.4;

    pub fn merge() -> Self {
        Self { scale: Self::MERGE }
    }

    pub fn spawn() -> Self {
        Self { scale: Self::SPAWN }
    }
}

// ============================================================================
// BOARD
// ============================================================================

/// Grid line sprite
#[derive(Component)]
pub struct GridLine;
