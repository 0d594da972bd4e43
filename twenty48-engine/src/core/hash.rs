//! State Hashing for Verification
//!
//! Provides deterministic hashing of game state for:
//! - Detecting whether a move changed the board
//! - Replay validation
//! - Compact board fingerprints in logs

use sha2::{Sha256, Digest};
use super::vec2::PixelVec;

/// Hash output type (256 bits / 32 bytes)
pub type StateHash = [u8; 32];

/// Deterministic hasher for game state.
///
/// Wraps SHA-256 with helpers for board types.
/// Order of updates is critical for determinism.
pub struct StateHasher {
    hasher: Sha256,
}

impl StateHasher {
    /// Create a new hasher with domain separator.
    pub fn new(domain: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(domain);
        Self { hasher }
    }

    /// Create hasher for a board.
    pub fn for_board() -> Self {
        Self::new(b"TWENTY48_BOARD_V1")
    }

    /// Create hasher for full game state.
    pub fn for_game_state() -> Self {
        Self::new(b"TWENTY48_STATE_V1")
    }

    /// Update with a u8 value.
    #[inline]
    pub fn update_u8(&mut self, value: u8) {
        self.hasher.update([value]);
    }

    /// Update with a u32 value (little-endian).
    #[inline]
    pub fn update_u32(&mut self, value: u32) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with a u64 value (little-endian).
    #[inline]
    pub fn update_u64(&mut self, value: u64) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with an i32 value (little-endian).
    #[inline]
    pub fn update_i32(&mut self, value: i32) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with a pixel position.
    #[inline]
    pub fn update_vec(&mut self, value: PixelVec) {
        self.update_i32(value.x);
        self.update_i32(value.y);
    }

    /// Finalize and return the hash.
    pub fn finalize(self) -> StateHash {
        self.hasher.finalize().into()
    }
}

/// Compute state hash for game verification.
///
/// This function is called by `GameState::compute_hash()`.
/// The closure adds state-specific data after the move counter and seed.
pub fn compute_state_hash<F>(moves: u32, rng_seed: u64, add_state: F) -> StateHash
where
    F: FnOnce(&mut StateHasher),
{
    let mut hasher = StateHasher::for_game_state();

    // Always hash move counter and seed first
    hasher.update_u32(moves);
    hasher.update_u64(rng_seed);

    add_state(&mut hasher);

    hasher.finalize()
}

/// First bytes of a hash as hex, for log lines.
pub fn short_hex(hash: &StateHash) -> String {
    hex::encode(&hash[..6])
}

// =============================================================================
// TESTS
// =============================================================================
