//! Core deterministic primitives.
//!
//! Integer pixel math, seeded randomness and state hashing. Everything the
//! game rules build on.

pub mod vec2;
pub mod rng;
pub mod hash;

// Re-export core types
pub use vec2::PixelVec;
pub use rng::DeterministicRng;
pub use hash::{StateHash, StateHasher, compute_state_hash};
