//! Runtime configuration.
//!
//! Board geometry is fixed at compile time (see the crate constants).
//! The only runtime knob is the RNG seed, which makes a session
//! reproducible when set.

use crate::error::ConfigError;

/// Environment variable holding an optional RNG seed.
pub const SEED_ENV_VAR: &str = "TWENTY48_SEED";

/// Configuration shared by the headless simulator and the window client.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GameConfig {
    /// Fixed seed, or `None` to let the caller pick one.
    pub seed: Option<u64>,
}

impl GameConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_seed_var(std::env::var(SEED_ENV_VAR).ok())
    }

    /// Build configuration from the raw value of the seed variable.
    pub fn from_seed_var(raw: Option<String>) -> Result<Self, ConfigError> {
        let seed = match raw {
            None => None,
            Some(value) if value.trim().is_empty() => None,
            Some(value) => Some(value.trim().parse::<u64>().map_err(|_| {
                ConfigError::InvalidSeed {
                    var: SEED_ENV_VAR,
                    value,
                }
            })?),
        };
        Ok(Self { seed })
    }

    /// The configured seed, or one produced by `fallback`.
    pub fn seed_or_else<F: FnOnce() -> u64>(&self, fallback: F) -> u64 {
        self.seed.unwrap_or_else(fallback)
    }
}
