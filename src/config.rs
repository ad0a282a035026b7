//! Bot configuration file.
//!
//! Every field is optional; anything left out keeps its default.
//!
//! ```
//! use bot_2048::config::BotConfig;
//! use bot_2048::expectimax::Strategy;
//!
//! let cfg: BotConfig = toml::from_str(r#"
//!     strategy = "expectimax"
//!     tick_ms = 25
//!
//!     [search]
//!     max_depth = 3
//!
//!     [weights]
//!     corner_bonus = 50.0
//! "#).unwrap();
//! assert_eq!(cfg.strategy, Strategy::Expectimax);
//! assert_eq!(cfg.search.max_depth, 3);
//! assert_eq!(cfg.search.cache_capacity, 10_000);
//! assert_eq!(cfg.weights.corner_bonus, 50.0);
//! assert_eq!(cfg.weights.empty_tiles, 20.0);
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::expectimax::{SearchConfig, Strategy, Weights};

/// Default pause between automated moves.
pub const DEFAULT_TICK_MS: u64 = 100;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("invalid config {path}: {source}")]
    Parse { path: PathBuf, source: toml::de::Error },
    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BotConfig {
    pub strategy: Strategy,
    /// Pause between automated moves, in milliseconds.
    pub tick_ms: u64,
    /// Seed for tile spawns and the random strategy; entropy when absent.
    pub seed: Option<u64>,
    pub search: SearchConfig,
    pub weights: Weights,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            tick_ms: DEFAULT_TICK_MS,
            seed: None,
            search: SearchConfig::default(),
            weights: Weights::default(),
        }
    }
}

impl BotConfig {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        let cfg: BotConfig =
            toml::from_str(&text).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })?;
        cfg.validate()?;
        log::debug!("loaded config from {}: {cfg:?}", path.display());
        Ok(cfg)
    }

    /// Reject settings the search cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.search.max_depth == 0 {
            return Err(ConfigError::Invalid { field: "search.max_depth", reason: "must be at least 1".into() });
        }
        if self.search.chance_cells == 0 || self.search.late_game_chance_cells == 0 {
            return Err(ConfigError::Invalid { field: "search.chance_cells", reason: "must be at least 1".into() });
        }
        if !self.search.late_game_tile.is_power_of_two() {
            return Err(ConfigError::Invalid {
                field: "search.late_game_tile",
                reason: format!("{} is not a power of two", self.search.late_game_tile),
            });
        }
        if let Some(name) = self.weights.non_finite() {
            return Err(ConfigError::Invalid { field: "weights", reason: format!("{name} is not finite") });
        }
        Ok(())
    }

    #[inline]
    pub fn tick(&self) -> Duration { Duration::from_millis(self.tick_ms) }
}
