//! # Game Configuration
//!
//! Per-game parameters chosen at `new_game` time, their validation bounds, and
//! the TOML file format the binaries read. Command line flags are layered on
//! top of a loaded file by the binaries themselves.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::Path;

/// Allowed rows/columns of boxes on a Dots & Boxes board
pub const DOTS_BOARD_RANGE: RangeInclusive<usize> = 1..=12;
/// Allowed number of Dots & Boxes players
pub const DOTS_PLAYER_RANGE: RangeInclusive<usize> = 2..=4;
/// Allowed Hex board sides
pub const HEX_SIZE_RANGE: RangeInclusive<usize> = 2..=19;
/// Allowed Mastermind palette sizes
pub const PALETTE_RANGE: RangeInclusive<usize> = 2..=8;
/// Allowed Mastermind code lengths
pub const CODE_LENGTH_RANGE: RangeInclusive<usize> = 1..=8;
/// Allowed Mastermind attempt budgets
pub const MAX_ATTEMPTS_RANGE: RangeInclusive<usize> = 1..=20;

fn check(
    value: usize,
    range: &RangeInclusive<usize>,
    err: impl FnOnce(usize, usize, usize) -> ConfigError,
) -> Result<(), ConfigError> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(err(value, *range.start(), *range.end()))
    }
}

/// Dots & Boxes parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DotsAndBoxesConfig {
    /// Rows of boxes
    pub rows: usize,
    /// Columns of boxes
    pub cols: usize,
    /// Number of players taking turns
    pub players: usize,
    /// Whether player 2 is the computer
    pub vs_computer: bool,
}

impl Default for DotsAndBoxesConfig {
    fn default() -> Self {
        Self {
            rows: 6,
            cols: 6,
            players: 2,
            vs_computer: true,
        }
    }
}

impl DotsAndBoxesConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let board = |value, min, max| ConfigError::BoardSize { value, min, max };
        check(self.rows, &DOTS_BOARD_RANGE, board)?;
        check(self.cols, &DOTS_BOARD_RANGE, board)?;
        check(self.players, &DOTS_PLAYER_RANGE, |value, min, max| {
            ConfigError::PlayerCount { value, min, max }
        })?;
        if self.vs_computer && self.players != 2 {
            return Err(ConfigError::OpponentNeedsTwoPlayers {
                players: self.players,
            });
        }
        Ok(())
    }
}

/// Hex parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HexConfig {
    /// Side length of the rhombus board
    pub size: usize,
}

impl Default for HexConfig {
    fn default() -> Self {
        Self { size: 11 }
    }
}

impl HexConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check(self.size, &HEX_SIZE_RANGE, |value, min, max| {
            ConfigError::BoardSize { value, min, max }
        })
    }
}

/// Mastermind parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MastermindConfig {
    /// Number of colours the secret is drawn from
    pub palette_size: usize,
    /// Pegs per code
    pub code_length: usize,
    /// Guesses allowed before the game is lost
    pub max_attempts: usize,
}

impl Default for MastermindConfig {
    fn default() -> Self {
        Self {
            palette_size: 6,
            code_length: 4,
            max_attempts: 10,
        }
    }
}

impl MastermindConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check(self.palette_size, &PALETTE_RANGE, |value, min, max| {
            ConfigError::PaletteSize { value, min, max }
        })?;
        check(self.code_length, &CODE_LENGTH_RANGE, |value, min, max| {
            ConfigError::CodeLength { value, min, max }
        })?;
        check(self.max_attempts, &MAX_ATTEMPTS_RANGE, |value, min, max| {
            ConfigError::MaxAttempts { value, min, max }
        })
    }
}

/// Computer opponent behaviour
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpponentConfig {
    /// Artificial thinking delay before the computer moves
    pub delay_ms: u64,
    /// Fixed seed for reproducible play; fresh entropy when absent
    pub seed: Option<u64>,
}

impl Default for OpponentConfig {
    fn default() -> Self {
        Self {
            delay_ms: 600,
            seed: None,
        }
    }
}

/// Everything the binaries can read from a configuration file
///
/// ```toml
/// [dots_and_boxes]
/// rows = 4
/// cols = 4
///
/// [opponent]
/// delay_ms = 250
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    pub dots_and_boxes: DotsAndBoxesConfig,
    pub hex: HexConfig,
    pub mastermind: MastermindConfig,
    pub opponent: OpponentConfig,
}

impl ArenaConfig {
    /// Parses and validates a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: ArenaConfig = toml::from_str(text).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&text)
    }

    /// Serialises the configuration back to TOML
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string(self).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.dots_and_boxes.validate()?;
        self.hex.validate()?;
        self.mastermind.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert_eq!(ArenaConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_dots_bounds() {
        let mut cfg = DotsAndBoxesConfig {
            rows: 0,
            ..Default::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::BoardSize { value: 0, .. })));

        cfg.rows = 3;
        cfg.players = 5;
        cfg.vs_computer = false;
        assert!(matches!(cfg.validate(), Err(ConfigError::PlayerCount { value: 5, .. })));

        cfg.players = 3;
        assert_eq!(cfg.validate(), Ok(()));
        cfg.vs_computer = true;
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::OpponentNeedsTwoPlayers { players: 3 })
        );
    }

    #[test]
    fn test_hex_and_mastermind_bounds() {
        assert!(HexConfig { size: 1 }.validate().is_err());
        assert!(HexConfig { size: 20 }.validate().is_err());
        assert!(HexConfig { size: 7 }.validate().is_ok());

        let bad_palette = MastermindConfig {
            palette_size: 9,
            ..Default::default()
        };
        assert!(matches!(bad_palette.validate(), Err(ConfigError::PaletteSize { .. })));

        let bad_attempts = MastermindConfig {
            max_attempts: 0,
            ..Default::default()
        };
        assert!(matches!(bad_attempts.validate(), Err(ConfigError::MaxAttempts { .. })));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let cfg = ArenaConfig::from_toml_str(
            "[dots_and_boxes]\nrows = 3\ncols = 4\n\n[opponent]\ndelay_ms = 10\nseed = 7\n",
        )
        .unwrap();
        assert_eq!(cfg.dots_and_boxes.rows, 3);
        assert_eq!(cfg.dots_and_boxes.cols, 4);
        assert_eq!(cfg.dots_and_boxes.players, 2);
        assert_eq!(cfg.hex, HexConfig::default());
        assert_eq!(cfg.opponent.seed, Some(7));
    }

    #[test]
    fn test_invalid_toml_is_refused() {
        assert!(matches!(
            ArenaConfig::from_toml_str("[hex]\nsize = 40\n"),
            Err(ConfigError::BoardSize { value: 40, .. })
        ));
        assert!(matches!(
            ArenaConfig::from_toml_str("[hex\n"),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_toml_round_trip() {
        let cfg = ArenaConfig::default();
        let text = cfg.to_toml_string().unwrap();
        assert_eq!(ArenaConfig::from_toml_str(&text).unwrap(), cfg);
    }
}
