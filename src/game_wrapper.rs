//! # Game Wrapper Module - Unified Game Interface
//!
//! Lets the controller, the opponent driver and the binaries handle every
//! engine through one set of types while each game keeps its own move and
//! event types.
//!
//! ```text
//! ┌─────────────────┐    ┌──────────────────┐    ┌──────────────────────┐
//! │ GameController  │◄──►│   GameWrapper    │◄──►│  Game-Specific       │
//! │ OpponentDriver  │    │   MoveWrapper    │    │  Implementations     │
//! │ play / arena    │    │   EventWrapper   │    │ • DotsAndBoxesState  │
//! └─────────────────┘    └──────────────────┘    │ • HexState           │
//!                                                 │ • MastermindState    │
//!                                                 └──────────────────────┘
//! ```
//!
//! Enums rather than trait objects: `GameState` has generic methods and
//! associated types, and matching on the variant lets game-specific code
//! (parsing, opponents) stay in one place.

use crate::config::{ArenaConfig, DotsAndBoxesConfig, HexConfig, MastermindConfig};
use crate::error::{ConfigError, MoveError};
use crate::games::dots_and_boxes::{DotsAndBoxesState, DotsEvent, DotsMove};
use crate::games::hex::{HexEvent, HexMove, HexState};
use crate::games::mastermind::{Guess, MastermindEvent, MastermindState};
use crate::opponent::{GreedyBoxOpponent, Opponent};
use crate::{GameState, GameStatus, PlayerId};
use rand::Rng;
use std::fmt;
use std::str::FromStr;

/// Which game to play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameKind {
    DotsAndBoxes,
    Hex,
    Mastermind,
}

impl GameKind {
    pub fn name(&self) -> &'static str {
        match self {
            GameKind::DotsAndBoxes => "Dots & Boxes",
            GameKind::Hex => "Hex",
            GameKind::Mastermind => "Mastermind",
        }
    }

    /// Picks this game's section out of a full configuration
    pub fn config_from(&self, config: &ArenaConfig) -> GameConfig {
        match self {
            GameKind::DotsAndBoxes => GameConfig::DotsAndBoxes(config.dots_and_boxes.clone()),
            GameKind::Hex => GameConfig::Hex(config.hex.clone()),
            GameKind::Mastermind => GameConfig::Mastermind(config.mastermind.clone()),
        }
    }
}

impl fmt::Display for GameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Configuration for any supported game
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameConfig {
    DotsAndBoxes(DotsAndBoxesConfig),
    Hex(HexConfig),
    Mastermind(MastermindConfig),
}

impl GameConfig {
    pub fn kind(&self) -> GameKind {
        match self {
            GameConfig::DotsAndBoxes(_) => GameKind::DotsAndBoxes,
            GameConfig::Hex(_) => GameKind::Hex,
            GameConfig::Mastermind(_) => GameKind::Mastermind,
        }
    }
}

/// Wrapper enum for all supported game states
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameWrapper {
    DotsAndBoxes(DotsAndBoxesState),
    Hex(HexState),
    Mastermind(MastermindState),
}

/// Wrapper enum for all supported move types
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MoveWrapper {
    DotsAndBoxes(DotsMove),
    Hex(HexMove),
    Mastermind(Guess),
}

/// Wrapper enum for all per-move events
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventWrapper {
    DotsAndBoxes(DotsEvent),
    Hex(HexEvent),
    Mastermind(MastermindEvent),
}

impl fmt::Display for MoveWrapper {
    /// Compact notation used in move histories and logs
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveWrapper::DotsAndBoxes(m) => write!(f, "D({})", m),
            MoveWrapper::Hex(m) => write!(f, "H({})", m),
            MoveWrapper::Mastermind(m) => write!(f, "M({})", m),
        }
    }
}

impl fmt::Display for GameWrapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameWrapper::DotsAndBoxes(g) => write!(f, "{}", g),
            GameWrapper::Hex(g) => write!(f, "{}", g),
            GameWrapper::Mastermind(g) => write!(f, "{}", g),
        }
    }
}

impl fmt::Display for EventWrapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventWrapper::DotsAndBoxes(e) => match e {
                DotsEvent::EdgeDrawn { mv, player } => write!(f, "player {} drew {}", player, mv),
                DotsEvent::BoxClaimed { row, col, player } => {
                    write!(f, "player {} claimed box ({}, {})", player, row, col)
                }
                DotsEvent::ExtraTurn { player } => write!(f, "player {} moves again", player),
                DotsEvent::TurnPassed { to } => write!(f, "player {} to move", to),
                DotsEvent::GameOver { status } => write!(f, "game over: {}", status),
            },
            EventWrapper::Hex(e) => match e {
                HexEvent::StonePlaced { row, col, player } => {
                    write!(f, "player {} placed at ({}, {})", player, row, col)
                }
                HexEvent::Connected { player, path } => {
                    write!(f, "player {} connected in {} stones", player, path.len())
                }
            },
            EventWrapper::Mastermind(e) => match e {
                MastermindEvent::Scored { attempt, feedback } => {
                    write!(f, "guess {}: {}", attempt, feedback)
                }
                MastermindEvent::Solved { attempts } => {
                    write!(f, "solved in {} guesses", attempts)
                }
                MastermindEvent::OutOfAttempts { secret } => {
                    let names: Vec<&str> = secret.iter().map(|c| c.name()).collect();
                    write!(f, "out of attempts, the code was {}", names.join(" "))
                }
            },
        }
    }
}

macro_rules! impl_game_dispatch {
    ($($variant:ident => $state:ty, $mv:ty),*) => {
        impl GameState for GameWrapper {
            type Move = MoveWrapper;
            type Event = EventWrapper;
            type Config = GameConfig;

            fn new_game<R: Rng + ?Sized>(config: &Self::Config, rng: &mut R) -> Result<Self, ConfigError> {
                match config {
                    $(GameConfig::$variant(c) => <$state as GameState>::new_game(c, rng).map(GameWrapper::$variant),)*
                }
            }

            fn get_possible_moves(&self) -> Vec<Self::Move> {
                match self {
                    $(GameWrapper::$variant(g) => g
                        .get_possible_moves()
                        .into_iter()
                        .map(MoveWrapper::$variant)
                        .collect(),)*
                }
            }

            fn check_move(&self, mv: &Self::Move) -> Result<(), MoveError> {
                match (self, mv) {
                    $((GameWrapper::$variant(g), MoveWrapper::$variant(m)) => g.check_move(m),)*
                    _ => Err(MoveError::MismatchedGame),
                }
            }

            fn apply_move(&self, mv: &Self::Move) -> Result<(Self, Vec<Self::Event>), MoveError> {
                match (self, mv) {
                    $((GameWrapper::$variant(g), MoveWrapper::$variant(m)) => {
                        let (next, events) = g.apply_move(m)?;
                        Ok((
                            GameWrapper::$variant(next),
                            events.into_iter().map(EventWrapper::$variant).collect(),
                        ))
                    })*
                    _ => Err(MoveError::MismatchedGame),
                }
            }

            fn get_current_player(&self) -> PlayerId {
                match self {
                    $(GameWrapper::$variant(g) => g.get_current_player(),)*
                }
            }

            fn get_num_players(&self) -> i32 {
                match self {
                    $(GameWrapper::$variant(g) => g.get_num_players(),)*
                }
            }

            fn status(&self) -> GameStatus {
                match self {
                    $(GameWrapper::$variant(g) => g.status(),)*
                }
            }
        }

        impl GameWrapper {
            /// Which game this is
            pub fn kind(&self) -> GameKind {
                match self {
                    $(GameWrapper::$variant(_) => GameKind::$variant,)*
                }
            }

            /// Parses user input into a move for this game
            pub fn parse_move(&self, text: &str) -> Result<MoveWrapper, String> {
                match self {
                    $(GameWrapper::$variant(_) => <$mv as FromStr>::from_str(text).map(MoveWrapper::$variant),)*
                }
            }
        }
    };
}

impl_game_dispatch!(
    DotsAndBoxes => DotsAndBoxesState, DotsMove,
    Hex => HexState, HexMove,
    Mastermind => MastermindState, Guess
);

impl GameWrapper {
    /// Seat played by the computer, if any
    pub fn computer_player(&self) -> Option<PlayerId> {
        match self {
            GameWrapper::DotsAndBoxes(g) if g.vs_computer() => Some(2),
            _ => None,
        }
    }

    /// True when the computer should move next
    pub fn is_computer_turn(&self) -> bool {
        !self.is_terminal() && self.computer_player() == Some(self.get_current_player())
    }

    /// Asks the built-in opponent for a move in the current position
    pub fn choose_opponent_move<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<MoveWrapper> {
        match self {
            GameWrapper::DotsAndBoxes(g) => GreedyBoxOpponent
                .choose_move(g, rng)
                .map(MoveWrapper::DotsAndBoxes),
            _ => None,
        }
    }
}
