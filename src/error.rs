//! Error types shared by every engine.
//!
//! Both classes are recoverable: a refused move or configuration leaves the
//! caller's state exactly as it was.

use crate::PlayerId;
use derive_more::{Display, Error, From};

/// Why a move was refused
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum MoveError {
    /// Coordinates fall outside the board
    #[display("({row}, {col}) is outside the board")]
    OutOfRange { row: usize, col: usize },
    /// Edge or cell already belongs to someone
    #[display("({row}, {col}) is already taken")]
    AlreadyTaken { row: usize, col: usize },
    /// The game is already in a terminal state
    #[display("game is already over")]
    GameOver,
    /// Guess does not have the configured code length
    #[display("guess has {got} pegs, expected {expected}")]
    WrongLength { expected: usize, got: usize },
    /// Guess uses a colour outside the palette
    #[display("colour {color} is not in the palette of {palette_size}")]
    UnknownColor { color: String, palette_size: usize },
    /// Submitted by someone whose turn it is not
    #[display("player {got} moved but it is player {expected}'s turn")]
    WrongMover { expected: PlayerId, got: PlayerId },
    /// Submitted against an outdated board
    #[display("move was made against version {got}, board is at version {expected}")]
    StaleVersion { expected: u64, got: u64 },
    /// Move belongs to a different game than the board
    #[display("move type doesn't match game")]
    MismatchedGame,
}

/// Why a game configuration was refused
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum ConfigError {
    #[display("board dimension {value} is outside {min}..={max}")]
    BoardSize { value: usize, min: usize, max: usize },
    #[display("player count {value} is outside {min}..={max}")]
    PlayerCount { value: usize, min: usize, max: usize },
    #[display("the computer opponent needs exactly 2 players, got {players}")]
    OpponentNeedsTwoPlayers { players: usize },
    #[display("palette size {value} is outside {min}..={max}")]
    PaletteSize { value: usize, min: usize, max: usize },
    #[display("code length {value} is outside {min}..={max}")]
    CodeLength { value: usize, min: usize, max: usize },
    #[display("max attempts {value} is outside {min}..={max}")]
    MaxAttempts { value: usize, min: usize, max: usize },
    #[display("could not parse configuration: {message}")]
    Parse { message: String },
    #[display("could not read {path}: {message}")]
    Io { path: String, message: String },
}

/// Either class of engine error
#[derive(Debug, Clone, PartialEq, Eq, Display, Error, From)]
pub enum GameError {
    #[display("illegal move: {_0}")]
    IllegalMove(#[error(source)] MoveError),
    #[display("invalid configuration: {_0}")]
    InvalidConfiguration(#[error(source)] ConfigError),
}
