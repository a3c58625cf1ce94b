//! # Parlor Game Engines
//!
//! Pure, framework-independent rule engines for three turn-based games:
//! Dots & Boxes, Hex and Mastermind. Each engine is a reducer: given a state
//! and a move it either produces a fresh state plus the events the caller has
//! to render, or refuses the move and leaves the input untouched.
//!
//! Presentation layers drive the engines through the [`GameState`] trait
//! directly, or through [`game_wrapper::GameWrapper`] and
//! [`game_controller::GameController`] when they want one code path for all
//! games.

use rand::Rng;
use std::fmt;

pub mod config;
pub mod error;
pub mod game_controller;
pub mod game_wrapper;
pub mod games;
pub mod opponent;
pub mod opponent_driver;

pub use error::{ConfigError, GameError, MoveError};

/// Identifier of a player. `0` means "nobody" on every board.
pub type PlayerId = i32;

/// Overall status of a game
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameStatus {
    /// Game is still in progress
    InProgress,
    /// Game ended with a single winner
    Win(PlayerId),
    /// Game ended with several players sharing the top score
    Draw(Vec<PlayerId>),
    /// Solo game ended without the goal being reached
    Lost,
}

impl GameStatus {
    /// Check if the game is over
    pub fn is_game_over(&self) -> bool {
        !matches!(self, GameStatus::InProgress)
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameStatus::InProgress => write!(f, "in progress"),
            GameStatus::Win(p) => write!(f, "player {} wins", p),
            GameStatus::Draw(players) => {
                let names: Vec<String> = players.iter().map(|p| p.to_string()).collect();
                write!(f, "draw between players {}", names.join(", "))
            }
            GameStatus::Lost => write!(f, "out of attempts"),
        }
    }
}

/// A turn-based game expressed as a pure state transition.
///
/// `Send` and `Sync` are required so states can cross into the opponent task
/// and the arena's worker threads.
pub trait GameState: Clone + Send + Sync + Sized {
    /// The type of a move in the game.
    type Move: Clone + Eq + std::hash::Hash + fmt::Debug + Send + Sync;
    /// Facts about an accepted move the presentation layer renders.
    type Event: Clone + PartialEq + fmt::Debug + Send + Sync;
    /// Parameters chosen when a game starts.
    type Config: Clone + fmt::Debug;

    /// Creates a fresh game. `rng` is the only source of hidden randomness.
    fn new_game<R: Rng + ?Sized>(config: &Self::Config, rng: &mut R) -> Result<Self, ConfigError>;

    /// Returns all legal moves from the current state.
    fn get_possible_moves(&self) -> Vec<Self::Move>;

    /// Returns true exactly when [`GameState::apply_move`] would accept `mv`.
    fn is_legal(&self, mv: &Self::Move) -> bool {
        self.check_move(mv).is_ok()
    }

    /// Explains why `mv` would be refused, if it would.
    fn check_move(&self, mv: &Self::Move) -> Result<(), MoveError>;

    /// Applies a move, returning the successor state and the events it produced.
    fn apply_move(&self, mv: &Self::Move) -> Result<(Self, Vec<Self::Event>), MoveError>;

    /// Returns the player whose turn it is to move.
    fn get_current_player(&self) -> PlayerId;

    /// Returns the number of seats at the table.
    fn get_num_players(&self) -> i32;

    /// Returns the current status of the game.
    fn status(&self) -> GameStatus;

    /// Returns true if the game is over.
    fn is_terminal(&self) -> bool {
        self.status().is_game_over()
    }
}
