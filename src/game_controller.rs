//! # Game Controller Module - Central Game State Management
//!
//! `GameController` owns the authoritative game state. Every move, from a
//! human or from the computer, is validated here before it is applied, and
//! every applied move is recorded in the history.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                       GameController                                │
//! │  ┌─────────────────────────────────────────────────────────────┐    │
//! │  │              Authoritative Game State + version             │    │
//! │  └─────────────────────────────────────────────────────────────┘    │
//! │                           │                                         │
//! │              ┌────────────┼────────────┐                            │
//! │              ▼            ▼            ▼                            │
//! │  ┌───────────────┐ ┌───────────┐ ┌─────────────────┐                │
//! │  │ OpponentDriver│ │ Renderer  │ │ Input handler   │                │
//! │  │ (versioned)   │ │ (view)    │ │ (requests)      │                │
//! │  └───────────────┘ └───────────┘ └─────────────────┘                │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Versions
//! The version increases on every applied move and on every reset. A caller
//! that decided on a move while looking at version `v` submits it with
//! [`GameController::try_make_move_as`]; if anything happened in between, the
//! move is refused as stale instead of being played on a board it was not
//! meant for.

use crate::error::MoveError;
use crate::game_wrapper::{EventWrapper, GameWrapper, MoveWrapper};
use crate::{GameState, GameStatus, PlayerId};
use std::time::SystemTime;
use tracing::{debug, info};

/// An accepted move and what it caused
#[derive(Debug, Clone, PartialEq)]
pub struct MoveOutcome {
    /// The applied move
    pub move_made: MoveWrapper,
    /// Player who made the move
    pub player: PlayerId,
    /// Facts the presentation layer should render
    pub events: Vec<EventWrapper>,
    /// Status after the move
    pub status: GameStatus,
    /// Version after the move
    pub version: u64,
}

/// A single entry in the move history
#[derive(Debug, Clone)]
pub struct MoveHistoryEntry {
    /// When the move was made
    pub timestamp: SystemTime,
    /// Player who made the move
    pub player: PlayerId,
    /// The move that was made
    pub move_made: MoveWrapper,
    /// Move number (1-indexed)
    pub move_number: usize,
}

impl MoveHistoryEntry {
    pub fn new(player: PlayerId, move_made: MoveWrapper, move_number: usize) -> Self {
        Self {
            timestamp: SystemTime::now(),
            player,
            move_made,
            move_number,
        }
    }
}

/// The central game controller that owns the authoritative game state
///
/// # Usage
/// ```rust
/// use parlor::config::HexConfig;
/// use parlor::game_controller::GameController;
/// use parlor::game_wrapper::{GameWrapper, MoveWrapper};
/// use parlor::games::hex::{HexMove, HexState};
///
/// let state = GameWrapper::Hex(HexState::new(&HexConfig { size: 5 }).unwrap());
/// let mut controller = GameController::new(state);
/// let outcome = controller.try_make_move(MoveWrapper::Hex(HexMove(2, 2))).unwrap();
/// assert_eq!(outcome.player, 1);
/// assert!(controller.try_make_move(MoveWrapper::Hex(HexMove(2, 2))).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct GameController {
    /// The authoritative game state
    game_state: GameWrapper,
    /// Complete history of moves made
    move_history: Vec<MoveHistoryEntry>,
    version: u64,
}

impl GameController {
    /// Create a new game controller with the given initial state
    pub fn new(initial_state: GameWrapper) -> Self {
        Self {
            game_state: initial_state,
            move_history: Vec::new(),
            version: 0,
        }
    }

    /// Validate a move without applying it
    pub fn validate_move(&self, mv: &MoveWrapper) -> Result<(), MoveError> {
        self.game_state.check_move(mv)
    }

    /// Validates and applies a move for whoever is to play
    pub fn try_make_move(&mut self, mv: MoveWrapper) -> Result<MoveOutcome, MoveError> {
        let (next, events) = self.game_state.apply_move(&mv)?;
        Ok(self.commit(next, events, mv))
    }

    /// Validates and applies a move submitted by `player` against `version`
    ///
    /// Refused with [`MoveError::StaleVersion`] if the board changed since the
    /// submitter looked at it, or [`MoveError::WrongMover`] if it is not
    /// `player`'s turn.
    pub fn try_make_move_as(
        &mut self,
        player: PlayerId,
        version: u64,
        mv: MoveWrapper,
    ) -> Result<MoveOutcome, MoveError> {
        if version != self.version {
            return Err(MoveError::StaleVersion {
                expected: self.version,
                got: version,
            });
        }
        let expected = self.game_state.get_current_player();
        if player != expected {
            return Err(MoveError::WrongMover {
                expected,
                got: player,
            });
        }
        self.try_make_move(mv)
    }

    fn commit(&mut self, next: GameWrapper, events: Vec<EventWrapper>, mv: MoveWrapper) -> MoveOutcome {
        let player = self.game_state.get_current_player();
        let move_number = self.move_history.len() + 1;
        self.game_state = next;
        self.version += 1;
        self.move_history
            .push(MoveHistoryEntry::new(player, mv.clone(), move_number));

        let status = self.game_state.status();
        debug!(%mv, player, move_number, version = self.version, "move applied");
        if status.is_game_over() {
            info!(game = %self.game_state.kind(), %status, moves = move_number, "game over");
        }
        MoveOutcome {
            move_made: mv,
            player,
            events,
            status,
            version: self.version,
        }
    }

    /// Get a clone of the game state for an opponent to search
    pub fn get_state_for_search(&self) -> GameWrapper {
        self.game_state.clone()
    }

    /// Get a reference to the game state for rendering
    pub fn get_render_state(&self) -> &GameWrapper {
        &self.game_state
    }

    /// Get the current player
    pub fn get_current_player(&self) -> PlayerId {
        self.game_state.get_current_player()
    }

    /// Version of the authoritative state
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Get the current game status
    pub fn get_status(&self) -> GameStatus {
        self.game_state.status()
    }

    /// Check if the game is over
    pub fn is_game_over(&self) -> bool {
        self.game_state.is_terminal()
    }

    /// Get the complete move history
    pub fn get_move_history(&self) -> &[MoveHistoryEntry] {
        &self.move_history
    }

    /// Get the number of moves made
    pub fn move_count(&self) -> usize {
        self.move_history.len()
    }

    /// Get the last move made, if any
    pub fn get_last_move(&self) -> Option<&MoveHistoryEntry> {
        self.move_history.last()
    }

    /// Get legal moves for the current player
    pub fn get_legal_moves(&self) -> Vec<MoveWrapper> {
        self.game_state.get_possible_moves()
    }

    /// Replace the game with a fresh one
    ///
    /// The version keeps increasing so moves computed against the old game
    /// are refused.
    pub fn reset(&mut self, new_state: GameWrapper) {
        self.game_state = new_state;
        self.move_history.clear();
        self.version += 1;
        debug!(version = self.version, "game reset");
    }

    /// Format move history as plain text
    pub fn format_history(&self) -> String {
        if self.move_history.is_empty() {
            return String::from("No moves made yet.");
        }

        let mut output = format!("=== {} Game History ===\n\n", self.game_state.kind());
        for entry in &self.move_history {
            output.push_str(&format!(
                "{}. {} - {}\n",
                entry.move_number,
                self.get_player_name(entry.player),
                entry.move_made
            ));
        }

        match self.get_status() {
            GameStatus::InProgress => {
                output.push_str(&format!(
                    "\n(Game in progress - {} to move)\n",
                    self.get_player_name(self.get_current_player())
                ));
            }
            status => output.push_str(&format!("\nResult: {}\n", status)),
        }
        output
    }

    /// Get a human-readable player name
    fn get_player_name(&self, player_id: PlayerId) -> String {
        match &self.game_state {
            GameWrapper::Mastermind(_) => "Codebreaker".to_string(),
            GameWrapper::Hex(_) => {
                if player_id == 1 {
                    "Red (top-bottom)".to_string()
                } else {
                    "Blue (left-right)".to_string()
                }
            }
            GameWrapper::DotsAndBoxes(_) if self.game_state.computer_player() == Some(player_id) => {
                "Computer".to_string()
            }
            GameWrapper::DotsAndBoxes(_) => format!("Player {}", player_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DotsAndBoxesConfig, HexConfig, MastermindConfig};
    use crate::games::dots_and_boxes::{DotsAndBoxesState, DotsMove};
    use crate::games::hex::{HexMove, HexState};
    use crate::games::mastermind::{Color, Guess, MastermindState};

    fn hex(size: usize) -> GameWrapper {
        GameWrapper::Hex(HexState::new(&HexConfig { size }).unwrap())
    }

    #[test]
    fn test_valid_move() {
        let mut controller = GameController::new(hex(5));
        let outcome = controller
            .try_make_move(MoveWrapper::Hex(HexMove(2, 2)))
            .unwrap();
        assert_eq!(outcome.player, 1);
        assert_eq!(outcome.status, GameStatus::InProgress);
        assert_eq!(outcome.version, 1);
        assert_eq!(controller.version(), 1);
    }

    #[test]
    fn test_invalid_move_occupied() {
        let mut controller = GameController::new(hex(5));
        controller.try_make_move(MoveWrapper::Hex(HexMove(2, 2))).unwrap();
        let err = controller
            .try_make_move(MoveWrapper::Hex(HexMove(2, 2)))
            .unwrap_err();
        assert_eq!(err, MoveError::AlreadyTaken { row: 2, col: 2 });
        assert_eq!(controller.move_count(), 1);
        assert_eq!(controller.version(), 1);
    }

    #[test]
    fn test_move_history() {
        let mut controller = GameController::new(hex(5));
        controller.try_make_move(MoveWrapper::Hex(HexMove(0, 0))).unwrap();
        controller.try_make_move(MoveWrapper::Hex(HexMove(0, 1))).unwrap();

        assert_eq!(controller.move_count(), 2);
        assert_eq!(controller.get_move_history()[0].player, 1);
        assert_eq!(controller.get_move_history()[1].player, 2);
        assert_eq!(controller.get_last_move().unwrap().move_number, 2);
    }

    #[test]
    fn test_stale_and_out_of_turn_rejected() {
        let mut controller = GameController::new(hex(5));
        let v0 = controller.version();
        controller
            .try_make_move_as(1, v0, MoveWrapper::Hex(HexMove(1, 1)))
            .unwrap();

        // Player 2 decided against the old board
        let err = controller
            .try_make_move_as(2, v0, MoveWrapper::Hex(HexMove(3, 3)))
            .unwrap_err();
        assert_eq!(err, MoveError::StaleVersion { expected: 1, got: 0 });

        // Player 1 tries to move twice
        let err = controller
            .try_make_move_as(1, 1, MoveWrapper::Hex(HexMove(3, 3)))
            .unwrap_err();
        assert_eq!(err, MoveError::WrongMover { expected: 2, got: 1 });

        controller
            .try_make_move_as(2, 1, MoveWrapper::Hex(HexMove(3, 3)))
            .unwrap();
        assert_eq!(controller.move_count(), 2);
    }

    #[test]
    fn test_reset() {
        let mut controller = GameController::new(hex(5));
        controller.try_make_move(MoveWrapper::Hex(HexMove(2, 2))).unwrap();
        let before = controller.version();

        controller.reset(hex(5));
        assert_eq!(controller.move_count(), 0);
        assert_eq!(controller.get_status(), GameStatus::InProgress);
        assert!(controller.version() > before);
        assert!(controller
            .try_make_move_as(1, before, MoveWrapper::Hex(HexMove(0, 0)))
            .is_err());
    }

    #[test]
    fn test_moves_after_game_over_rejected() {
        let cfg = MastermindConfig {
            palette_size: 2,
            code_length: 1,
            max_attempts: 3,
        };
        let state = MastermindState::with_secret(&cfg, vec![Color::Blue]).unwrap();
        let mut controller = GameController::new(GameWrapper::Mastermind(state));
        let outcome = controller
            .try_make_move(MoveWrapper::Mastermind(Guess(vec![Color::Blue])))
            .unwrap();
        assert_eq!(outcome.status, GameStatus::Win(1));
        assert!(controller.get_legal_moves().is_empty());
        assert_eq!(
            controller.try_make_move(MoveWrapper::Mastermind(Guess(vec![Color::Red]))),
            Err(MoveError::GameOver)
        );
        assert_eq!(controller.move_count(), 1);
    }

    #[test]
    fn test_format_history() {
        let state = DotsAndBoxesState::new(&DotsAndBoxesConfig {
            rows: 2,
            cols: 2,
            players: 2,
            vs_computer: true,
        })
        .unwrap();
        let mut controller = GameController::new(GameWrapper::DotsAndBoxes(state));
        controller
            .try_make_move(MoveWrapper::DotsAndBoxes(DotsMove::horizontal(0, 0)))
            .unwrap();

        let history = controller.format_history();
        assert!(history.contains("Dots & Boxes Game History"));
        assert!(history.contains("1. Player 1 - D(h 0 0)"));
        assert!(history.contains("Computer to move"));
    }
}
