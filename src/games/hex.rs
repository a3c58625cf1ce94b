//! # Hex Game Implementation
//!
//! Two players take turns placing stones on a rhombus of hexagonal cells.
//! Player 1 tries to link the top and bottom rows, player 2 the left and right
//! columns. A filled board always has exactly one connected player, so there is
//! no draw.
//!
//! ## Coordinate System
//! Cells are stored row-major on an N×N grid. Cell `(r, c)` touches
//! `(r-1, c)`, `(r-1, c+1)`, `(r, c+1)`, `(r+1, c)`, `(r+1, c-1)` and `(r, c-1)`.

use crate::config::HexConfig;
use crate::error::{ConfigError, MoveError};
use crate::{GameState, GameStatus, PlayerId};
use colored::Colorize;
use parlor_shared::{flat_index, hex_neighbors};
use rand::Rng;
use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

/// Connects row 0 to row N-1
pub const TOP_BOTTOM: PlayerId = 1;
/// Connects column 0 to column N-1
pub const LEFT_RIGHT: PlayerId = 2;

/// Represents a move in Hex: the cell to claim
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct HexMove(pub usize, pub usize);

impl fmt::Display for HexMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.0, self.1)
    }
}

impl FromStr for HexMove {
    type Err = String;

    /// Parses `<row> <col>` (0-based) or the `d4` style (column letter, 1-based row)
    ///
    /// # Examples
    /// ```
    /// use std::str::FromStr;
    /// use parlor::games::hex::HexMove;
    /// assert_eq!(HexMove::from_str("3 4").unwrap(), HexMove(3, 4));
    /// assert_eq!(HexMove::from_str("d4").unwrap(), HexMove(3, 3));
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let parts: Vec<&str> = s.split_whitespace().collect();
        if parts.len() == 2 {
            let r = parts[0].parse::<usize>().map_err(|e| e.to_string())?;
            let c = parts[1].parse::<usize>().map_err(|e| e.to_string())?;
            return Ok(HexMove(r, c));
        }
        let mut chars = s.chars();
        match chars.next() {
            Some(letter) if letter.is_ascii_alphabetic() => {
                let col = (letter.to_ascii_lowercase() as u8 - b'a') as usize;
                let row = chars
                    .as_str()
                    .parse::<usize>()
                    .map_err(|e| e.to_string())?;
                if row == 0 {
                    return Err("rows are numbered from 1".to_string());
                }
                Ok(HexMove(row - 1, col))
            }
            _ => Err(format!("expected `<row> <col>` or `d4`, got `{}`", s)),
        }
    }
}

/// What happened when a stone was placed
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HexEvent {
    StonePlaced { row: usize, col: usize, player: PlayerId },
    /// The mover linked their two sides; `path` is one shortest winning chain
    Connected {
        player: PlayerId,
        path: Vec<(usize, usize)>,
    },
}

/// Represents the complete state of a Hex game
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HexState {
    size: usize,
    /// N×N, 0 empty, otherwise the owning player
    cells: Vec<PlayerId>,
    current_player: PlayerId,
    winner: Option<PlayerId>,
    last_move: Option<HexMove>,
}

impl HexState {
    /// Creates an empty board; player 1 moves first
    pub fn new(config: &HexConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            size: config.size,
            cells: vec![0; config.size * config.size],
            current_player: TOP_BOTTOM,
            winner: None,
            last_move: None,
        })
    }

    /// Builds a position from raw cell owners, e.g. for analysis of a filled board
    ///
    /// Player 1 is set to move; the winner is derived from the cells.
    pub fn from_cells(size: usize, cells: Vec<PlayerId>) -> Result<Self, ConfigError> {
        HexConfig { size }.validate()?;
        if cells.len() != size * size {
            return Err(ConfigError::BoardSize {
                value: cells.len(),
                min: size * size,
                max: size * size,
            });
        }
        let mut state = Self {
            size,
            cells: cells
                .into_iter()
                .map(|p| if p == TOP_BOTTOM || p == LEFT_RIGHT { p } else { 0 })
                .collect(),
            current_player: TOP_BOTTOM,
            winner: None,
            last_move: None,
        };
        state.winner = [TOP_BOTTOM, LEFT_RIGHT]
            .into_iter()
            .find(|&p| state.has_connection(p));
        Ok(state)
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get_last_move(&self) -> Option<HexMove> {
        self.last_move
    }

    /// Owner of a cell, `None` when off the board
    pub fn cell(&self, row: usize, col: usize) -> Option<PlayerId> {
        if row < self.size && col < self.size {
            Some(self.cells[flat_index(row, col, self.size)])
        } else {
            None
        }
    }

    /// Returns the board as rows for rendering
    pub fn get_board(&self) -> Vec<Vec<PlayerId>> {
        self.cells.chunks(self.size).map(|r| r.to_vec()).collect()
    }

    pub fn opponent(player: PlayerId) -> PlayerId {
        if player == TOP_BOTTOM {
            LEFT_RIGHT
        } else {
            TOP_BOTTOM
        }
    }

    fn on_start_edge(&self, player: PlayerId, (r, c): (usize, usize)) -> bool {
        if player == TOP_BOTTOM {
            r == 0
        } else {
            c == 0
        }
    }

    fn on_goal_edge(&self, player: PlayerId, (r, c): (usize, usize)) -> bool {
        if player == TOP_BOTTOM {
            r == self.size - 1
        } else {
            c == self.size - 1
        }
    }

    /// Breadth-first search over `player`'s stones from their start edge
    ///
    /// Returns one shortest chain from the start edge to the goal edge.
    pub fn connection_path(&self, player: PlayerId) -> Option<Vec<(usize, usize)>> {
        let n = self.size;
        let mut parent: Vec<Option<usize>> = vec![None; n * n];
        let mut seen = vec![false; n * n];
        let mut queue = VecDeque::new();

        for r in 0..n {
            for c in 0..n {
                let idx = flat_index(r, c, n);
                if self.cells[idx] == player && self.on_start_edge(player, (r, c)) {
                    seen[idx] = true;
                    queue.push_back((r, c));
                }
            }
        }

        while let Some((r, c)) = queue.pop_front() {
            if self.on_goal_edge(player, (r, c)) {
                let mut path = vec![(r, c)];
                let mut idx = flat_index(r, c, n);
                while let Some(prev) = parent[idx] {
                    path.push((prev / n, prev % n));
                    idx = prev;
                }
                path.reverse();
                return Some(path);
            }
            for (nr, nc) in hex_neighbors(r, c, n) {
                let nidx = flat_index(nr, nc, n);
                if !seen[nidx] && self.cells[nidx] == player {
                    seen[nidx] = true;
                    parent[nidx] = Some(flat_index(r, c, n));
                    queue.push_back((nr, nc));
                }
            }
        }
        None
    }

    /// Whether `player` links their two sides
    pub fn has_connection(&self, player: PlayerId) -> bool {
        self.connection_path(player).is_some()
    }

    /// The winning chain, if the game has been won
    pub fn winning_path(&self) -> Option<Vec<(usize, usize)>> {
        self.winner.and_then(|p| self.connection_path(p))
    }

    fn check_cell(&self, row: usize, col: usize) -> Result<usize, MoveError> {
        match self.cell(row, col) {
            None => Err(MoveError::OutOfRange { row, col }),
            Some(0) => Ok(flat_index(row, col, self.size)),
            Some(_) => Err(MoveError::AlreadyTaken { row, col }),
        }
    }

    /// Places a stone for `player`, returning the new board
    ///
    /// Only the mover's connectivity is recomputed; the turn passes to the
    /// other player.
    pub fn apply_cell(&self, row: usize, col: usize, player: PlayerId) -> Result<Self, MoveError> {
        if player != TOP_BOTTOM && player != LEFT_RIGHT {
            return Err(MoveError::WrongMover {
                expected: self.current_player,
                got: player,
            });
        }
        let idx = self.check_cell(row, col)?;
        let mut next = self.clone();
        next.cells[idx] = player;
        next.last_move = Some(HexMove(row, col));
        next.current_player = Self::opponent(player);
        if next.winner.is_none() && next.has_connection(player) {
            next.winner = Some(player);
        }
        Ok(next)
    }
}

impl fmt::Display for HexState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "    ")?;
        for c in 0..self.size {
            write!(f, "{} ", (b'a' + c as u8) as char)?;
        }
        writeln!(f)?;
        for r in 0..self.size {
            write!(f, "{}{:>2}  ", " ".repeat(r), r + 1)?;
            for c in 0..self.size {
                let symbol = match self.cells[flat_index(r, c, self.size)] {
                    TOP_BOTTOM => "X".red().to_string(),
                    LEFT_RIGHT => "O".blue().to_string(),
                    _ => ".".dimmed().to_string(),
                };
                write!(f, "{} ", symbol)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl GameState for HexState {
    type Move = HexMove;
    type Event = HexEvent;
    type Config = HexConfig;

    fn new_game<R: Rng + ?Sized>(config: &Self::Config, _rng: &mut R) -> Result<Self, ConfigError> {
        Self::new(config)
    }

    fn get_possible_moves(&self) -> Vec<Self::Move> {
        if self.winner.is_some() {
            return Vec::new();
        }
        (0..self.cells.len())
            .filter(|&i| self.cells[i] == 0)
            .map(|i| HexMove(i / self.size, i % self.size))
            .collect()
    }

    fn check_move(&self, mv: &Self::Move) -> Result<(), MoveError> {
        if self.winner.is_some() {
            return Err(MoveError::GameOver);
        }
        self.check_cell(mv.0, mv.1).map(|_| ())
    }

    fn apply_move(&self, mv: &Self::Move) -> Result<(Self, Vec<Self::Event>), MoveError> {
        self.check_move(mv)?;
        let player = self.current_player;
        let next = self.apply_cell(mv.0, mv.1, player)?;
        let mut events = vec![HexEvent::StonePlaced {
            row: mv.0,
            col: mv.1,
            player,
        }];
        if next.winner == Some(player) {
            if let Some(path) = next.connection_path(player) {
                events.push(HexEvent::Connected { player, path });
            }
        }
        Ok((next, events))
    }

    fn get_current_player(&self) -> PlayerId {
        self.current_player
    }

    fn get_num_players(&self) -> i32 {
        2
    }

    fn status(&self) -> GameStatus {
        match self.winner {
            Some(p) => GameStatus::Win(p),
            None => GameStatus::InProgress,
        }
    }
}
