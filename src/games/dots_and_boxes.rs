//! # Dots & Boxes Game Implementation
//!
//! Players take turns drawing a line between two adjacent dots. Whoever draws
//! the fourth side of a box claims it and must move again.
//!
//! ## Rules
//! - 2 to 4 players rotate in a fixed order
//! - Drawing a line that completes one or two boxes claims them and keeps the turn
//! - Otherwise the turn passes to the next player
//! - The game ends when every box is claimed; the highest score wins, ties are shared
//!
//! ## Board Representation
//! A board of `rows`×`cols` boxes has `(rows+1)×cols` horizontal edges and
//! `rows×(cols+1)` vertical edges. Every edge and box stores `0` when free or
//! the id of the player who drew/claimed it.

use crate::config::DotsAndBoxesConfig;
use crate::error::{ConfigError, MoveError};
use crate::{GameState, GameStatus, PlayerId};
use colored::Colorize;
use parlor_shared::flat_index;
use rand::Rng;
use std::fmt;
use std::str::FromStr;

/// Orientation of an edge
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum EdgeKind {
    /// Joins `(row, col)` and `(row, col+1)` dots; `row` in `0..=rows`
    Horizontal,
    /// Joins `(row, col)` and `(row+1, col)` dots; `col` in `0..=cols`
    Vertical,
}

/// Represents a move in Dots & Boxes: one edge to draw
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct DotsMove {
    pub kind: EdgeKind,
    pub row: usize,
    pub col: usize,
}

impl DotsMove {
    pub fn horizontal(row: usize, col: usize) -> Self {
        Self {
            kind: EdgeKind::Horizontal,
            row,
            col,
        }
    }

    pub fn vertical(row: usize, col: usize) -> Self {
        Self {
            kind: EdgeKind::Vertical,
            row,
            col,
        }
    }
}

impl fmt::Display for DotsMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let k = match self.kind {
            EdgeKind::Horizontal => 'h',
            EdgeKind::Vertical => 'v',
        };
        write!(f, "{} {} {}", k, self.row, self.col)
    }
}

impl FromStr for DotsMove {
    type Err = String;

    /// Parses `h <row> <col>` or `v <row> <col>`
    ///
    /// # Examples
    /// ```
    /// use std::str::FromStr;
    /// use parlor::games::dots_and_boxes::DotsMove;
    /// let mv = DotsMove::from_str("v 2 3").unwrap();
    /// assert_eq!(mv, DotsMove::vertical(2, 3));
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split_whitespace().collect();
        if parts.len() != 3 {
            return Err(format!("expected `h|v <row> <col>`, got `{}`", s.trim()));
        }
        let kind = match parts[0].to_ascii_lowercase().as_str() {
            "h" => EdgeKind::Horizontal,
            "v" => EdgeKind::Vertical,
            other => return Err(format!("unknown edge kind `{}`", other)),
        };
        let row = parts[1].parse::<usize>().map_err(|e| e.to_string())?;
        let col = parts[2].parse::<usize>().map_err(|e| e.to_string())?;
        Ok(Self { kind, row, col })
    }
}

/// What happened when an edge was drawn
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DotsEvent {
    EdgeDrawn { mv: DotsMove, player: PlayerId },
    BoxClaimed { row: usize, col: usize, player: PlayerId },
    /// The mover scored and keeps the turn
    ExtraTurn { player: PlayerId },
    TurnPassed { to: PlayerId },
    GameOver { status: GameStatus },
}

/// Represents the complete state of a Dots & Boxes game
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DotsAndBoxesState {
    rows: usize,
    cols: usize,
    num_players: i32,
    /// (rows+1)×cols, row-major
    h_edges: Vec<PlayerId>,
    /// rows×(cols+1), row-major
    v_edges: Vec<PlayerId>,
    /// rows×cols box owners
    boxes: Vec<PlayerId>,
    /// Indexed by player id - 1
    scores: Vec<usize>,
    current_player: PlayerId,
    vs_computer: bool,
    last_move: Option<DotsMove>,
}

impl DotsAndBoxesState {
    /// Creates an empty board; player 1 moves first
    pub fn new(config: &DotsAndBoxesConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let (rows, cols) = (config.rows, config.cols);
        Ok(Self {
            rows,
            cols,
            num_players: config.players as i32,
            h_edges: vec![0; (rows + 1) * cols],
            v_edges: vec![0; rows * (cols + 1)],
            boxes: vec![0; rows * cols],
            scores: vec![0; config.players],
            current_player: 1,
            vs_computer: config.vs_computer,
            last_move: None,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Whether player 2 is played by the computer
    pub fn vs_computer(&self) -> bool {
        self.vs_computer
    }

    pub fn get_last_move(&self) -> Option<DotsMove> {
        self.last_move
    }

    fn edge_index(&self, mv: &DotsMove) -> Option<usize> {
        match mv.kind {
            EdgeKind::Horizontal if mv.row <= self.rows && mv.col < self.cols => {
                Some(flat_index(mv.row, mv.col, self.cols))
            }
            EdgeKind::Vertical if mv.row < self.rows && mv.col <= self.cols => {
                Some(flat_index(mv.row, mv.col, self.cols + 1))
            }
            _ => None,
        }
    }

    /// Owner of an edge; `None` when the coordinates are off the board
    pub fn edge(&self, mv: &DotsMove) -> Option<PlayerId> {
        let idx = self.edge_index(mv)?;
        Some(match mv.kind {
            EdgeKind::Horizontal => self.h_edges[idx],
            EdgeKind::Vertical => self.v_edges[idx],
        })
    }

    /// Owner of a box, `0` when unclaimed
    pub fn box_owner(&self, row: usize, col: usize) -> PlayerId {
        self.boxes[flat_index(row, col, self.cols)]
    }

    /// Number of drawn sides around box `(row, col)`
    pub fn drawn_sides(&self, row: usize, col: usize) -> usize {
        [
            self.h_edges[flat_index(row, col, self.cols)],
            self.h_edges[flat_index(row + 1, col, self.cols)],
            self.v_edges[flat_index(row, col, self.cols + 1)],
            self.v_edges[flat_index(row, col + 1, self.cols + 1)],
        ]
        .iter()
        .filter(|&&e| e != 0)
        .count()
    }

    /// Number of boxes that currently have exactly `sides` drawn sides
    pub fn count_boxes_with_sides(&self, sides: usize) -> usize {
        (0..self.rows)
            .flat_map(|r| (0..self.cols).map(move |c| (r, c)))
            .filter(|&(r, c)| self.drawn_sides(r, c) == sides)
            .count()
    }

    /// The one or two boxes an edge borders
    pub fn adjacent_boxes(&self, mv: &DotsMove) -> Vec<(usize, usize)> {
        let mut cells = Vec::with_capacity(2);
        match mv.kind {
            EdgeKind::Horizontal => {
                if mv.row > 0 {
                    cells.push((mv.row - 1, mv.col));
                }
                if mv.row < self.rows {
                    cells.push((mv.row, mv.col));
                }
            }
            EdgeKind::Vertical => {
                if mv.col > 0 {
                    cells.push((mv.row, mv.col - 1));
                }
                if mv.col < self.cols {
                    cells.push((mv.row, mv.col));
                }
            }
        }
        cells
    }

    /// How many boxes drawing `mv` would complete right now
    pub fn boxes_completed_by(&self, mv: &DotsMove) -> usize {
        if self.edge(mv) != Some(0) {
            return 0;
        }
        self.adjacent_boxes(mv)
            .into_iter()
            .filter(|&(r, c)| self.drawn_sides(r, c) == 3)
            .count()
    }

    /// Score of every player, indexed by `player id - 1`
    pub fn scores(&self) -> &[usize] {
        &self.scores
    }

    pub fn score(&self, player: PlayerId) -> usize {
        self.scores
            .get((player - 1) as usize)
            .copied()
            .unwrap_or(0)
    }

    /// Boxes claimed so far
    pub fn claimed(&self) -> usize {
        self.scores.iter().sum()
    }

    /// The player who moves after `player` when nobody scores
    pub fn next_player(&self, player: PlayerId) -> PlayerId {
        player % self.num_players + 1
    }

    fn check_edge(&self, mv: &DotsMove) -> Result<usize, MoveError> {
        let idx = self.edge_index(mv).ok_or(MoveError::OutOfRange {
            row: mv.row,
            col: mv.col,
        })?;
        let owner = match mv.kind {
            EdgeKind::Horizontal => self.h_edges[idx],
            EdgeKind::Vertical => self.v_edges[idx],
        };
        if owner != 0 {
            return Err(MoveError::AlreadyTaken {
                row: mv.row,
                col: mv.col,
            });
        }
        Ok(idx)
    }

    /// Draws an edge for `player`, returning the new board and the boxes it scored
    ///
    /// The receiver is never modified. Completed boxes are attributed to
    /// `player`, who keeps the turn if anything was scored.
    pub fn apply_edge(
        &self,
        kind: EdgeKind,
        row: usize,
        col: usize,
        player: PlayerId,
    ) -> Result<(Self, usize), MoveError> {
        if player < 1 || player > self.num_players {
            return Err(MoveError::WrongMover {
                expected: self.current_player,
                got: player,
            });
        }
        let mv = DotsMove { kind, row, col };
        let idx = self.check_edge(&mv)?;

        let mut next = self.clone();
        match kind {
            EdgeKind::Horizontal => next.h_edges[idx] = player,
            EdgeKind::Vertical => next.v_edges[idx] = player,
        }

        let mut scored = 0;
        for (r, c) in next.adjacent_boxes(&mv) {
            let b = flat_index(r, c, next.cols);
            if next.boxes[b] == 0 && next.drawn_sides(r, c) == 4 {
                next.boxes[b] = player;
                scored += 1;
            }
        }
        next.scores[(player - 1) as usize] += scored;
        next.current_player = if scored > 0 {
            player
        } else {
            next.next_player(player)
        };
        next.last_move = Some(mv);
        Ok((next, scored))
    }

    /// Paints text in the colour of `player`
    fn player_paint(text: &str, player: PlayerId) -> String {
        match player {
            1 => text.red().to_string(),
            2 => text.blue().to_string(),
            3 => text.green().to_string(),
            4 => text.yellow().to_string(),
            _ => text.dimmed().to_string(),
        }
    }
}

impl fmt::Display for DotsAndBoxesState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "    ")?;
        for c in 0..=self.cols {
            write!(f, "{:<4}", c)?;
        }
        writeln!(f)?;
        for r in 0..=self.rows {
            write!(f, "{:>2}  ", r)?;
            for c in 0..self.cols {
                let owner = self.h_edges[flat_index(r, c, self.cols)];
                let line = if owner == 0 { "   " } else { "───" };
                write!(f, "•{}", Self::player_paint(line, owner))?;
            }
            writeln!(f, "•")?;
            if r == self.rows {
                break;
            }
            write!(f, "    ")?;
            for c in 0..=self.cols {
                let owner = self.v_edges[flat_index(r, c, self.cols + 1)];
                let line = if owner == 0 { " " } else { "│" };
                write!(f, "{}", Self::player_paint(line, owner))?;
                if c < self.cols {
                    let b = self.box_owner(r, c);
                    let label = if b == 0 {
                        "   ".to_string()
                    } else {
                        format!(" {} ", b)
                    };
                    write!(f, "{}", Self::player_paint(&label, b))?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl GameState for DotsAndBoxesState {
    type Move = DotsMove;
    type Event = DotsEvent;
    type Config = DotsAndBoxesConfig;

    fn new_game<R: Rng + ?Sized>(config: &Self::Config, _rng: &mut R) -> Result<Self, ConfigError> {
        Self::new(config)
    }

    fn get_possible_moves(&self) -> Vec<Self::Move> {
        let horizontal = (0..=self.rows)
            .flat_map(|r| (0..self.cols).map(move |c| DotsMove::horizontal(r, c)));
        let vertical = (0..self.rows)
            .flat_map(|r| (0..=self.cols).map(move |c| DotsMove::vertical(r, c)));
        horizontal
            .chain(vertical)
            .filter(|mv| self.edge(mv) == Some(0))
            .collect()
    }

    fn check_move(&self, mv: &Self::Move) -> Result<(), MoveError> {
        if self.is_terminal() {
            return Err(MoveError::GameOver);
        }
        self.check_edge(mv).map(|_| ())
    }

    fn apply_move(&self, mv: &Self::Move) -> Result<(Self, Vec<Self::Event>), MoveError> {
        self.check_move(mv)?;
        let player = self.current_player;
        let (next, _scored) = self.apply_edge(mv.kind, mv.row, mv.col, player)?;

        let mut events = vec![DotsEvent::EdgeDrawn { mv: *mv, player }];
        for (r, c) in self.adjacent_boxes(mv) {
            if self.box_owner(r, c) == 0 && next.box_owner(r, c) == player {
                events.push(DotsEvent::BoxClaimed { row: r, col: c, player });
            }
        }
        let status = next.status();
        if status.is_game_over() {
            events.push(DotsEvent::GameOver { status });
        } else if next.current_player == player {
            events.push(DotsEvent::ExtraTurn { player });
        } else {
            events.push(DotsEvent::TurnPassed {
                to: next.current_player,
            });
        }
        Ok((next, events))
    }

    fn get_current_player(&self) -> PlayerId {
        self.current_player
    }

    fn get_num_players(&self) -> i32 {
        self.num_players
    }

    fn status(&self) -> GameStatus {
        if self.claimed() < self.rows * self.cols {
            return GameStatus::InProgress;
        }
        let best = self.scores.iter().copied().max().unwrap_or(0);
        let leaders: Vec<PlayerId> = self
            .scores
            .iter()
            .enumerate()
            .filter(|(_, &s)| s == best)
            .map(|(i, _)| i as PlayerId + 1)
            .collect();
        match leaders.as_slice() {
            [single] => GameStatus::Win(*single),
            _ => GameStatus::Draw(leaders),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    fn board(rows: usize, cols: usize, players: usize) -> DotsAndBoxesState {
        DotsAndBoxesState::new(&DotsAndBoxesConfig {
            rows,
            cols,
            players,
            vs_computer: false,
        })
        .unwrap()
    }

    fn play(state: &DotsAndBoxesState, mv: DotsMove) -> DotsAndBoxesState {
        state.apply_move(&mv).unwrap().0
    }

    #[test]
    fn test_new_game() {
        let game = board(6, 6, 2);
        assert_eq!(game.get_current_player(), 1);
        assert_eq!(game.get_num_players(), 2);
        assert_eq!(game.get_possible_moves().len(), 7 * 6 + 6 * 7);
        assert_eq!(game.status(), GameStatus::InProgress);
    }

    #[test]
    fn test_edge_counts_match_board_shape() {
        let game = board(2, 3, 2);
        assert_eq!(game.h_edges.len(), 3 * 3);
        assert_eq!(game.v_edges.len(), 2 * 4);
        assert_eq!(game.get_possible_moves().len(), 17);
    }

    #[test]
    fn test_out_of_range_rejected() {
        let game = board(2, 2, 2);
        assert_eq!(
            game.apply_move(&DotsMove::horizontal(3, 0)).unwrap_err(),
            MoveError::OutOfRange { row: 3, col: 0 }
        );
        assert!(game.apply_move(&DotsMove::horizontal(2, 2)).is_err());
        assert!(game.apply_move(&DotsMove::vertical(2, 0)).is_err());
        assert!(game.apply_move(&DotsMove::vertical(1, 2)).is_ok());
    }

    #[test]
    fn test_same_edge_twice_leaves_board_identical() {
        let game = board(3, 3, 2);
        let after_first = play(&game, DotsMove::vertical(1, 1));
        let snapshot = after_first.clone();
        let err = after_first.apply_move(&DotsMove::vertical(1, 1)).unwrap_err();
        assert_eq!(err, MoveError::AlreadyTaken { row: 1, col: 1 });
        assert_eq!(after_first, snapshot);
        assert!(!after_first.is_legal(&DotsMove::vertical(1, 1)));
    }

    #[test]
    fn test_single_box_keeps_turn() {
        // 6x6, two players; player 2 closes box (0,0)
        let mut game = board(6, 6, 2);
        game = play(&game, DotsMove::horizontal(0, 0)); // P1
        game = play(&game, DotsMove::vertical(0, 0)); // P2
        game = play(&game, DotsMove::vertical(0, 1)); // P1
        assert_eq!(game.get_current_player(), 2);

        let (next, events) = game.apply_move(&DotsMove::horizontal(1, 0)).unwrap();
        assert_eq!(next.score(2), 1);
        assert_eq!(next.score(1), 0);
        assert_eq!(next.box_owner(0, 0), 2);
        assert_eq!(next.get_current_player(), 2);
        assert!(events.contains(&DotsEvent::BoxClaimed { row: 0, col: 0, player: 2 }));
        assert!(events.contains(&DotsEvent::ExtraTurn { player: 2 }));
    }

    #[test]
    fn test_interior_edge_scores_two() {
        let mut game = board(1, 2, 2);
        for mv in [
            DotsMove::horizontal(0, 0),
            DotsMove::horizontal(0, 1),
            DotsMove::horizontal(1, 0),
            DotsMove::horizontal(1, 1),
            DotsMove::vertical(0, 0),
            DotsMove::vertical(0, 2),
        ] {
            game = play(&game, mv);
        }
        assert_eq!(game.claimed(), 0);
        assert_eq!(game.get_current_player(), 1);
        assert_eq!(game.boxes_completed_by(&DotsMove::vertical(0, 1)), 2);

        let (next, scored) = game.apply_edge(EdgeKind::Vertical, 0, 1, 1).unwrap();
        assert_eq!(scored, 2);
        assert_eq!(next.box_owner(0, 0), 1);
        assert_eq!(next.box_owner(0, 1), 1);
        assert_eq!(next.status(), GameStatus::Win(1));
        assert!(next.is_terminal());
    }

    #[test]
    fn test_turn_rotation_three_players() {
        let mut game = board(3, 3, 3);
        game = play(&game, DotsMove::horizontal(0, 0));
        assert_eq!(game.get_current_player(), 2);
        game = play(&game, DotsMove::horizontal(3, 2));
        assert_eq!(game.get_current_player(), 3);
        game = play(&game, DotsMove::vertical(2, 3));
        assert_eq!(game.get_current_player(), 1);
    }

    #[test]
    fn test_apply_edge_rejects_unknown_player() {
        let game = board(2, 2, 2);
        assert!(matches!(
            game.apply_edge(EdgeKind::Horizontal, 0, 0, 3),
            Err(MoveError::WrongMover { got: 3, .. })
        ));
    }

    #[test]
    fn test_scores_sum_to_box_count() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(11);
        for players in 2..=4 {
            let mut game = board(4, 5, players);
            while !game.is_terminal() {
                let moves = game.get_possible_moves();
                let mv = moves[rng.random_range(0..moves.len())];
                game = play(&game, mv);
            }
            assert_eq!(game.scores().iter().sum::<usize>(), 20);
            assert!(game.get_possible_moves().is_empty());
            assert_eq!(game.check_move(&DotsMove::horizontal(0, 0)), Err(MoveError::GameOver));
        }
    }

    #[test]
    fn test_forced_reply_hands_over_both_boxes() {
        let mut game = board(1, 2, 2);
        game = play(&game, DotsMove::horizontal(0, 0)); // P1
        game = play(&game, DotsMove::horizontal(1, 0)); // P2
        game = play(&game, DotsMove::vertical(0, 0)); // P1
        game = play(&game, DotsMove::vertical(0, 1)); // P2 closes (0,0)
        assert_eq!(game.score(2), 1);
        assert_eq!(game.get_current_player(), 2);
        game = play(&game, DotsMove::horizontal(0, 1)); // P2 again
        game = play(&game, DotsMove::horizontal(1, 1)); // P1
        let (game, events) = game.apply_move(&DotsMove::vertical(0, 2)).unwrap(); // P2 closes (0,1)
        assert_eq!(game.status(), GameStatus::Win(2));
        assert_eq!(
            events.last(),
            Some(&DotsEvent::GameOver {
                status: GameStatus::Win(2)
            })
        );
    }

    #[test]
    fn test_tied_scores_draw() {
        let mut game = board(1, 2, 2);
        game.h_edges.iter_mut().for_each(|e| *e = 1);
        game.v_edges.iter_mut().for_each(|e| *e = 2);
        game.boxes = vec![1, 2];
        game.scores = vec![1, 1];
        assert_eq!(game.status(), GameStatus::Draw(vec![1, 2]));
        assert!(game.is_terminal());
    }

    #[test]
    fn test_parse_move() {
        assert_eq!(DotsMove::from_str("h 0 1").unwrap(), DotsMove::horizontal(0, 1));
        assert_eq!(DotsMove::from_str(" V 2 3 ").unwrap(), DotsMove::vertical(2, 3));
        assert!(DotsMove::from_str("x 1 1").is_err());
        assert!(DotsMove::from_str("h 1").is_err());
        assert_eq!(DotsMove::vertical(2, 3).to_string(), "v 2 3");
    }

    #[test]
    fn test_display_does_not_panic() {
        let game = play(&board(2, 2, 2), DotsMove::horizontal(0, 0));
        let text = format!("{}", game);
        assert!(text.contains('•'));
    }
}
