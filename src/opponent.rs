//! # Computer Opponents
//!
//! Move pickers that play a [`GameState`] from the current player's seat. The
//! random source is always passed in so seeded runs are reproducible.

use crate::games::dots_and_boxes::{DotsAndBoxesState, DotsMove};
use crate::GameState;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use tracing::debug;

/// Chooses a move for whoever is to play in `state`
pub trait Opponent<S: GameState> {
    /// Returns `None` only when there is nothing legal to play
    fn choose_move<R: Rng + ?Sized>(&self, state: &S, rng: &mut R) -> Option<S::Move>;
}

/// Builds the generator used by opponents and secret generation
///
/// A fixed seed gives reproducible games; otherwise the generator is seeded
/// from the thread-local entropy source.
pub fn seeded_rng(seed: Option<u64>) -> Xoshiro256PlusPlus {
    match seed {
        Some(s) => Xoshiro256PlusPlus::seed_from_u64(s),
        None => Xoshiro256PlusPlus::from_rng(&mut rand::rng()),
    }
}

fn pick<T: Clone, R: Rng + ?Sized>(items: &[T], rng: &mut R) -> Option<T> {
    if items.is_empty() {
        None
    } else {
        Some(items[rng.random_range(0..items.len())].clone())
    }
}

/// Plays a uniformly random legal move
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomOpponent;

impl<S: GameState> Opponent<S> for RandomOpponent {
    fn choose_move<R: Rng + ?Sized>(&self, state: &S, rng: &mut R) -> Option<S::Move> {
        pick(&state.get_possible_moves(), rng)
    }
}

/// Which rule of the greedy opponent produced a move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GreedyTier {
    /// Completes at least one box
    Capture,
    /// Leaves no box with exactly three sides
    Safe,
    /// Nothing safe was left
    Forced,
}

/// One-ply Dots & Boxes heuristic
///
/// 1. Take the first edge (in move order) that completes a box.
/// 2. Otherwise pick at random among edges that leave no three-sided box.
/// 3. Otherwise pick at random among all legal edges.
///
/// It does not reason about chains, so a player willing to sacrifice boxes
/// can beat it.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyBoxOpponent;

impl GreedyBoxOpponent {
    /// Chooses a move and reports which rule chose it
    pub fn choose_with_tier<R: Rng + ?Sized>(
        &self,
        state: &DotsAndBoxesState,
        rng: &mut R,
    ) -> Option<(DotsMove, GreedyTier)> {
        let moves = state.get_possible_moves();
        if moves.is_empty() {
            return None;
        }

        if let Some(mv) = moves.iter().find(|mv| state.boxes_completed_by(mv) > 0) {
            return Some((*mv, GreedyTier::Capture));
        }

        let player = state.get_current_player();
        let safe: Vec<DotsMove> = moves
            .iter()
            .copied()
            .filter(|mv| {
                state
                    .apply_edge(mv.kind, mv.row, mv.col, player)
                    .map(|(next, _)| next.count_boxes_with_sides(3) == 0)
                    .unwrap_or(false)
            })
            .collect();
        if let Some(mv) = pick(&safe, rng) {
            return Some((mv, GreedyTier::Safe));
        }

        pick(&moves, rng).map(|mv| (mv, GreedyTier::Forced))
    }
}

impl Opponent<DotsAndBoxesState> for GreedyBoxOpponent {
    fn choose_move<R: Rng + ?Sized>(&self, state: &DotsAndBoxesState, rng: &mut R) -> Option<DotsMove> {
        let (mv, tier) = self.choose_with_tier(state, rng)?;
        debug!(%mv, ?tier, player = state.get_current_player(), "greedy opponent chose edge");
        Some(mv)
    }
}
