//! # Game Implementations Module
//!
//! Each game implements the [`crate::GameState`] trait: move generation and
//! validation, pure state transitions that report events, and terminal state
//! detection.
//!
//! ## Supported Games
//! - **Dots & Boxes**: 2-4 players claim boxes by drawing their fourth side; scoring keeps the turn
//! - **Hex**: two players race to link opposite sides of a rhombus of hexagons
//! - **Mastermind**: a solo codebreaker deduces a hidden colour code from peg feedback
//!
//! ## Adding New Games
//! To add a new game, create a new module and implement:
//! 1. A move type with `Display` and `FromStr`
//! 2. An event type describing what an accepted move changed
//! 3. A state type implementing `GameState`
//! 4. A variant in `game_wrapper`

pub mod dots_and_boxes;
pub mod hex;
pub mod mastermind;
