//! # Mastermind Game Implementation
//!
//! A solo code-breaking game. The engine hides a sequence of coloured pegs and
//! scores every guess with exact pegs (right colour, right place) and partial
//! pegs (right colour, wrong place).
//!
//! ## Rules
//! - The secret has `code_length` pegs drawn uniformly, with repetition, from
//!   the first `palette_size` colours
//! - Each guess must have exactly `code_length` pegs from the palette
//! - The game is won when a guess scores `code_length` exact pegs and lost
//!   when `max_attempts` guesses have been used without that

use crate::config::MastermindConfig;
use crate::error::{ConfigError, GameError, MoveError};
use crate::{GameState, GameStatus, PlayerId};
use parlor_shared::{exact_matches, multiset_overlap};
use rand::Rng;
use std::fmt;
use std::str::FromStr;

/// The solo codebreaker
pub const CODEBREAKER: PlayerId = 1;

/// Largest guess space `get_possible_moves` will enumerate
const ENUMERATION_LIMIT: usize = 4096;

/// Peg colours; a palette of size K uses the first K
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub enum Color {
    Red,
    Blue,
    Green,
    Yellow,
    Orange,
    Purple,
    White,
    Black,
}

impl Color {
    pub const ALL: [Color; 8] = [
        Color::Red,
        Color::Blue,
        Color::Green,
        Color::Yellow,
        Color::Orange,
        Color::Purple,
        Color::White,
        Color::Black,
    ];

    /// Position of the colour in [`Color::ALL`]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Color::Red => "red",
            Color::Blue => "blue",
            Color::Green => "green",
            Color::Yellow => "yellow",
            Color::Orange => "orange",
            Color::Purple => "purple",
            Color::White => "white",
            Color::Black => "black",
        }
    }

    /// Single-letter shorthand; black is `k`
    pub fn initial(self) -> char {
        match self {
            Color::Black => 'k',
            other => other.name().as_bytes()[0] as char,
        }
    }

    fn from_initial(c: char) -> Option<Color> {
        Color::ALL
            .iter()
            .copied()
            .find(|col| col.initial() == c.to_ascii_lowercase())
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        Color::ALL
            .iter()
            .copied()
            .find(|c| c.name() == s)
            .or_else(|| {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Color::from_initial(c),
                    _ => None,
                }
            })
            .ok_or_else(|| format!("unknown colour `{}`", s))
    }
}

/// Represents a move in Mastermind: one full guess
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Guess(pub Vec<Color>);

impl fmt::Display for Guess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.0.iter().map(|c| c.name()).collect();
        write!(f, "{}", names.join(" "))
    }
}

impl FromStr for Guess {
    type Err = String;

    /// Parses colour names or initials separated by spaces/commas, or a run of initials
    ///
    /// # Examples
    /// ```
    /// use std::str::FromStr;
    /// use parlor::games::mastermind::{Color, Guess};
    /// let g = Guess::from_str("rbgy").unwrap();
    /// assert_eq!(g.0, vec![Color::Red, Color::Blue, Color::Green, Color::Yellow]);
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tokens: Vec<&str> = s
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|t| !t.is_empty())
            .collect();
        if tokens.len() == 1 && tokens[0].len() > 1 && Color::from_str(tokens[0]).is_err() {
            return tokens[0]
                .chars()
                .map(|c| Color::from_initial(c).ok_or_else(|| format!("unknown colour `{}`", c)))
                .collect::<Result<Vec<_>, _>>()
                .map(Guess);
        }
        tokens
            .into_iter()
            .map(Color::from_str)
            .collect::<Result<Vec<_>, _>>()
            .map(Guess)
    }
}

/// Exact and partial peg counts for a guess
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct Feedback {
    pub exact: usize,
    pub partial: usize,
}

impl fmt::Display for Feedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} exact, {} partial", self.exact, self.partial)
    }
}

/// Scores `guess` against `secret`
///
/// `partial` counts colour matches under multiset intersection minus the
/// exact matches, so duplicated colours are never double counted.
pub fn score(guess: &[Color], secret: &[Color]) -> Feedback {
    let g: Vec<usize> = guess.iter().map(|c| c.index()).collect();
    let s: Vec<usize> = secret.iter().map(|c| c.index()).collect();
    let exact = exact_matches(&g, &s);
    let overlap = multiset_overlap(&g, &s);
    Feedback {
        exact,
        partial: overlap - exact,
    }
}

/// Draws a fresh secret, each peg uniform over the palette
pub fn generate_secret<R: Rng + ?Sized>(config: &MastermindConfig, rng: &mut R) -> Vec<Color> {
    (0..config.code_length)
        .map(|_| Color::ALL[rng.random_range(0..config.palette_size)])
        .collect()
}

/// One scored guess in the history
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GuessRecord {
    pub guess: Guess,
    pub feedback: Feedback,
}

/// What happened when a guess was submitted
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MastermindEvent {
    Scored { attempt: usize, feedback: Feedback },
    Solved { attempts: usize },
    OutOfAttempts { secret: Vec<Color> },
}

/// Represents the complete state of a Mastermind game
#[derive(Clone, PartialEq, Eq)]
pub struct MastermindState {
    config: MastermindConfig,
    secret: Vec<Color>,
    history: Vec<GuessRecord>,
    won: bool,
    game_over: bool,
}

// Keep the secret out of logs and debug output
impl fmt::Debug for MastermindState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MastermindState")
            .field("config", &self.config)
            .field("history", &self.history)
            .field("won", &self.won)
            .field("game_over", &self.game_over)
            .finish_non_exhaustive()
    }
}

impl MastermindState {
    /// Starts a game with a freshly drawn secret
    pub fn new<R: Rng + ?Sized>(config: &MastermindConfig, rng: &mut R) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config: config.clone(),
            secret: generate_secret(config, rng),
            history: Vec::new(),
            won: false,
            game_over: false,
        })
    }

    /// Starts a game with a known secret
    pub fn with_secret(config: &MastermindConfig, secret: Vec<Color>) -> Result<Self, GameError> {
        config.validate()?;
        check_guess(config, &secret)?;
        Ok(Self {
            config: config.clone(),
            secret,
            history: Vec::new(),
            won: false,
            game_over: false,
        })
    }

    pub fn config(&self) -> &MastermindConfig {
        &self.config
    }

    /// Colours available in this game
    pub fn palette(&self) -> &'static [Color] {
        &Color::ALL[..self.config.palette_size]
    }

    pub fn history(&self) -> &[GuessRecord] {
        &self.history
    }

    pub fn attempts(&self) -> usize {
        self.history.len()
    }

    pub fn remaining_attempts(&self) -> usize {
        self.config.max_attempts - self.history.len()
    }

    pub fn is_won(&self) -> bool {
        self.won
    }

    /// The secret, but only once the game is over
    pub fn revealed_secret(&self) -> Option<&[Color]> {
        if self.game_over {
            Some(&self.secret)
        } else {
            None
        }
    }

    /// Scores a guess and records it
    ///
    /// Refused guesses leave the history and attempt count untouched.
    pub fn submit_guess(&self, guess: &Guess) -> Result<Self, MoveError> {
        if self.game_over {
            return Err(MoveError::GameOver);
        }
        check_guess(&self.config, &guess.0)?;
        let feedback = score(&guess.0, &self.secret);
        let mut next = self.clone();
        next.history.push(GuessRecord {
            guess: guess.clone(),
            feedback,
        });
        next.won = feedback.exact == self.config.code_length;
        next.game_over = next.won || next.history.len() == self.config.max_attempts;
        Ok(next)
    }
}

fn check_guess(config: &MastermindConfig, pegs: &[Color]) -> Result<(), MoveError> {
    if pegs.len() != config.code_length {
        return Err(MoveError::WrongLength {
            expected: config.code_length,
            got: pegs.len(),
        });
    }
    if let Some(c) = pegs.iter().find(|c| c.index() >= config.palette_size) {
        return Err(MoveError::UnknownColor {
            color: c.name().to_string(),
            palette_size: config.palette_size,
        });
    }
    Ok(())
}

impl fmt::Display for MastermindState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, record) in self.history.iter().enumerate() {
            let pegs: String = record.guess.0.iter().map(|c| c.initial()).collect();
            writeln!(
                f,
                "{:>2}. {}  {}{}",
                i + 1,
                pegs,
                "●".repeat(record.feedback.exact),
                "○".repeat(record.feedback.partial)
            )?;
        }
        match self.revealed_secret() {
            Some(secret) => {
                let pegs: String = secret.iter().map(|c| c.initial()).collect();
                writeln!(f, "secret: {}", pegs)
            }
            None => writeln!(f, "{} attempts left", self.remaining_attempts()),
        }
    }
}

impl GameState for MastermindState {
    type Move = Guess;
    type Event = MastermindEvent;
    type Config = MastermindConfig;

    fn new_game<R: Rng + ?Sized>(config: &Self::Config, rng: &mut R) -> Result<Self, ConfigError> {
        Self::new(config, rng)
    }

    /// Enumerates every guess when the space is small; empty otherwise
    fn get_possible_moves(&self) -> Vec<Self::Move> {
        if self.game_over {
            return Vec::new();
        }
        let k = self.config.palette_size;
        let l = self.config.code_length;
        let total = match k.checked_pow(l as u32) {
            Some(t) if t <= ENUMERATION_LIMIT => t,
            _ => return Vec::new(),
        };
        (0..total)
            .map(|mut n| {
                let mut pegs = vec![Color::Red; l];
                for slot in pegs.iter_mut().rev() {
                    *slot = Color::ALL[n % k];
                    n /= k;
                }
                Guess(pegs)
            })
            .collect()
    }

    fn check_move(&self, mv: &Self::Move) -> Result<(), MoveError> {
        if self.game_over {
            return Err(MoveError::GameOver);
        }
        check_guess(&self.config, &mv.0)
    }

    fn apply_move(&self, mv: &Self::Move) -> Result<(Self, Vec<Self::Event>), MoveError> {
        let next = self.submit_guess(mv)?;
        let attempt = next.attempts();
        let feedback = next.history[attempt - 1].feedback;
        let mut events = vec![MastermindEvent::Scored { attempt, feedback }];
        if next.won {
            events.push(MastermindEvent::Solved { attempts: attempt });
        } else if next.game_over {
            events.push(MastermindEvent::OutOfAttempts {
                secret: next.secret.clone(),
            });
        }
        Ok((next, events))
    }

    fn get_current_player(&self) -> PlayerId {
        CODEBREAKER
    }

    fn get_num_players(&self) -> i32 {
        1
    }

    fn status(&self) -> GameStatus {
        if self.won {
            GameStatus::Win(CODEBREAKER)
        } else if self.game_over {
            GameStatus::Lost
        } else {
            GameStatus::InProgress
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;
    use Color::*;

    fn config(palette_size: usize, code_length: usize, max_attempts: usize) -> MastermindConfig {
        MastermindConfig {
            palette_size,
            code_length,
            max_attempts,
        }
    }

    #[test]
    fn test_regression_vector() {
        assert_eq!(
            score(&[Red, Red, Blue], &[Blue, Red, Red]),
            Feedback { exact: 1, partial: 2 }
        );
    }

    #[test]
    fn test_duplicates_not_double_counted() {
        assert_eq!(
            score(&[Red, Red, Red, Red], &[Red, Blue, Green, Yellow]),
            Feedback { exact: 1, partial: 0 }
        );
        assert_eq!(
            score(&[Blue, Red, Red, Red], &[Red, Blue, Blue, Green]),
            Feedback { exact: 0, partial: 2 }
        );
    }

    #[test]
    fn test_secret_scores_itself() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(3);
        for _ in 0..100 {
            let secret = generate_secret(&config(8, 6, 10), &mut rng);
            assert_eq!(score(&secret, &secret), Feedback { exact: 6, partial: 0 });
        }
    }

    #[test]
    fn test_feedback_never_exceeds_length() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(4);
        let cfg = config(4, 5, 10);
        for _ in 0..500 {
            let a = generate_secret(&cfg, &mut rng);
            let b = generate_secret(&cfg, &mut rng);
            let fb = score(&a, &b);
            assert!(fb.exact + fb.partial <= 5);
            assert_eq!(fb, score(&b, &a));
        }
    }

    #[test]
    fn test_secret_uses_palette_only() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(9);
        let cfg = config(3, 8, 10);
        for _ in 0..50 {
            assert!(generate_secret(&cfg, &mut rng).iter().all(|c| c.index() < 3));
        }
    }

    #[test]
    fn test_win_ends_game() {
        let game = MastermindState::with_secret(&config(6, 4, 10), vec![Red, Blue, Green, Yellow]).unwrap();
        let (game, events) = game.apply_move(&Guess(vec![Red, Blue, Yellow, Green])).unwrap();
        assert_eq!(events, vec![MastermindEvent::Scored {
            attempt: 1,
            feedback: Feedback { exact: 2, partial: 2 },
        }]);
        assert!(game.revealed_secret().is_none());

        let (game, events) = game.apply_move(&Guess(vec![Red, Blue, Green, Yellow])).unwrap();
        assert!(events.contains(&MastermindEvent::Solved { attempts: 2 }));
        assert_eq!(game.status(), GameStatus::Win(CODEBREAKER));
        assert_eq!(game.revealed_secret(), Some(&[Red, Blue, Green, Yellow][..]));
    }

    #[test]
    fn test_exhausted_attempts() {
        let game = MastermindState::with_secret(&config(6, 2, 2), vec![Red, Red]).unwrap();
        let guess = Guess(vec![Blue, Blue]);
        let game = game.submit_guess(&guess).unwrap();
        assert_eq!(game.status(), GameStatus::InProgress);
        let (game, events) = game.apply_move(&guess).unwrap();
        assert_eq!(game.status(), GameStatus::Lost);
        assert_eq!(
            events.last(),
            Some(&MastermindEvent::OutOfAttempts { secret: vec![Red, Red] })
        );
    }

    #[test]
    fn test_guess_after_game_over_is_noop() {
        let game = MastermindState::with_secret(&config(6, 2, 1), vec![Red, Red]).unwrap();
        let game = game.submit_guess(&Guess(vec![Red, Red])).unwrap();
        let snapshot = game.clone();
        assert_eq!(game.submit_guess(&Guess(vec![Blue, Red])), Err(MoveError::GameOver));
        assert_eq!(game.attempts(), 1);
        assert_eq!(game.history(), snapshot.history());
        assert!(!game.is_legal(&Guess(vec![Blue, Red])));
    }

    #[test]
    fn test_invalid_guesses() {
        let game = MastermindState::with_secret(&config(4, 3, 5), vec![Red, Blue, Green]).unwrap();
        assert_eq!(
            game.submit_guess(&Guess(vec![Red, Blue])),
            Err(MoveError::WrongLength { expected: 3, got: 2 })
        );
        assert!(matches!(
            game.submit_guess(&Guess(vec![Red, Blue, Black])),
            Err(MoveError::UnknownColor { .. })
        ));
        assert_eq!(game.attempts(), 0);
    }

    #[test]
    fn test_with_secret_rejects_bad_secret() {
        assert!(MastermindState::with_secret(&config(2, 2, 5), vec![Red, Green]).is_err());
        assert!(MastermindState::with_secret(&config(2, 2, 5), vec![Red]).is_err());
    }

    #[test]
    fn test_possible_moves_enumeration() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
        let game = MastermindState::new(&config(3, 2, 5), &mut rng).unwrap();
        let moves = game.get_possible_moves();
        assert_eq!(moves.len(), 9);
        assert_eq!(moves[0], Guess(vec![Red, Red]));
        assert_eq!(moves[8], Guess(vec![Green, Green]));
        assert!(moves.iter().all(|m| game.is_legal(m)));

        let big = MastermindState::new(&config(8, 8, 5), &mut rng).unwrap();
        assert!(big.get_possible_moves().is_empty());
    }

    #[test]
    fn test_parse_guess() {
        assert_eq!(Guess::from_str("red, blue green").unwrap(), Guess(vec![Red, Blue, Green]));
        assert_eq!(Guess::from_str("rk").unwrap(), Guess(vec![Red, Black]));
        assert_eq!(Guess::from_str("r b").unwrap(), Guess(vec![Red, Blue]));
        assert_eq!(Guess::from_str("red").unwrap(), Guess(vec![Red]));
        assert!(Guess::from_str("rz").is_err());
    }

    #[test]
    fn test_debug_hides_secret() {
        let game = MastermindState::with_secret(&config(6, 2, 3), vec![Purple, Purple]).unwrap();
        assert!(!format!("{:?}", game).contains("Purple"));
    }
}
