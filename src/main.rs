//! # Parlor Games - Terminal Front End
//!
//! Plays one of the rule engines on stdin/stdout. Moves are typed one per
//! line in the notation each game's move type parses; in Dots & Boxes against
//! the computer, the computer answers after a short delay.
//!
//! ## Usage
//! ```text
//! play dots --rows 4 --cols 4
//! play hex --size 9
//! play mastermind --colors 6 --length 4 --seed 7
//! ```
//! Set `RUST_LOG=debug` to see every accepted move on stderr.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use parking_lot::Mutex;
use parlor::config::ArenaConfig;
use parlor::game_controller::{GameController, MoveOutcome};
use parlor::game_wrapper::{GameKind, GameWrapper};
use parlor::opponent::seeded_rng;
use parlor::opponent_driver::{OpponentDriver, SharedController};
use parlor::GameState;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum GameArg {
    Dots,
    Hex,
    Mastermind,
}

impl From<GameArg> for GameKind {
    fn from(arg: GameArg) -> Self {
        match arg {
            GameArg::Dots => GameKind::DotsAndBoxes,
            GameArg::Hex => GameKind::Hex,
            GameArg::Mastermind => GameKind::Mastermind,
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Game to play
    #[arg(value_enum)]
    game: GameArg,

    /// TOML configuration file; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Dots & Boxes: rows of boxes
    #[arg(long)]
    rows: Option<usize>,

    /// Dots & Boxes: columns of boxes
    #[arg(long)]
    cols: Option<usize>,

    /// Dots & Boxes: number of players sharing the terminal
    #[arg(long)]
    players: Option<usize>,

    /// Dots & Boxes: every seat is played from the keyboard
    #[arg(long, default_value_t = false, action = clap::ArgAction::SetTrue)]
    no_computer: bool,

    /// Hex: board side length
    #[arg(long)]
    size: Option<usize>,

    /// Mastermind: number of colours in play
    #[arg(long)]
    colors: Option<usize>,

    /// Mastermind: pegs per code
    #[arg(long)]
    length: Option<usize>,

    /// Mastermind: guesses allowed
    #[arg(long)]
    attempts: Option<usize>,

    /// Seed for the secret code and the computer opponent
    #[arg(long)]
    seed: Option<u64>,

    /// Computer thinking delay (milliseconds)
    #[arg(long)]
    delay_ms: Option<u64>,
}

impl Args {
    /// Loads the configuration file, if any, and applies flag overrides
    fn resolve_config(&self) -> Result<ArenaConfig> {
        let mut config = match &self.config {
            Some(path) => ArenaConfig::load(path)
                .with_context(|| format!("failed to load {}", path.display()))?,
            None => ArenaConfig::default(),
        };

        let dots = &mut config.dots_and_boxes;
        if let Some(rows) = self.rows {
            dots.rows = rows;
        }
        if let Some(cols) = self.cols {
            dots.cols = cols;
        }
        if let Some(players) = self.players {
            dots.players = players;
        }
        if self.no_computer {
            dots.vs_computer = false;
        }
        if let Some(size) = self.size {
            config.hex.size = size;
        }
        if let Some(colors) = self.colors {
            config.mastermind.palette_size = colors;
        }
        if let Some(length) = self.length {
            config.mastermind.code_length = length;
        }
        if let Some(attempts) = self.attempts {
            config.mastermind.max_attempts = attempts;
        }
        if self.seed.is_some() {
            config.opponent.seed = self.seed;
        }
        if let Some(delay_ms) = self.delay_ms {
            config.opponent.delay_ms = delay_ms;
        }

        config.validate().context("invalid configuration")?;
        Ok(config)
    }
}

enum Flow {
    Continue,
    Quit,
}

/// Terminal session state
struct Session {
    kind: GameKind,
    config: ArenaConfig,
    rng: Xoshiro256PlusPlus,
    controller: SharedController,
    driver: OpponentDriver,
}

impl Session {
    fn new_state(&mut self) -> Result<GameWrapper> {
        let state = GameWrapper::new_game(&self.kind.config_from(&self.config), &mut self.rng)?;
        Ok(state)
    }

    fn print_board(&self) {
        let controller = self.controller.lock();
        println!("\n{}", controller.get_render_state());
        let status = controller.get_status();
        if status.is_game_over() {
            println!("{} {}", "Result:".bold(), status.to_string().green().bold());
            println!("Type {} to play again.", "new".cyan());
        }
    }

    fn print_outcome(&self, outcome: &MoveOutcome, computer: bool) {
        let who = if computer {
            "Computer".yellow().bold()
        } else {
            format!("Player {}", outcome.player).normal()
        };
        println!("{} played {}", who, outcome.move_made);
        for event in &outcome.events {
            println!("  {}", event.to_string().dimmed());
        }
    }

    fn print_moves(&self) {
        let controller = self.controller.lock();
        match controller.get_render_state() {
            GameWrapper::Mastermind(game) => {
                let palette: Vec<String> = game.palette().iter().map(|c| c.to_string()).collect();
                println!(
                    "Guess {} colours from: {}",
                    game.config().code_length,
                    palette.join(" ")
                );
            }
            state => {
                let moves: Vec<String> = controller
                    .get_legal_moves()
                    .iter()
                    .map(|m| m.to_string())
                    .collect();
                println!("{} legal moves for {}:", moves.len(), state.kind());
                println!("{}", moves.join("  "));
            }
        }
    }

    fn handle_line(&mut self, line: &str) -> Result<Flow> {
        match line {
            "" => {}
            "quit" | "exit" | "q" => return Ok(Flow::Quit),
            "help" => print_help(self.kind),
            "history" => println!("{}", self.controller.lock().format_history()),
            "moves" => self.print_moves(),
            "new" => {
                let state = self.new_state()?;
                self.driver.reset(state);
                info!(game = %self.kind, "new game");
                self.print_board();
            }
            text => self.play(text),
        }
        Ok(Flow::Continue)
    }

    fn play(&mut self, text: &str) {
        let result = {
            let mut controller = self.controller.lock();
            let state = controller.get_render_state();
            if state.is_terminal() {
                println!("{}", "The game is over. Type new to play again.".red());
                return;
            }
            if state.is_computer_turn() {
                println!("{}", "Wait for the computer to move.".red());
                return;
            }
            let mv = match state.parse_move(text) {
                Ok(mv) => mv,
                Err(message) => {
                    println!("{} {}", "Could not read move:".red(), message);
                    return;
                }
            };
            controller.try_make_move(mv)
        };

        match result {
            Ok(outcome) => {
                self.print_outcome(&outcome, false);
                self.print_board();
                if self.driver.schedule() {
                    println!("{}", "Computer is thinking...".yellow());
                }
            }
            Err(err) => println!("{} {}", "Illegal move:".red(), err),
        }
    }
}

fn print_help(kind: GameKind) {
    let notation = match kind {
        GameKind::DotsAndBoxes => "h ROW COL or v ROW COL (e.g. `h 0 2` draws the top edge of box (0,2))",
        GameKind::Hex => "ROW COL from 0, or column letter and row from 1 (e.g. `3 4` or `e4`)",
        GameKind::Mastermind => "colour names or initials (e.g. `red blue green yellow` or `rbgy`)",
    };
    println!("{} {}", "Moves:".bold(), notation);
    println!("{} new, moves, history, help, quit", "Commands:".bold());
}

fn prompt() -> Result<()> {
    print!("{} ", ">".cyan().bold());
    std::io::stdout().flush()?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = args.resolve_config()?;
    let kind = GameKind::from(args.game);

    let mut rng = seeded_rng(config.opponent.seed);
    let opponent_rng = Xoshiro256PlusPlus::from_rng(&mut rng);
    let state = GameWrapper::new_game(&kind.config_from(&config), &mut rng)?;
    let controller: SharedController = Arc::new(Mutex::new(GameController::new(state)));
    let (driver, mut outcomes) = OpponentDriver::new(
        Arc::clone(&controller),
        Duration::from_millis(config.opponent.delay_ms),
        opponent_rng,
    );

    let mut session = Session {
        kind,
        config,
        rng,
        controller,
        driver,
    };

    info!(game = %kind, "starting");
    println!("{}", format!("=== {} ===", kind).bold());
    print_help(kind);
    session.print_board();
    prompt()?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if let Flow::Quit = session.handle_line(line.trim())? {
                    break;
                }
                prompt()?;
            }
            Some(outcome) = outcomes.recv() => {
                println!();
                session.print_outcome(&outcome, true);
                session.print_board();
                prompt()?;
            }
        }
    }

    session.driver.cancel();
    Ok(())
}
