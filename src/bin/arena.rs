//! # Self-Play Arena
//!
//! Plays many seeded games of every engine in parallel and checks the rules
//! that must hold for any sequence of legal moves. Exits non-zero if any check
//! fails, so it doubles as a regression harness.
//!
//! - Dots & Boxes: greedy opponent against random play; every box is scored
//! - Hex: random full boards have exactly one winner; random playouts end in a win
//! - Mastermind: a codebreaker guessing consistently with past feedback; every
//!   recorded feedback matches a rescoring against the revealed secret

use anyhow::{ensure, Context, Result};
use clap::Parser;
use colored::Colorize;
use parlor::config::{ArenaConfig, DotsAndBoxesConfig, HexConfig, MastermindConfig};
use parlor::games::dots_and_boxes::DotsAndBoxesState;
use parlor::games::hex::HexState;
use parlor::games::mastermind::{generate_secret, score, Guess, MastermindState};
use parlor::opponent::{seeded_rng, GreedyBoxOpponent, Opponent, RandomOpponent};
use parlor::{GameState, GameStatus, PlayerId};
use rand::seq::SliceRandom;
use rand::Rng;
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// Draws tried before the codebreaker settles for an inconsistent guess
const CONSISTENT_GUESS_TRIES: usize = 2_000;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Games per engine
    #[arg(long, default_value_t = 500)]
    games: u64,

    /// Worker threads (default: number of logical CPUs)
    #[arg(long)]
    threads: Option<usize>,

    /// Base seed; game `i` is played with seed `seed + i`
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// TOML configuration file with board sizes
    #[arg(long)]
    config: Option<PathBuf>,
}

/// Outcome of one greedy-vs-random Dots & Boxes game
struct DotsReport {
    greedy_seat: PlayerId,
    status: GameStatus,
    conserved: bool,
}

fn play_dots(config: &DotsAndBoxesConfig, seed: u64) -> Result<DotsReport> {
    let mut rng = seeded_rng(Some(seed));
    let greedy_seat = if seed % 2 == 0 { 1 } else { 2 };
    let mut state = DotsAndBoxesState::new(config)?;

    while !state.is_terminal() {
        let choice = if state.get_current_player() == greedy_seat {
            GreedyBoxOpponent.choose_move(&state, &mut rng)
        } else {
            RandomOpponent.choose_move(&state, &mut rng)
        };
        let mv = choice.context("no legal edge on an unfinished board")?;
        state = state.apply_move(&mv)?.0;
    }

    let total: usize = state.scores().iter().sum();
    let conserved = total == config.rows * config.cols;
    if !conserved {
        warn!(seed, total, "dots and boxes scores do not add up");
    }
    Ok(DotsReport {
        greedy_seat,
        status: state.status(),
        conserved,
    })
}

/// Outcome of one Hex check
struct HexReport {
    full_board_single_winner: bool,
    playout_moves: usize,
    playout_won: bool,
}

fn play_hex(config: &HexConfig, seed: u64) -> Result<HexReport> {
    let mut rng = seeded_rng(Some(seed));
    let n = config.size * config.size;

    // Alternate stones over a shuffled board
    let mut order: Vec<usize> = (0..n).collect();
    order.shuffle(&mut rng);
    let mut cells = vec![0; n];
    for (turn, &idx) in order.iter().enumerate() {
        cells[idx] = if turn % 2 == 0 { 1 } else { 2 };
    }
    let full = HexState::from_cells(config.size, cells)?;
    let full_board_single_winner = full.has_connection(1) != full.has_connection(2);
    if !full_board_single_winner {
        warn!(seed, "full hex board without exactly one winner");
    }

    let mut state = HexState::new(config)?;
    let mut playout_moves = 0;
    while !state.is_terminal() {
        let mv = RandomOpponent
            .choose_move(&state, &mut rng)
            .context("no empty cell on an unfinished board")?;
        state = state.apply_move(&mv)?.0;
        playout_moves += 1;
    }
    let playout_won = matches!(state.status(), GameStatus::Win(_)) && state.winning_path().is_some();

    Ok(HexReport {
        full_board_single_winner,
        playout_moves,
        playout_won,
    })
}

/// Outcome of one Mastermind game
struct MastermindReport {
    solved: bool,
    attempts: usize,
    feedback_consistent: bool,
}

fn consistent_guess<R: Rng + ?Sized>(state: &MastermindState, rng: &mut R) -> Guess {
    let config = state.config();
    let mut guess = Guess(generate_secret(config, rng));
    for _ in 0..CONSISTENT_GUESS_TRIES {
        let fits = state
            .history()
            .iter()
            .all(|record| score(&guess.0, &record.guess.0) == record.feedback);
        if fits {
            break;
        }
        guess = Guess(generate_secret(config, rng));
    }
    guess
}

fn play_mastermind(config: &MastermindConfig, seed: u64) -> Result<MastermindReport> {
    let mut rng = seeded_rng(Some(seed));
    let mut state = MastermindState::new(config, &mut rng)?;

    while !state.is_terminal() {
        let guess = consistent_guess(&state, &mut rng);
        state = state.apply_move(&guess)?.0;
    }

    let secret = state
        .revealed_secret()
        .context("finished game did not reveal its secret")?;
    let feedback_consistent = state.history().iter().all(|record| {
        let fb = record.feedback;
        fb.exact + fb.partial <= config.code_length
            && fb == score(&record.guess.0, secret)
            && (fb.exact == config.code_length) == (record.guess.0 == secret)
    });
    if !feedback_consistent {
        warn!(seed, "mastermind feedback disagrees with the secret");
    }
    debug!(seed, attempts = state.attempts(), solved = state.is_won(), "mastermind game finished");

    Ok(MastermindReport {
        solved: state.is_won(),
        attempts: state.attempts(),
        feedback_consistent,
    })
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        100.0 * part as f64 / whole as f64
    }
}

fn verdict(failures: usize) -> colored::ColoredString {
    if failures == 0 {
        "ok".green().bold()
    } else {
        format!("{} FAILED", failures).red().bold()
    }
}

fn summarize_dots(config: &DotsAndBoxesConfig, reports: &[DotsReport], elapsed: Duration) -> usize {
    let greedy_wins = reports
        .iter()
        .filter(|r| r.status == GameStatus::Win(r.greedy_seat))
        .count();
    let draws = reports
        .iter()
        .filter(|r| matches!(r.status, GameStatus::Draw(_)))
        .count();
    let random_wins = reports.len() - greedy_wins - draws;
    let failures = reports.iter().filter(|r| !r.conserved).count();

    println!(
        "\n{} {}x{} ({} games, {:.2?})",
        "Dots & Boxes".bold(),
        config.rows,
        config.cols,
        reports.len(),
        elapsed
    );
    println!("  greedy wins:  {:>5} ({:.1}%)", greedy_wins, percent(greedy_wins, reports.len()));
    println!("  random wins:  {:>5} ({:.1}%)", random_wins, percent(random_wins, reports.len()));
    println!("  draws:        {:>5} ({:.1}%)", draws, percent(draws, reports.len()));
    println!("  every box scored: {}", verdict(failures));
    failures
}

fn summarize_hex(config: &HexConfig, reports: &[HexReport], elapsed: Duration) -> usize {
    let single = reports.iter().filter(|r| !r.full_board_single_winner).count();
    let unwon = reports.iter().filter(|r| !r.playout_won).count();
    let moves: usize = reports.iter().map(|r| r.playout_moves).sum();

    println!(
        "\n{} {}x{} ({} games, {:.2?})",
        "Hex".bold(),
        config.size,
        config.size,
        reports.len(),
        elapsed
    );
    println!(
        "  average playout length: {:.1} stones",
        moves as f64 / reports.len().max(1) as f64
    );
    println!("  full boards have one winner: {}", verdict(single));
    println!("  playouts end in a win:       {}", verdict(unwon));
    single + unwon
}

fn summarize_mastermind(config: &MastermindConfig, reports: &[MastermindReport], elapsed: Duration) -> usize {
    let solved: Vec<&MastermindReport> = reports.iter().filter(|r| r.solved).collect();
    let failures = reports.iter().filter(|r| !r.feedback_consistent).count();
    let attempts: usize = solved.iter().map(|r| r.attempts).sum();

    println!(
        "\n{} {} colours, length {}, {} attempts ({} games, {:.2?})",
        "Mastermind".bold(),
        config.palette_size,
        config.code_length,
        config.max_attempts,
        reports.len(),
        elapsed
    );
    println!(
        "  solved: {:>5} ({:.1}%), {:.2} guesses on average",
        solved.len(),
        percent(solved.len(), reports.len()),
        attempts as f64 / solved.len().max(1) as f64
    );
    println!("  feedback matches the secret: {}", verdict(failures));
    failures
}

/// Runs `play` for every seed on the pool, collecting reports in seed order
fn run_batch<T, F>(pool: &rayon::ThreadPool, args: &Args, play: F) -> Result<(Vec<T>, Duration)>
where
    T: Send,
    F: Fn(u64) -> Result<T> + Sync,
{
    let start = Instant::now();
    let reports = pool.install(|| {
        (0..args.games)
            .into_par_iter()
            .map(|i| play(args.seed.wrapping_add(i)))
            .collect::<Result<Vec<T>>>()
    })?;
    Ok((reports, start.elapsed()))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => ArenaConfig::load(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => ArenaConfig::default(),
    };
    let threads = args.threads.unwrap_or_else(num_cpus::get).max(1);
    let pool = ThreadPoolBuilder::new().num_threads(threads).build()?;

    let dots_config = DotsAndBoxesConfig {
        players: 2,
        vs_computer: false,
        ..config.dots_and_boxes.clone()
    };
    dots_config.validate()?;

    println!("{}", "Parlor Games - Self-Play Arena".bold());
    println!("====================================");
    println!("Games per engine: {}", args.games);
    println!("Threads: {}", threads);
    println!("Base seed: {}", args.seed);
    info!(games = args.games, threads, seed = args.seed, "arena starting");

    #[cfg(debug_assertions)]
    println!("{}", "WARNING: debug build, expect lower throughput.".yellow());

    let (dots, elapsed) = run_batch(&pool, &args, |seed| play_dots(&dots_config, seed))?;
    let mut failures = summarize_dots(&dots_config, &dots, elapsed);

    let (hex, elapsed) = run_batch(&pool, &args, |seed| play_hex(&config.hex, seed))?;
    failures += summarize_hex(&config.hex, &hex, elapsed);

    let (mastermind, elapsed) = run_batch(&pool, &args, |seed| play_mastermind(&config.mastermind, seed))?;
    failures += summarize_mastermind(&config.mastermind, &mastermind, elapsed);

    println!();
    ensure!(failures == 0, "{} invariant check(s) failed", failures);
    println!("{}", "All invariants held.".green().bold());
    Ok(())
}
