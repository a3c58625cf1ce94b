//! # Opponent Driver - Delayed Computer Moves
//!
//! Plays the computer's seat a short while after it becomes its turn so a
//! human can follow what happened. The pending move runs as a tokio task that
//! sleeps, then locks the shared controller and submits its move against the
//! version it was scheduled for. A reset or any other move in between makes
//! the submission stale and it is dropped.
//!
//! Applied moves are reported on an unbounded channel so the front end can
//! render them when it next polls.

use crate::game_controller::{GameController, MoveOutcome};
use crate::game_wrapper::GameWrapper;
use crate::GameState;
use parking_lot::Mutex;
use rand_xoshiro::Xoshiro256PlusPlus;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Controller shared between the front end and the driver
pub type SharedController = Arc<Mutex<GameController>>;

/// Schedules and cancels the computer's moves
pub struct OpponentDriver {
    controller: SharedController,
    rng: Arc<Mutex<Xoshiro256PlusPlus>>,
    delay: Duration,
    tx: UnboundedSender<MoveOutcome>,
    pending: Option<JoinHandle<()>>,
}

impl OpponentDriver {
    /// Creates a driver and the receiver its applied moves arrive on
    pub fn new(
        controller: SharedController,
        delay: Duration,
        rng: Xoshiro256PlusPlus,
    ) -> (Self, UnboundedReceiver<MoveOutcome>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let driver = Self {
            controller,
            rng: Arc::new(Mutex::new(rng)),
            delay,
            tx,
            pending: None,
        };
        (driver, rx)
    }

    pub fn controller(&self) -> &SharedController {
        &self.controller
    }

    /// Starts the computer's turn if it is the computer's turn
    ///
    /// Must be called from within a tokio runtime. Replaces any move already
    /// pending. Returns whether a move was scheduled.
    pub fn schedule(&mut self) -> bool {
        self.cancel();

        let version = {
            let controller = self.controller.lock();
            if !controller.get_render_state().is_computer_turn() {
                return false;
            }
            controller.version()
        };

        debug!(version, delay_ms = self.delay.as_millis() as u64, "opponent move scheduled");
        self.pending = Some(tokio::spawn(play_turns(
            Arc::clone(&self.controller),
            Arc::clone(&self.rng),
            self.tx.clone(),
            self.delay,
            version,
        )));
        true
    }

    /// Drops the pending move, if any
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            if !handle.is_finished() {
                debug!("pending opponent move cancelled");
            }
            handle.abort();
        }
    }

    /// True while a scheduled move has not run yet
    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Cancels the pending move and starts a new game
    pub fn reset(&mut self, new_state: GameWrapper) {
        self.cancel();
        self.controller.lock().reset(new_state);
    }
}

impl Drop for OpponentDriver {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Plays computer moves until the turn passes back or the game ends
async fn play_turns(
    controller: SharedController,
    rng: Arc<Mutex<Xoshiro256PlusPlus>>,
    tx: UnboundedSender<MoveOutcome>,
    delay: Duration,
    mut version: u64,
) {
    loop {
        tokio::time::sleep(delay).await;

        let (outcome, again) = {
            let mut controller = controller.lock();
            if controller.version() != version {
                warn!(
                    scheduled = version,
                    current = controller.version(),
                    "stale opponent move discarded"
                );
                return;
            }

            let state = controller.get_render_state();
            let player = state.get_current_player();
            let Some(mv) = state.choose_opponent_move(&mut *rng.lock()) else {
                return;
            };
            match controller.try_make_move_as(player, version, mv) {
                Ok(outcome) => (outcome, controller.get_render_state().is_computer_turn()),
                Err(err) => {
                    warn!(%err, "opponent move rejected");
                    return;
                }
            }
        };

        version = outcome.version;
        if tx.send(outcome).is_err() || !again {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DotsAndBoxesConfig;
    use crate::games::dots_and_boxes::{DotsAndBoxesState, DotsMove};
    use crate::game_wrapper::MoveWrapper;
    use crate::opponent::seeded_rng;
    use crate::GameStatus;

    const DELAY: Duration = Duration::from_millis(600);

    fn dots(rows: usize, cols: usize) -> GameWrapper {
        GameWrapper::DotsAndBoxes(
            DotsAndBoxesState::new(&DotsAndBoxesConfig {
                rows,
                cols,
                players: 2,
                vs_computer: true,
            })
            .unwrap(),
        )
    }

    fn shared(state: GameWrapper) -> SharedController {
        Arc::new(Mutex::new(GameController::new(state)))
    }

    fn human(controller: &SharedController, mv: DotsMove) {
        controller
            .lock()
            .try_make_move(MoveWrapper::DotsAndBoxes(mv))
            .unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_move_applied_after_delay() {
        let controller = shared(dots(2, 2));
        human(&controller, DotsMove::horizontal(0, 0));

        let (mut driver, mut rx) = OpponentDriver::new(controller.clone(), DELAY, seeded_rng(Some(1)));
        let start = tokio::time::Instant::now();
        assert!(driver.schedule());
        assert!(driver.is_pending());
        assert_eq!(controller.lock().move_count(), 1);

        let outcome = rx.recv().await.unwrap();
        assert!(start.elapsed() >= DELAY);
        assert_eq!(outcome.player, 2);
        assert_eq!(outcome.version, 2);
        assert_eq!(controller.lock().move_count(), 2);
        assert_eq!(controller.lock().get_current_player(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_not_scheduled_on_human_turn() {
        let controller = shared(dots(2, 2));
        let (mut driver, _rx) = OpponentDriver::new(controller, DELAY, seeded_rng(Some(1)));
        assert!(!driver.schedule());
        assert!(!driver.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_prevents_pending_move() {
        let controller = shared(dots(2, 2));
        human(&controller, DotsMove::horizontal(0, 0));

        let (mut driver, mut rx) = OpponentDriver::new(controller.clone(), DELAY, seeded_rng(Some(1)));
        assert!(driver.schedule());
        driver.reset(dots(2, 2));
        assert!(!driver.is_pending());

        tokio::time::sleep(DELAY * 3).await;
        assert_eq!(controller.lock().move_count(), 0);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_move_discarded() {
        let controller = shared(dots(2, 2));
        human(&controller, DotsMove::horizontal(0, 0));

        let (mut driver, mut rx) = OpponentDriver::new(controller.clone(), DELAY, seeded_rng(Some(1)));
        assert!(driver.schedule());

        // Reset behind the driver's back
        controller.lock().reset(dots(2, 2));

        tokio::time::sleep(DELAY * 3).await;
        assert_eq!(controller.lock().move_count(), 0);
        assert_eq!(controller.lock().get_current_player(), 1);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_keeps_moving_after_capture() {
        // 1x2 board: box (0,0) has three sides, box (0,1) has top and bottom
        let controller = shared(dots(1, 2));
        for mv in [
            DotsMove::horizontal(0, 0),
            DotsMove::vertical(0, 0),
            DotsMove::horizontal(1, 0),
            DotsMove::horizontal(0, 1),
            DotsMove::horizontal(1, 1),
        ] {
            human(&controller, mv);
        }
        assert_eq!(controller.lock().get_current_player(), 2);

        let (mut driver, mut rx) = OpponentDriver::new(controller.clone(), DELAY, seeded_rng(Some(4)));
        assert!(driver.schedule());

        let first = rx.recv().await.unwrap();
        assert_eq!(first.move_made, MoveWrapper::DotsAndBoxes(DotsMove::vertical(0, 1)));
        assert_eq!(first.status, GameStatus::InProgress);

        let second = rx.recv().await.unwrap();
        assert_eq!(second.move_made, MoveWrapper::DotsAndBoxes(DotsMove::vertical(0, 2)));
        assert_eq!(second.player, 2);
        assert_eq!(second.status, GameStatus::Win(2));
    }
}
