//! One-second tick source for the countdown preview

use std::{sync::Weak, time::Duration};
use tokio::{
    task::JoinHandle,
    time::{interval_at, Instant},
};
use tracing::{debug, error};

use crate::state::AppState;

pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Owns the running tick task; dropping it cancels any pending tick
#[derive(Debug)]
pub struct TickerGuard {
    handle: JoinHandle<()>,
    generation: u64,
}

impl TickerGuard {
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for TickerGuard {
    fn drop(&mut self) {
        if !self.handle.is_finished() {
            debug!("Cancelling countdown ticker for generation {}", self.generation);
        }
        self.handle.abort();
    }
}

/// Spawn the background task that ticks a countdown once per second
///
/// The task holds only a weak reference so it never keeps the application
/// state alive, and it exits on its own once the session stops running.
pub fn spawn_countdown_ticker(state: Weak<AppState>, generation: u64) -> TickerGuard {
    let handle = tokio::spawn(async move {
        debug!("Countdown ticker started for generation {}", generation);
        let mut interval = interval_at(Instant::now() + TICK_INTERVAL, TICK_INTERVAL);

        loop {
            interval.tick().await;

            let Some(app) = state.upgrade() else {
                debug!("Application state gone, stopping ticker");
                break;
            };

            match app.tick_countdown(generation) {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) => {
                    error!("Failed to advance countdown: {}", e);
                    break;
                }
            }
        }

        debug!("Countdown ticker for generation {} finished", generation);
    });

    TickerGuard { handle, generation }
}
