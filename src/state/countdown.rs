//! Countdown preview state machine
//!
//! `Idle -> Running -> Elapsed`, with `reset` returning to `Idle` from
//! anywhere. The session itself knows nothing about time; something else
//! calls [`CountdownSession::tick`] once per second while it is running.

use serde::Serialize;
use tracing::debug;

use super::delay::DelayDuration;
use crate::{
    error::{SettingsError, SettingsResult},
    utils::format_duration,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Running,
    Elapsed,
}

/// What the in-page overlay shows for a given session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Indicator {
    Hidden,
    Counting { remaining_seconds: u32 },
    MovedToOutbox,
}

/// One run of the simulated hold-and-release timer
#[derive(Debug, Clone)]
pub struct CountdownSession {
    remaining_seconds: u32,
    phase: Phase,
    /// Bumped on every start and reset so stale ticks can be told apart
    generation: u64,
}

impl CountdownSession {
    /// Create an idle session showing the configured duration
    pub fn new(duration: DelayDuration) -> Self {
        Self {
            remaining_seconds: duration.as_secs(),
            phase: Phase::Idle,
            generation: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    /// Begin counting down from a fresh snapshot of the configured delay
    ///
    /// Returns the generation the tick source must present on every tick.
    pub fn start(&mut self, duration: DelayDuration) -> SettingsResult<u64> {
        if self.phase == Phase::Running {
            return Err(SettingsError::CountdownRunning);
        }

        self.generation += 1;
        self.remaining_seconds = duration.as_secs();
        self.phase = Phase::Running;
        debug!("Countdown started at {}s (generation {})", self.remaining_seconds, self.generation);
        Ok(self.generation)
    }

    /// Advance by one second; returns whether the tick was applied
    pub fn tick(&mut self) -> bool {
        if self.phase != Phase::Running {
            return false;
        }

        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        if self.remaining_seconds == 0 {
            self.phase = Phase::Elapsed;
            debug!("Countdown elapsed (generation {})", self.generation);
        }
        true
    }

    /// Apply a tick only if it belongs to the current run
    pub fn tick_for(&mut self, generation: u64) -> bool {
        if generation != self.generation {
            debug!("Dropping stale tick for generation {} (current {})", generation, self.generation);
            return false;
        }
        self.tick()
    }

    /// Return to idle from any phase with the current configured delay
    pub fn reset(&mut self, duration: DelayDuration) {
        self.generation += 1;
        self.remaining_seconds = duration.as_secs();
        self.phase = Phase::Idle;
    }

    /// Follow a configuration change; only an idle session is affected
    pub fn reseed(&mut self, duration: DelayDuration) {
        if self.phase == Phase::Idle {
            self.remaining_seconds = duration.as_secs();
        }
    }

    pub fn indicator(&self) -> Indicator {
        match self.phase {
            Phase::Idle => Indicator::Hidden,
            Phase::Running => Indicator::Counting {
                remaining_seconds: self.remaining_seconds,
            },
            Phase::Elapsed => Indicator::MovedToOutbox,
        }
    }

    pub fn snapshot(&self) -> CountdownSnapshot {
        CountdownSnapshot {
            phase: self.phase,
            remaining_seconds: self.remaining_seconds,
            formatted_remaining: format_duration(self.remaining_seconds as u64),
            indicator: self.indicator(),
        }
    }
}

/// Copy of the session published to watchers and API clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountdownSnapshot {
    pub phase: Phase,
    pub remaining_seconds: u32,
    pub formatted_remaining: String,
    pub indicator: Indicator,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: i64) -> DelayDuration {
        DelayDuration::normalized(s)
    }

    #[test]
    fn starts_idle_with_configured_duration() {
        let session = CountdownSession::new(secs(60));
        assert_eq!(session.phase(), Phase::Idle);
        assert_eq!(session.remaining_seconds(), 60);
        assert_eq!(session.indicator(), Indicator::Hidden);
    }

    #[test]
    fn runs_to_elapsed_after_exactly_duration_ticks() {
        let mut session = CountdownSession::new(secs(60));
        session.start(secs(60)).unwrap();

        for expected in (1..60).rev() {
            assert!(session.tick());
            assert_eq!(session.phase(), Phase::Running);
            assert_eq!(session.remaining_seconds(), expected);
        }

        assert!(session.tick());
        assert_eq!(session.phase(), Phase::Elapsed);
        assert_eq!(session.remaining_seconds(), 0);
        assert_eq!(session.indicator(), Indicator::MovedToOutbox);

        // no further decrement once elapsed
        assert!(!session.tick());
        assert_eq!(session.remaining_seconds(), 0);
    }

    #[test]
    fn start_snapshots_the_duration() {
        let mut session = CountdownSession::new(secs(60));
        session.start(secs(15)).unwrap();
        assert_eq!(session.remaining_seconds(), 15);

        // configuration changes while running are not picked up
        session.reseed(secs(300));
        assert_eq!(session.remaining_seconds(), 15);
    }

    #[test]
    fn start_while_running_is_rejected() {
        let mut session = CountdownSession::new(secs(5));
        session.start(secs(5)).unwrap();
        assert!(matches!(session.start(secs(5)), Err(SettingsError::CountdownRunning)));
    }

    #[test]
    fn restart_from_elapsed() {
        let mut session = CountdownSession::new(secs(5));
        session.start(secs(5)).unwrap();
        for _ in 0..5 {
            session.tick();
        }
        assert_eq!(session.phase(), Phase::Elapsed);

        session.start(secs(10)).unwrap();
        assert_eq!(session.phase(), Phase::Running);
        assert_eq!(session.remaining_seconds(), 10);
    }

    #[test]
    fn reset_from_any_phase() {
        let mut session = CountdownSession::new(secs(30));
        session.reset(secs(30));
        assert_eq!(session.phase(), Phase::Idle);

        session.start(secs(30)).unwrap();
        session.tick();
        session.reset(secs(45));
        assert_eq!(session.phase(), Phase::Idle);
        assert_eq!(session.remaining_seconds(), 45);
        assert!(!session.tick());
        assert_eq!(session.remaining_seconds(), 45);
    }

    #[test]
    fn stale_generation_ticks_are_ignored() {
        let mut session = CountdownSession::new(secs(30));
        let first = session.start(secs(30)).unwrap();
        session.reset(secs(30));
        let second = session.start(secs(30)).unwrap();
        assert_ne!(first, second);

        assert!(!session.tick_for(first));
        assert_eq!(session.remaining_seconds(), 30);
        assert!(session.tick_for(second));
        assert_eq!(session.remaining_seconds(), 29);
    }

    #[test]
    fn reseed_only_affects_idle() {
        let mut session = CountdownSession::new(secs(60));
        session.reseed(secs(120));
        assert_eq!(session.remaining_seconds(), 120);
    }

    #[test]
    fn snapshot_shape() {
        let mut session = CountdownSession::new(secs(90));
        session.start(secs(90)).unwrap();
        let snapshot = session.snapshot();
        assert_eq!(snapshot.formatted_remaining, "1m 30s");
        assert_eq!(snapshot.indicator, Indicator::Counting { remaining_seconds: 90 });

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["phase"], "running");
        assert_eq!(json["indicator"]["kind"], "counting");
    }
}
