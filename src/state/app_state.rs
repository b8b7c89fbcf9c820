//! Main application state management

use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::Instant,
};
use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{info, warn};

use super::{
    countdown::{CountdownSession, CountdownSnapshot},
    delay::{DelayConfiguration, DelayDuration},
    outbox::{DelayedEmail, Outbox},
};
use crate::{
    error::{SettingsError, SettingsResult},
    store::{PersistedSettings, SettingsStore, Tab, Theme},
    tasks::{spawn_countdown_ticker, TickerGuard},
};

/// Main application state shared by the HTTP handlers and the ticker task
#[derive(Debug)]
pub struct AppState {
    /// Persisted dashboard settings, the canonical delay value lives here
    pub store: Mutex<SettingsStore>,
    /// Preview countdown and its tick task, never persisted
    preview: Mutex<Preview>,
    pub outbox: Mutex<Outbox>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Mutex<Option<String>>,
    pub last_action_time: Mutex<Option<DateTime<Utc>>>,
    /// Channel for countdown updates
    pub countdown_tx: watch::Sender<CountdownSnapshot>,
    /// Keep the receiver alive to prevent channel closure
    _countdown_rx: watch::Receiver<CountdownSnapshot>,
}

/// A countdown session together with the task ticking it
///
/// Both live behind one mutex so a ticker is only ever installed or
/// cancelled in the same critical section that starts or resets the session.
#[derive(Debug)]
struct Preview {
    session: CountdownSession,
    ticker: Option<TickerGuard>,
}

fn lock<'a, T>(mutex: &'a Mutex<T>, name: &str) -> SettingsResult<MutexGuard<'a, T>> {
    mutex
        .lock()
        .map_err(|e| SettingsError::LockPoisoned(format!("{}: {}", name, e)))
}

impl AppState {
    /// Create the state around an initialised settings store
    pub fn new(port: u16, host: String, store: SettingsStore, outbox: Outbox) -> Self {
        let countdown = CountdownSession::new(store.delay_duration());
        let (countdown_tx, countdown_rx) = watch::channel(countdown.snapshot());

        Self {
            store: Mutex::new(store),
            preview: Mutex::new(Preview {
                session: countdown,
                ticker: None,
            }),
            outbox: Mutex::new(outbox),
            start_time: Instant::now(),
            port,
            host,
            last_action: Mutex::new(None),
            last_action_time: Mutex::new(None),
            countdown_tx,
            _countdown_rx: countdown_rx,
        }
    }

    fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    fn publish_countdown(&self, snapshot: CountdownSnapshot) {
        // send_replace never fails, even with every receiver dropped
        self.countdown_tx.send_replace(snapshot);
    }

    /// Get a copy of every persisted field
    pub fn get_settings(&self) -> SettingsResult<PersistedSettings> {
        Ok(*lock(&self.store, "settings store")?.settings())
    }

    /// Current delay configuration with display fields
    pub fn get_delay_configuration(&self) -> SettingsResult<DelayConfiguration> {
        let store = lock(&self.store, "settings store")?;
        Ok(DelayConfiguration::new(store.delay_duration(), store.delay_enabled()))
    }

    /// Set the delay, clamping and rounding whatever the caller sent
    pub fn set_delay(&self, seconds: i64) -> SettingsResult<DelayConfiguration> {
        let duration = DelayDuration::normalized(seconds);
        if duration.as_secs() as i64 != seconds {
            warn!("Requested delay {}s adjusted to {}s", seconds, duration.as_secs());
        }
        self.apply_delay(duration)
    }

    /// Set the delay, refusing values outside the allowed range
    pub fn set_delay_strict(&self, seconds: i64) -> SettingsResult<DelayConfiguration> {
        let duration = DelayDuration::try_from_secs(seconds)?;
        self.apply_delay(duration)
    }

    /// Set the delay to one of the presets
    pub fn select_preset(&self, seconds: i64) -> SettingsResult<DelayConfiguration> {
        let duration = DelayDuration::preset(seconds)?;
        self.apply_delay(duration)
    }

    fn apply_delay(&self, duration: DelayDuration) -> SettingsResult<DelayConfiguration> {
        let config = {
            let mut store = lock(&self.store, "settings store")?;
            store.set_delay_duration(duration)?;
            DelayConfiguration::new(duration, store.delay_enabled())
        };
        info!("Delay set to {} ({}s)", config.formatted, duration.as_secs());

        let snapshot = {
            let mut preview = lock(&self.preview, "countdown")?;
            preview.session.reseed(duration);
            preview.session.snapshot()
        };
        self.publish_countdown(snapshot);
        self.record_action("set-delay");

        Ok(config)
    }

    /// Toggle delay protection; a running preview is unaffected
    pub fn set_delay_enabled(&self, enabled: bool) -> SettingsResult<DelayConfiguration> {
        info!("Setting delay protection to: {}", enabled);
        let config = {
            let mut store = lock(&self.store, "settings store")?;
            store.set_delay_enabled(enabled)?;
            DelayConfiguration::new(store.delay_duration(), enabled)
        };
        self.record_action(if enabled { "delay-on" } else { "delay-off" });
        Ok(config)
    }

    pub fn set_theme(&self, theme: Theme) -> SettingsResult<PersistedSettings> {
        info!("Setting theme to: {}", theme);
        let settings = {
            let mut store = lock(&self.store, "settings store")?;
            store.set_theme(theme)?;
            *store.settings()
        };
        self.record_action("set-theme");
        Ok(settings)
    }

    pub fn set_active_tab(&self, tab: Tab) -> SettingsResult<PersistedSettings> {
        info!("Switching to tab: {}", tab);
        let settings = {
            let mut store = lock(&self.store, "settings store")?;
            store.set_active_tab(tab)?;
            *store.settings()
        };
        self.record_action("set-tab");
        Ok(settings)
    }

    pub fn set_signed_in(&self, signed_in: bool) -> SettingsResult<PersistedSettings> {
        info!("Setting signed-in state to: {}", signed_in);
        let settings = {
            let mut store = lock(&self.store, "settings store")?;
            store.set_signed_in(signed_in)?;
            *store.settings()
        };
        self.record_action(if signed_in { "sign-in" } else { "sign-out" });
        Ok(settings)
    }

    /// Start the preview countdown from the configured delay
    pub fn start_countdown(self: &Arc<Self>) -> SettingsResult<CountdownSnapshot> {
        let duration = lock(&self.store, "settings store")?.delay_duration();

        let snapshot = {
            let mut preview = lock(&self.preview, "countdown")?;
            let generation = preview.session.start(duration)?;
            // replacing the previous guard cancels its task
            preview.ticker = Some(spawn_countdown_ticker(Arc::downgrade(self), generation));
            preview.session.snapshot()
        };
        info!("Countdown preview started at {}s", duration.as_secs());

        self.publish_countdown(snapshot.clone());
        self.record_action("preview-start");
        Ok(snapshot)
    }

    /// Apply one tick for the given run; returns whether it is still running
    pub fn tick_countdown(&self, generation: u64) -> SettingsResult<bool> {
        let snapshot = {
            let mut preview = lock(&self.preview, "countdown")?;
            if !preview.session.tick_for(generation) {
                return Ok(false);
            }
            preview.session.snapshot()
        };

        let running = snapshot.remaining_seconds > 0;
        if !running {
            info!("Countdown preview elapsed, email moved to outbox");
        }
        self.publish_countdown(snapshot);
        Ok(running)
    }

    /// Stop any pending tick and return the preview to idle
    pub fn reset_countdown(&self) -> SettingsResult<CountdownSnapshot> {
        let duration = lock(&self.store, "settings store")?.delay_duration();
        let snapshot = {
            let mut preview = lock(&self.preview, "countdown")?;
            preview.ticker = None;
            preview.session.reset(duration);
            preview.session.snapshot()
        };
        info!("Countdown preview reset to {}s", duration.as_secs());

        self.publish_countdown(snapshot.clone());
        self.record_action("preview-reset");
        Ok(snapshot)
    }

    pub fn get_countdown(&self) -> SettingsResult<CountdownSnapshot> {
        Ok(lock(&self.preview, "countdown")?.session.snapshot())
    }

    /// Watch countdown snapshots as they change
    pub fn subscribe_countdown(&self) -> watch::Receiver<CountdownSnapshot> {
        self.countdown_tx.subscribe()
    }

    /// Held emails together with their average remaining delay
    pub fn get_outbox(&self) -> SettingsResult<(Vec<DelayedEmail>, u32)> {
        let outbox = lock(&self.outbox, "outbox")?;
        Ok((outbox.list().to_vec(), outbox.average_delay()))
    }

    pub fn edit_email(&self, id: &str) -> SettingsResult<DelayedEmail> {
        let email = lock(&self.outbox, "outbox")?.edit(id)?.clone();
        self.record_action("outbox-edit");
        Ok(email)
    }

    pub fn cancel_email(&self, id: &str) -> SettingsResult<DelayedEmail> {
        let email = lock(&self.outbox, "outbox")?.cancel(id)?;
        self.record_action("outbox-cancel");
        Ok(email)
    }

    pub fn send_email_now(&self, id: &str) -> SettingsResult<DelayedEmail> {
        let email = lock(&self.outbox, "outbox")?.send_now(id)?;
        self.record_action("outbox-send-now");
        Ok(email)
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }

    /// Whether a tick task is currently scheduled
    pub fn ticker_active(&self) -> bool {
        self.preview
            .lock()
            .map(|preview| preview.ticker.as_ref().is_some_and(|guard| !guard.is_finished()))
            .unwrap_or(false)
    }
}
