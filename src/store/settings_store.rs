//! Persisted dashboard settings
//!
//! Five independent fields, each stored as a string under its own key. They
//! are read once when the store is initialised and every setter writes its
//! field straight through to the backend. There is no multi-field
//! transaction and no schema version, so a missing key simply means
//! "use the default".

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::backend::KeyValueBackend;
use crate::{
    error::{SettingsError, SettingsResult},
    state::delay::DelayDuration,
};

pub const THEME_KEY: &str = "theme";
pub const DELAY_ENABLED_KEY: &str = "delayEnabled";
pub const DELAY_DURATION_KEY: &str = "delayDuration";
pub const ACTIVE_TAB_KEY: &str = "activeTab";
pub const SIGNED_IN_KEY: &str = "isSignedIn";

/// Colour scheme of the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Dark,
    #[default]
    Light,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }
}

impl FromStr for Theme {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dark" => Ok(Theme::Dark),
            "light" => Ok(Theme::Light),
            other => Err(SettingsError::UnknownTheme(other.to_string())),
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dashboard tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    Settings,
    Outbox,
    Analytics,
    Preview,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Settings, Tab::Outbox, Tab::Analytics, Tab::Preview];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tab::Settings => "settings",
            Tab::Outbox => "outbox",
            Tab::Analytics => "analytics",
            Tab::Preview => "preview",
        }
    }
}

impl FromStr for Tab {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tab::ALL
            .into_iter()
            .find(|tab| tab.as_str() == s)
            .ok_or_else(|| SettingsError::UnknownTab(s.to_string()))
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// In-memory copy of every persisted field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PersistedSettings {
    pub theme: Theme,
    pub delay_enabled: bool,
    pub delay_duration: DelayDuration,
    pub active_tab: Tab,
    pub is_signed_in: bool,
}

impl Default for PersistedSettings {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            delay_enabled: true,
            delay_duration: DelayDuration::default(),
            active_tab: Tab::default(),
            is_signed_in: true,
        }
    }
}

/// Write-through settings store over an injected backend
pub struct SettingsStore {
    backend: Box<dyn KeyValueBackend>,
    settings: PersistedSettings,
}

impl fmt::Debug for SettingsStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SettingsStore")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl SettingsStore {
    /// Load every field from the backend, falling back to defaults
    pub fn init(backend: Box<dyn KeyValueBackend>) -> SettingsResult<Self> {
        let defaults = PersistedSettings::default();
        let mut store = Self {
            backend,
            settings: defaults,
        };

        match store.backend.get(THEME_KEY)? {
            Some(raw) => {
                store.settings.theme = recover(THEME_KEY, parse_field(THEME_KEY, &raw), defaults.theme);
            }
            None => {
                debug!("No persisted theme, writing default {}", defaults.theme);
                store.backend.set(THEME_KEY, defaults.theme.as_str())?;
            }
        }

        store.settings.delay_enabled =
            store.load(DELAY_ENABLED_KEY, parse_field::<bool>, defaults.delay_enabled)?;
        store.settings.delay_duration =
            store.load(DELAY_DURATION_KEY, parse_delay, defaults.delay_duration)?;
        store.settings.active_tab =
            store.load(ACTIVE_TAB_KEY, parse_field::<Tab>, defaults.active_tab)?;
        store.settings.is_signed_in =
            store.load(SIGNED_IN_KEY, parse_field::<bool>, defaults.is_signed_in)?;

        info!(
            "Settings loaded: theme={}, delay={}s, enabled={}, tab={}, signed_in={}",
            store.settings.theme,
            store.settings.delay_duration.as_secs(),
            store.settings.delay_enabled,
            store.settings.active_tab,
            store.settings.is_signed_in,
        );
        Ok(store)
    }

    fn load<T, F>(&self, key: &str, parse: F, default: T) -> SettingsResult<T>
    where
        T: fmt::Debug,
        F: FnOnce(&str, &str) -> SettingsResult<T>,
    {
        Ok(match self.backend.get(key)? {
            Some(raw) => recover(key, parse(key, &raw), default),
            None => default,
        })
    }

    fn write(&mut self, key: &str, value: &str) -> SettingsResult<()> {
        debug!("Persisting {}={}", key, value);
        self.backend.set(key, value)
    }

    pub fn settings(&self) -> &PersistedSettings {
        &self.settings
    }

    pub fn theme(&self) -> Theme {
        self.settings.theme
    }

    pub fn delay_enabled(&self) -> bool {
        self.settings.delay_enabled
    }

    pub fn delay_duration(&self) -> DelayDuration {
        self.settings.delay_duration
    }

    pub fn active_tab(&self) -> Tab {
        self.settings.active_tab
    }

    pub fn is_signed_in(&self) -> bool {
        self.settings.is_signed_in
    }

    /// Raw persisted string for a key
    pub fn raw(&self, key: &str) -> SettingsResult<Option<String>> {
        self.backend.get(key)
    }

    pub fn set_theme(&mut self, theme: Theme) -> SettingsResult<()> {
        self.write(THEME_KEY, theme.as_str())?;
        self.settings.theme = theme;
        Ok(())
    }

    pub fn set_delay_enabled(&mut self, enabled: bool) -> SettingsResult<()> {
        self.write(DELAY_ENABLED_KEY, if enabled { "true" } else { "false" })?;
        self.settings.delay_enabled = enabled;
        Ok(())
    }

    pub fn set_delay_duration(&mut self, duration: DelayDuration) -> SettingsResult<()> {
        self.write(DELAY_DURATION_KEY, &duration.as_secs().to_string())?;
        self.settings.delay_duration = duration;
        Ok(())
    }

    pub fn set_active_tab(&mut self, tab: Tab) -> SettingsResult<()> {
        self.write(ACTIVE_TAB_KEY, tab.as_str())?;
        self.settings.active_tab = tab;
        Ok(())
    }

    pub fn set_signed_in(&mut self, signed_in: bool) -> SettingsResult<()> {
        self.write(SIGNED_IN_KEY, if signed_in { "true" } else { "false" })?;
        self.settings.is_signed_in = signed_in;
        Ok(())
    }
}

fn parse_field<T: FromStr>(key: &str, raw: &str) -> SettingsResult<T> {
    raw.trim().parse().map_err(|_| SettingsError::PersistenceRead {
        key: key.to_string(),
        value: raw.to_string(),
    })
}

/// Any integer is accepted and normalized into the delay domain
fn parse_delay(key: &str, raw: &str) -> SettingsResult<DelayDuration> {
    let seconds: i64 = parse_field(key, raw)?;
    let duration = DelayDuration::normalized(seconds);
    if duration.as_secs() as i64 != seconds {
        warn!("Persisted {}={} adjusted to {}s", key, seconds, duration.as_secs());
    }
    Ok(duration)
}

/// Unparsable persisted values never reach the user; they become the default
fn recover<T: fmt::Debug>(key: &str, parsed: SettingsResult<T>, default: T) -> T {
    match parsed {
        Ok(value) => value,
        Err(e) => {
            warn!("{}, using default {:?} for {}", e, default, key);
            default
        }
    }
}
