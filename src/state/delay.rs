//! Delay duration model
//!
//! A [`DelayDuration`] can only be built through constructors that enforce the
//! `[5, 300]` second domain with a granularity of 5 seconds, so every value
//! reaching the store or the countdown is already valid.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    error::{SettingsError, SettingsResult},
    utils::format_duration,
};

pub const MIN_DELAY_SECS: u32 = 5;
pub const MAX_DELAY_SECS: u32 = 300;
pub const DELAY_STEP_SECS: u32 = 5;
pub const DEFAULT_DELAY_SECS: u32 = 60;

/// A commonly offered delay value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Preset {
    pub value: u32,
    pub label: &'static str,
    pub description: &'static str,
}

pub const PRESETS: [Preset; 5] = [
    Preset { value: 15, label: "15 seconds", description: "Quick review" },
    Preset { value: 30, label: "30 seconds", description: "Standard protection" },
    Preset { value: 60, label: "1 minute", description: "Recommended" },
    Preset { value: 120, label: "2 minutes", description: "Extra careful" },
    Preset { value: 300, label: "5 minutes", description: "Maximum protection" },
];

/// Configured hold time in whole seconds, always within `[5, 300]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u32")]
pub struct DelayDuration(u32);

impl DelayDuration {
    /// Clamp to the allowed range and round to the nearest 5 seconds
    pub fn normalized(seconds: i64) -> Self {
        let clamped = seconds.clamp(MIN_DELAY_SECS as i64, MAX_DELAY_SECS as i64) as u32;
        let step = DELAY_STEP_SECS;
        let rounded = (clamped + step / 2) / step * step;
        // 5 and 300 are both multiples of the step, so rounding stays in range
        Self(rounded)
    }

    /// Reject values outside the range instead of clamping them
    pub fn try_from_secs(seconds: i64) -> SettingsResult<Self> {
        if seconds < MIN_DELAY_SECS as i64 || seconds > MAX_DELAY_SECS as i64 {
            return Err(SettingsError::InvalidDuration(seconds));
        }
        Ok(Self::normalized(seconds))
    }

    /// Accept only one of the preset values
    pub fn preset(seconds: i64) -> SettingsResult<Self> {
        PRESETS
            .iter()
            .find(|preset| preset.value as i64 == seconds)
            .map(|preset| Self(preset.value))
            .ok_or(SettingsError::UnknownPreset(seconds))
    }

    pub fn as_secs(&self) -> u32 {
        self.0
    }

    /// The preset this duration corresponds to, if any
    pub fn selected_preset(&self) -> Option<&'static Preset> {
        PRESETS.iter().find(|preset| preset.value == self.0)
    }
}

impl Default for DelayDuration {
    fn default() -> Self {
        Self(DEFAULT_DELAY_SECS)
    }
}

impl TryFrom<i64> for DelayDuration {
    type Error = SettingsError;

    fn try_from(seconds: i64) -> Result<Self, Self::Error> {
        Self::try_from_secs(seconds)
    }
}

impl From<DelayDuration> for u32 {
    fn from(duration: DelayDuration) -> Self {
        duration.0
    }
}

impl fmt::Display for DelayDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_duration(self.0 as u64))
    }
}

/// Snapshot of the delay settings as the dashboard shows them
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DelayConfiguration {
    pub duration_seconds: DelayDuration,
    pub enabled: bool,
    pub formatted: String,
    pub selected_preset: Option<u32>,
}

impl DelayConfiguration {
    pub fn new(duration: DelayDuration, enabled: bool) -> Self {
        Self {
            duration_seconds: duration,
            enabled,
            formatted: duration.to_string(),
            selected_preset: duration.selected_preset().map(|preset| preset.value),
        }
    }

    /// Badge text for the header
    pub fn status_label(&self) -> &'static str {
        if self.enabled { "Active" } else { "Paused" }
    }
}
