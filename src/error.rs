//! Error types shared by the settings core

use std::io;

use thiserror::Error;

/// Errors raised by the settings store, the delay model and the countdown
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Delay of {0}s is outside the allowed range of 5s to 300s")]
    InvalidDuration(i64),

    #[error("{0}s is not one of the delay presets")]
    UnknownPreset(i64),

    #[error("Persisted value {value:?} for key {key} could not be parsed")]
    PersistenceRead { key: String, value: String },

    #[error("Unknown theme: {0}")]
    UnknownTheme(String),

    #[error("Unknown tab: {0}")]
    UnknownTab(String),

    #[error("Countdown preview is already running")]
    CountdownRunning,

    #[error("No delayed email with id {0}")]
    UnknownEmail(String),

    #[error("Settings storage failed: {0}")]
    Storage(#[from] io::Error),

    #[error("Settings serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Failed to lock {0}")]
    LockPoisoned(String),
}

/// Result type for settings operations
pub type SettingsResult<T> = Result<T, SettingsError>;
