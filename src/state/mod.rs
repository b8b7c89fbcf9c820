//! State management module
//! 
//! This module contains the delay model, the countdown preview, the mock
//! outbox and the application state that ties them to the settings store.

pub mod app_state;
pub mod countdown;
pub mod delay;
pub mod outbox;

// Re-export main types
pub use app_state::AppState;
pub use countdown::{CountdownSession, CountdownSnapshot, Indicator, Phase};
pub use delay::{DelayConfiguration, DelayDuration, Preset, PRESETS};
pub use outbox::{DelayedEmail, Outbox, Priority};
