//! SendShield - Local settings service for delay-send email protection
//! 
//! This library provides the persisted dashboard settings, the delay
//! duration model, the countdown preview that simulates a held email, and
//! the HTTP API the dashboard front end talks to.

pub mod config;
pub mod error;
pub mod store;
pub mod state;
pub mod api;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use error::{SettingsError, SettingsResult};
pub use store::SettingsStore;
pub use state::AppState;
pub use api::create_router;
pub use utils::{format_duration, shutdown_signal};
