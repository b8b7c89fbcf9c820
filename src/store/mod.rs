//! Settings persistence module
//! 
//! This module contains the key/value backends and the typed settings store
//! built on top of them.

pub mod backend;
pub mod settings_store;

// Re-export main types
pub use backend::{JsonFileBackend, KeyValueBackend, MemoryBackend};
pub use settings_store::{PersistedSettings, SettingsStore, Tab, Theme};
