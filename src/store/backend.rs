//! Key/value persistence primitives
//!
//! The settings store only needs string keys mapped to string values, the
//! same shape as browser-local storage. Two backends are provided: an
//! in-memory map for tests and ephemeral runs, and a JSON file that is
//! rewritten on every write.

use std::{
    collections::BTreeMap,
    fs,
    io::{self, Write},
    path::PathBuf,
};
use tracing::{debug, info, warn};

use crate::error::SettingsResult;

/// Abstract string key/value persistence
pub trait KeyValueBackend: Send {
    /// Read a raw value, `None` when the key was never written
    fn get(&self, key: &str) -> SettingsResult<Option<String>>;

    /// Write a raw value through to the underlying medium
    fn set(&mut self, key: &str, value: &str) -> SettingsResult<()>;
}

/// Backend keeping everything in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    values: BTreeMap<String, String>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend pre-populated with raw values
    pub fn with_values<I, K, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: values
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl KeyValueBackend for MemoryBackend {
    fn get(&self, key: &str) -> SettingsResult<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> SettingsResult<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Backend persisting a flat JSON object of strings to a file
#[derive(Debug)]
pub struct JsonFileBackend {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl JsonFileBackend {
    /// Open the settings file, starting empty if it is missing or corrupt
    pub fn open(path: impl Into<PathBuf>) -> SettingsResult<Self> {
        let path = path.into();

        let values = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(values) => values,
                Err(e) => {
                    warn!("Ignoring unreadable settings file {}: {}", path.display(), e);
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!("No settings file at {}, starting from defaults", path.display());
                BTreeMap::new()
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Self { path, values })
    }

    fn flush(&self) -> SettingsResult<()> {
        let serialized = serde_json::to_string_pretty(&self.values)?;

        // write next to the target and rename so a crash never leaves half a file
        let tmp_path = self.path.with_extension("json.tmp");
        {
            let mut file = fs::File::create(&tmp_path)?;
            file.write_all(serialized.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&tmp_path, &self.path)?;

        debug!("Settings written to {}", self.path.display());
        Ok(())
    }
}

impl KeyValueBackend for JsonFileBackend {
    fn get(&self, key: &str) -> SettingsResult<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> SettingsResult<()> {
        self.values.insert(key.to_string(), value.to_string());
        self.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_backend_last_write_wins() {
        let mut backend = MemoryBackend::new();
        assert_eq!(backend.get("theme").unwrap(), None);

        backend.set("theme", "dark").unwrap();
        backend.set("theme", "light").unwrap();
        assert_eq!(backend.get("theme").unwrap().as_deref(), Some("light"));
    }

    #[test]
    fn json_file_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let mut backend = JsonFileBackend::open(&path).unwrap();
        backend.set("delayDuration", "120").unwrap();
        backend.set("isSignedIn", "false").unwrap();
        drop(backend);

        let reopened = JsonFileBackend::open(&path).unwrap();
        assert_eq!(reopened.get("delayDuration").unwrap().as_deref(), Some("120"));
        assert_eq!(reopened.get("isSignedIn").unwrap().as_deref(), Some("false"));
        assert_eq!(reopened.get("theme").unwrap(), None);
    }

    #[test]
    fn corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();

        let backend = JsonFileBackend::open(&path).unwrap();
        assert_eq!(backend.get("delayDuration").unwrap(), None);
    }

    #[test]
    fn values_are_stored_as_strings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let mut backend = JsonFileBackend::open(&path).unwrap();
        backend.set("delayEnabled", "true").unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["delayEnabled"], serde_json::Value::String("true".into()));
    }
}
