//! Settings persisted as a flat TOML table.
//!
//! The file is read once when opened; every write rewrites it before
//! returning, so a value is durable as soon as `set_setting` succeeds.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::debug;

use solace_core::error::JournalError;
use solace_core::store::SettingsStore;

pub struct FileSettings {
    path: PathBuf,
    values: RwLock<BTreeMap<String, String>>,
}

impl FileSettings {
    /// Load settings from `path`. A missing file is an empty table.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let values = if path.exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings file: {}", path.display()))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse settings file: {}", path.display()))?
        } else {
            BTreeMap::new()
        };
        debug!(path = %path.display(), count = values.len(), "settings loaded");
        Ok(Self {
            path,
            values: RwLock::new(values),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, values: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let content = toml::to_string(values)?;
        let tmp = self.path.with_extension("toml.tmp");
        std::fs::write(&tmp, content)
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        std::fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;
        Ok(())
    }
}

fn poisoned<T>(_: T) -> JournalError {
    JournalError::Storage("settings lock poisoned".to_string())
}

impl SettingsStore for FileSettings {
    fn get_setting(&self, key: &str) -> solace_core::error::Result<Option<String>> {
        let values = self.values.read().map_err(poisoned)?;
        Ok(values.get(key).cloned())
    }

    fn set_setting(&self, key: &str, value: &str) -> solace_core::error::Result<()> {
        let mut values = self.values.write().map_err(poisoned)?;
        let previous = values.insert(key.to_string(), value.to_string());
        if let Err(e) = self.persist(&values) {
            match previous {
                Some(old) => values.insert(key.to_string(), old),
                None => values.remove(key),
            };
            return Err(JournalError::Storage(format!("{:#}", e)));
        }
        Ok(())
    }
}
