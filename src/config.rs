//! Tunables that limit how much metadata is tracked.
//!
//! Two caps exist: the number of columns a table snapshot tracks and the
//! number of nominal values a dictionary keeps. Both may change while a
//! session is running. Builders therefore hold a [`SettingsProvider`] and
//! read it at the moment a cap matters; snapshots never store the caps, so
//! changing a setting only affects metadata built afterwards.

use anyhow::{Context as _, Result, ensure};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

pub const DEFAULT_MAX_COLUMNS: usize = 250;
pub const DEFAULT_MAX_NOMINAL_VALUES: usize = 100;

/// Read-through access to the metadata caps.
pub trait SettingsProvider: fmt::Debug + Send + Sync {
    /// Maximum number of columns a table snapshot tracks.
    fn max_columns(&self) -> usize;

    /// Maximum number of nominal values tracked per column.
    fn max_nominal_values(&self) -> usize;
}

/// Provider handle stored by builders.
pub type Settings = Arc<dyn SettingsProvider>;

/// Settings used when a builder is created without an explicit provider.
pub fn default_settings() -> Settings {
    Arc::new(MetadataSettings::default())
}

/// Plain, serializable cap values.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct MetadataSettings {
    /// Maximum number of columns tracked per table (default: 250)
    pub max_columns: usize,
    /// Maximum number of nominal values tracked per column (default: 100)
    pub max_nominal_values: usize,
}

impl Default for MetadataSettings {
    fn default() -> Self {
        Self {
            max_columns: DEFAULT_MAX_COLUMNS,
            max_nominal_values: DEFAULT_MAX_NOMINAL_VALUES,
        }
    }
}

impl MetadataSettings {
    /// Both caps must allow at least one entry.
    ///
    /// # Errors
    ///
    /// Fails if either cap is zero.
    pub fn validate(&self) -> Result<()> {
        ensure!(self.max_columns >= 1, "max_columns must be at least 1");
        ensure!(
            self.max_nominal_values >= 1,
            "max_nominal_values must be at least 1"
        );
        Ok(())
    }

    /// Parse settings from a JSON string; missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Fails on malformed JSON or on settings that do not validate.
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Self =
            serde_json::from_str(json).context("Failed to parse metadata settings JSON")?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or does not hold valid settings.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;
        Self::from_json(&content)
    }

    /// # Errors
    ///
    /// Fails if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize metadata settings")
    }

    /// Save settings to a JSON file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Fails if the directory or file cannot be written.
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create settings directory")?;
        }
        std::fs::write(path, self.to_json()?).context("Failed to write settings file")
    }
}

impl SettingsProvider for MetadataSettings {
    fn max_columns(&self) -> usize {
        self.max_columns
    }

    fn max_nominal_values(&self) -> usize {
        self.max_nominal_values
    }
}

/// Runtime-tunable settings shared by every builder that holds a clone.
///
/// Updates become visible to the next cap check of every builder; snapshots
/// that were already built are not affected.
#[derive(Debug, Clone)]
pub struct SharedSettings {
    cells: Arc<SettingCells>,
}

#[derive(Debug)]
struct SettingCells {
    max_columns: AtomicUsize,
    max_nominal_values: AtomicUsize,
}

impl SharedSettings {
    pub fn new(initial: MetadataSettings) -> Self {
        Self {
            cells: Arc::new(SettingCells {
                max_columns: AtomicUsize::new(initial.max_columns),
                max_nominal_values: AtomicUsize::new(initial.max_nominal_values),
            }),
        }
    }

    pub fn set_max_columns(&self, value: usize) {
        log::debug!("max_columns set to {value}");
        self.cells.max_columns.store(value.max(1), Ordering::Relaxed);
    }

    pub fn set_max_nominal_values(&self, value: usize) {
        log::debug!("max_nominal_values set to {value}");
        self.cells
            .max_nominal_values
            .store(value.max(1), Ordering::Relaxed);
    }

    /// Replace both caps at once.
    pub fn apply(&self, settings: &MetadataSettings) {
        self.set_max_columns(settings.max_columns);
        self.set_max_nominal_values(settings.max_nominal_values);
    }

    /// Current values as a plain struct.
    pub fn current(&self) -> MetadataSettings {
        MetadataSettings {
            max_columns: self.max_columns(),
            max_nominal_values: self.max_nominal_values(),
        }
    }

    /// Provider handle for builders.
    pub fn handle(&self) -> Settings {
        Arc::new(self.clone())
    }
}

impl Default for SharedSettings {
    fn default() -> Self {
        Self::new(MetadataSettings::default())
    }
}

impl SettingsProvider for SharedSettings {
    fn max_columns(&self) -> usize {
        self.cells.max_columns.load(Ordering::Relaxed)
    }

    fn max_nominal_values(&self) -> usize {
        self.cells.max_nominal_values.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = MetadataSettings::default();
        assert_eq!(settings.max_columns, DEFAULT_MAX_COLUMNS);
        assert_eq!(settings.max_nominal_values, DEFAULT_MAX_NOMINAL_VALUES);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_partial_json_takes_defaults() -> Result<()> {
        let settings = MetadataSettings::from_json(r#"{ "max_columns": 12 }"#)?;
        assert_eq!(settings.max_columns, 12);
        assert_eq!(settings.max_nominal_values, DEFAULT_MAX_NOMINAL_VALUES);
        Ok(())
    }

    #[test]
    fn test_zero_cap_is_rejected() {
        let result = MetadataSettings::from_json(r#"{ "max_nominal_values": 0 }"#);
        assert!(result.is_err(), "a zero cap must not validate");
    }

    #[test]
    fn test_file_round_trip() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("nested").join("settings.json");
        let settings = MetadataSettings {
            max_columns: 7,
            max_nominal_values: 3,
        };
        settings.to_file(&path)?;
        assert_eq!(MetadataSettings::from_file(&path)?, settings);
        Ok(())
    }

    #[test]
    fn test_shared_settings_are_read_through() {
        let shared = SharedSettings::default();
        let handle = shared.handle();
        assert_eq!(handle.max_columns(), DEFAULT_MAX_COLUMNS);

        shared.set_max_columns(5);
        assert_eq!(handle.max_columns(), 5, "handles see later updates");

        shared.apply(&MetadataSettings {
            max_columns: 9,
            max_nominal_values: 4,
        });
        assert_eq!(shared.current().max_nominal_values, 4);
        assert_eq!(handle.max_columns(), 9);
    }
}
