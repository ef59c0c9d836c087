use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Service-level solver tuning, loaded from a TOML file. Every field has a
/// default, so a missing file just means stock behavior.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Wall-clock limit handed to the CBC backend, in seconds.
    pub solver_time_limit_secs: u64,
    /// Let CBC print its own log lines instead of staying silent.
    pub solver_log: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            solver_time_limit_secs: 120,
            solver_log: false,
        }
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to read settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse settings file: {0}")]
    Parse(#[from] toml::de::Error),
}

impl EngineSettings {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }

    /// Loads from `path`, falling back to defaults when the file is absent
    /// or unreadable.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(settings) => settings,
            Err(SettingsError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No settings file at {}, using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                tracing::warn!("Failed to load settings from {}: {e}", path.display());
                Self::default()
            }
        }
    }
}
