//! Settings of the command line client, read from TOML

use crate::api::system::Capabilities;
use crate::utils::error::{Result, StorageError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Looked up in the working directory when no file is given
pub const DEFAULT_SETTINGS_FILE: &str = "installer-storage.toml";

const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub backend: BackendSettings,
    /// Technologies to offer even if the backend does not report them
    #[serde(default)]
    pub capabilities: Capabilities,
    #[serde(default)]
    pub log: LogSettings,
    #[serde(default)]
    pub ui: UiSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendSettings {
    /// Directory with `system.json`, `config.json` and friends
    #[serde(default = "default_backend_dir")]
    pub dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogSettings {
    /// Used unless `--verbose` is given
    #[serde(default = "default_log_level")]
    pub level: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiSettings {
    /// Shorten long device names in listings
    #[serde(default = "default_true")]
    pub truncate_names: bool,
}

fn default_backend_dir() -> PathBuf {
    PathBuf::from("storage")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            dir: default_backend_dir(),
        }
    }
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            truncate_names: default_true(),
        }
    }
}

impl Settings {
    /// Load settings from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        Ok(settings)
    }

    /// Load `path`, or the default file when present, or the defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::from_file(path);
        }

        let fallback = Path::new(DEFAULT_SETTINGS_FILE);
        if fallback.is_file() {
            debug!("Using {}", DEFAULT_SETTINGS_FILE);
            Self::from_file(fallback)
        } else {
            Ok(Self::default())
        }
    }

    /// Generate a sample settings file
    pub fn sample() -> Self {
        Settings {
            backend: BackendSettings {
                dir: PathBuf::from("/var/lib/installer/storage"),
            },
            capabilities: Capabilities {
                zfcp: false,
                dasd: false,
            },
            log: LogSettings {
                level: "info".to_string(),
            },
            ui: UiSettings {
                truncate_names: true,
            },
        }
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<()> {
        if !self.backend.dir.is_dir() {
            return Err(StorageError::SettingsError(format!(
                "Backend directory {} does not exist",
                self.backend.dir.display()
            )));
        }

        if !self.backend.dir.join("system.json").is_file() {
            return Err(StorageError::SettingsError(format!(
                "Backend directory {} has no system.json",
                self.backend.dir.display()
            )));
        }

        if !LOG_LEVELS.contains(&self.log.level.as_str()) {
            return Err(StorageError::SettingsError(format!(
                "Unknown log level '{}', expected one of {}",
                self.log.level,
                LOG_LEVELS.join(", ")
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_sections_use_defaults() {
        let settings: Settings = toml::from_str("[capabilities]\ndasd = true\n").unwrap();
        assert_eq!(settings.backend.dir, PathBuf::from("storage"));
        assert!(settings.capabilities.dasd);
        assert!(!settings.capabilities.zfcp);
        assert_eq!(settings.log.level, "info");
        assert!(settings.ui.truncate_names);
    }

    #[test]
    fn sample_round_trips_through_toml() {
        let sample = Settings::sample();
        let parsed: Settings = toml::from_str(&sample.to_toml().unwrap()).unwrap();
        assert_eq!(parsed, sample);
    }

    #[test]
    fn validate_checks_backend_dir_and_level() {
        let dir = TempDir::new().unwrap();
        let mut settings = Settings {
            backend: BackendSettings {
                dir: dir.path().to_path_buf(),
            },
            ..Default::default()
        };
        assert!(matches!(settings.validate(), Err(StorageError::SettingsError(_))));

        std::fs::write(dir.path().join("system.json"), "{}").unwrap();
        assert!(settings.validate().is_ok());

        settings.log.level = "loud".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn from_file_reads_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(DEFAULT_SETTINGS_FILE);
        std::fs::write(&path, "[log]\nlevel = \"debug\"\n[ui]\ntruncate_names = false\n").unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.log.level, "debug");
        assert!(!settings.ui.truncate_names);
    }
}
