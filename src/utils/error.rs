//! Error types for installer-storage

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    #[error("Backend request failed: {0}")]
    Backend(String),

    #[error("Activation failed for {device}: {reason}")]
    ActivationFailed { device: String, reason: String },

    #[error("Invalid size: {0}")]
    InvalidSize(String),

    #[error("Invalid route parameter: {0}")]
    InvalidRoute(String),

    #[error("Settings error: {0}")]
    SettingsError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("User cancelled operation")]
    UserCancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, StorageError>;
