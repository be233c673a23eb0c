//! Settings errors.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    /// A value breaks a constraint of its key
    #[error("{key} is invalid: {reason}")]
    Invalid { key: String, reason: String },

    /// A tuning factor outside the range the engine can work with
    #[error("{key} = {value} is out of range")]
    OutOfRange { key: String, value: f64 },

    /// Settings files are JSON or TOML, chosen by extension
    #[error("cannot tell the settings format of {path}: expected .json or .toml")]
    UnknownFormat { path: String },

    #[error("no LabKit config directory: {0}")]
    NoConfigDir(String),

    #[error("settings file access failed: {0}")]
    Io(#[from] io::Error),

    #[error("malformed JSON settings: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed TOML settings: {0}")]
    TomlRead(#[from] toml::de::Error),

    #[error("settings cannot be written as TOML: {0}")]
    TomlWrite(#[from] toml::ser::Error),
}

impl SettingsError {
    /// Whether the file was readable but its content was rejected.
    pub fn is_validation(&self) -> bool {
        matches!(self, SettingsError::Invalid { .. } | SettingsError::OutOfRange { .. })
    }
}

pub type SettingsResult<T> = Result<T, SettingsError>;
