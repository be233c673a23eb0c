//! LabKit Settings Crate
//!
//! Handles editor configuration, geometric tuning of the layout engine and
//! settings persistence.

pub mod config;
pub mod error;
pub mod manager;

pub use config::{
    Config, DeletePolicy, EditorSettings, GeometrySettings, RehomeScope, ViewportSettings,
};
pub use error::{SettingsError, SettingsResult};
pub use manager::SettingsManager;
