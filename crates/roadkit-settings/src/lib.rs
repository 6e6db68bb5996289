//! RoadKit Settings Crate
//!
//! Editor configuration: link-inference threshold, split limits and undo
//! history depth, persisted as JSON or TOML.

pub mod config;
pub mod error;

pub use config::{EditingSettings, EditorConfig, HistorySettings, LinkingSettings};
pub use error::{SettingsError, SettingsResult};
