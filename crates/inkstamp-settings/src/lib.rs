//! InkStamp Settings Crate
//!
//! Handles editor configuration and settings persistence.

pub mod config;
pub mod error;

pub use config::{Config, HistorySettings, PlacementSettings, RenderSettings};
pub use error::{ConfigError, SettingsError, SettingsResult};
