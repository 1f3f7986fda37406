//! Configuration and settings management for InkStamp
//!
//! Provides configuration file handling and validation.
//! Supports JSON and TOML file formats stored in the platform config directory.
//!
//! Configuration is organized into logical sections:
//! - Placement defaults (initial size, staggering, duplicate offset, size limits)
//! - History limits (undo/redo depth)
//! - Render settings (render bound, blend mode, handle hit tolerance)

use crate::error::{ConfigError, SettingsError, SettingsResult};
use inkstamp_core::constants::{
    DEFAULT_DUPLICATE_OFFSET, DEFAULT_HANDLE_TOLERANCE_PX, DEFAULT_HISTORY_DEPTH,
    DEFAULT_MAX_RENDER_EDGE, DEFAULT_SAFE_REGION_MARGIN, DEFAULT_STAGGER_STEP,
    DEFAULT_WIDTH_RATIO, MAX_WIDTH_RATIO, MIN_WIDTH_RATIO,
};
use inkstamp_core::BlendMode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Defaults applied when placements are created or copied
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementSettings {
    /// Width ratio of a new placement
    pub default_width_ratio: f64,
    /// Smallest width ratio a resize may reach
    pub min_width_ratio: f64,
    /// Largest width ratio a resize may reach
    pub max_width_ratio: f64,
    /// Normalized step between staggered new placements
    pub stagger_step: f64,
    /// Normalized offset of a duplicate from its original
    pub duplicate_offset: f64,
    /// Margin of the central region new placements stay inside
    pub safe_region_margin: f64,
}

impl Default for PlacementSettings {
    fn default() -> Self {
        Self {
            default_width_ratio: DEFAULT_WIDTH_RATIO,
            min_width_ratio: MIN_WIDTH_RATIO,
            max_width_ratio: MAX_WIDTH_RATIO,
            stagger_step: DEFAULT_STAGGER_STEP,
            duplicate_offset: DEFAULT_DUPLICATE_OFFSET,
            safe_region_margin: DEFAULT_SAFE_REGION_MARGIN,
        }
    }
}

/// Undo/redo history limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistorySettings {
    /// Snapshots kept per page on each stack
    pub max_depth: usize,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_HISTORY_DEPTH,
        }
    }
}

/// Compositing and interaction settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderSettings {
    /// Longest page edge, in pixels, accepted for a bake
    pub max_render_edge: u32,
    /// Blend mode shared by preview and bake
    #[serde(default)]
    pub blend_mode: BlendMode,
    /// Pointer tolerance for grabbing handles, in screen pixels
    pub handle_tolerance_px: f64,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            max_render_edge: DEFAULT_MAX_RENDER_EDGE,
            blend_mode: BlendMode::Normal,
            handle_tolerance_px: DEFAULT_HANDLE_TOLERANCE_PX,
        }
    }
}

/// Complete editor configuration
///
/// Aggregates all settings sections and provides file I/O operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Placement defaults
    #[serde(default)]
    pub placement: PlacementSettings,
    /// History limits
    #[serde(default)]
    pub history: HistorySettings,
    /// Render settings
    #[serde(default)]
    pub render: RenderSettings,
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Default location of the config file (`<config dir>/inkstamp/config.toml`)
    pub fn default_path() -> SettingsResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("inkstamp").join("config.toml"))
            .ok_or_else(|| {
                SettingsError::ConfigDirectory("no platform config directory".to_string())
            })
    }

    /// Load the config from the default location, falling back to defaults
    /// when no file exists yet.
    pub fn load_or_default() -> SettingsResult<Self> {
        let path = Self::default_path()?;
        if path.exists() {
            Self::load_from_file(&path)
        } else {
            tracing::debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path)?;

        let config: Self = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content)?
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            toml::from_str(&content)?
        } else {
            return Err(ConfigError::UnsupportedFormat(
                path.extension()
                    .map(|ext| ext.to_string_lossy().to_string())
                    .unwrap_or_default(),
            )
            .into());
        };

        config.validate()?;
        tracing::info!("Loaded settings from {}", path.display());
        Ok(config)
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::to_string_pretty(self)?
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            toml::to_string_pretty(self)?
        } else {
            return Err(ConfigError::UnsupportedFormat(
                path.extension()
                    .map(|ext| ext.to_string_lossy().to_string())
                    .unwrap_or_default(),
            )
            .into());
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> SettingsResult<()> {
        let p = &self.placement;

        let in_unit = |v: f64| v.is_finite() && v > 0.0 && v <= 1.0;
        if !in_unit(p.min_width_ratio) || !in_unit(p.max_width_ratio) {
            return Err(SettingsError::InvalidSetting {
                key: "placement.min_width_ratio".to_string(),
                reason: "width ratio limits must be in (0, 1]".to_string(),
            });
        }

        if p.min_width_ratio > p.max_width_ratio {
            return Err(SettingsError::InvalidSetting {
                key: "placement.min_width_ratio".to_string(),
                reason: "must not exceed max_width_ratio".to_string(),
            });
        }

        if !(p.min_width_ratio..=p.max_width_ratio).contains(&p.default_width_ratio) {
            return Err(ConfigError::ValueOutOfRange {
                key: "placement.default_width_ratio".to_string(),
                value: p.default_width_ratio.to_string(),
            }
            .into());
        }

        for (key, value) in [
            ("placement.stagger_step", p.stagger_step),
            ("placement.duplicate_offset", p.duplicate_offset),
        ] {
            if !value.is_finite() || !(0.0..0.5).contains(&value) {
                return Err(ConfigError::ValueOutOfRange {
                    key: key.to_string(),
                    value: value.to_string(),
                }
                .into());
            }
        }

        if !p.safe_region_margin.is_finite() || !(0.0..0.5).contains(&p.safe_region_margin) {
            return Err(ConfigError::ValueOutOfRange {
                key: "placement.safe_region_margin".to_string(),
                value: p.safe_region_margin.to_string(),
            }
            .into());
        }

        if self.history.max_depth == 0 {
            return Err(SettingsError::InvalidSetting {
                key: "history.max_depth".to_string(),
                reason: "must be > 0".to_string(),
            });
        }

        if self.render.max_render_edge == 0 {
            return Err(SettingsError::InvalidSetting {
                key: "render.max_render_edge".to_string(),
                reason: "must be > 0".to_string(),
            });
        }

        if !self.render.handle_tolerance_px.is_finite() || self.render.handle_tolerance_px <= 0.0
        {
            return Err(SettingsError::InvalidSetting {
                key: "render.handle_tolerance_px".to_string(),
                reason: "must be > 0".to_string(),
            });
        }

        Ok(())
    }
}
