// =============================================================================
// CONFIGURATION - Load settings from config.toml
// =============================================================================
//
// This module handles loading and parsing configuration from config.toml.
// Provides sensible defaults if config file is missing or has errors.

use anyhow::{Context, Result};
use log::LevelFilter;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::backend::ContextConfig;
use crate::renderer::RenderSettings;

/// Root configuration structure
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub renderer: RendererConfig,
    pub device: DeviceConfig,
    pub debug: DebugConfig,
}

/// Renderer settings
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    pub app_name: String,
    pub threaded: bool,
    pub scale_factor: u32,
    pub better_polygons: bool,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            app_name: "melonDS".to_string(),
            threaded: true,
            scale_factor: 1,
            better_polygons: false,
        }
    }
}

/// GPU selection
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct DeviceConfig {
    /// Part of the device name to use, empty for automatic selection
    pub preferred: String,
}

/// Debug settings
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    pub validation_layers: bool,
    pub log_to_file: bool,
    pub log_file: String,
    pub log_level: String,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            validation_layers: true,
            log_to_file: false,
            log_file: "vulkan_debug.log".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Where the configuration came from.
///
/// Loading happens before logging is set up, so the outcome is kept and
/// reported with [`ConfigSource::log`] once a logger exists.
#[derive(Debug)]
pub enum ConfigSource {
    File(PathBuf),
    Missing(PathBuf),
    Invalid { path: PathBuf, error: anyhow::Error },
}

impl ConfigSource {
    pub fn log(&self) {
        match self {
            ConfigSource::File(path) => log::info!("Loaded configuration from {:?}", path),
            ConfigSource::Missing(path) => {
                log::info!("Config file not found at {:?}, using defaults", path)
            }
            ConfigSource::Invalid { path, error } => {
                log::warn!("Failed to load {:?}: {:#}. Using defaults.", path, error)
            }
        }
    }
}

impl Config {
    pub const DEFAULT_PATH: &'static str = "config.toml";

    /// Load config.toml, falling back to defaults if missing or broken.
    ///
    /// Logs the outcome right away; use [`Config::load_with_source`] when
    /// no logger is installed yet.
    pub fn load() -> Self {
        let (config, source) = Self::load_with_source(Self::DEFAULT_PATH);
        source.log();
        config
    }

    /// Load from `path`, never failing: errors turn into defaults and are
    /// described by the returned source
    pub fn load_with_source<P: AsRef<Path>>(path: P) -> (Self, ConfigSource) {
        let path = path.as_ref();

        if !path.exists() {
            return (Config::default(), ConfigSource::Missing(path.to_path_buf()));
        }

        match Self::load_from_path(path) {
            Ok(config) => (config, ConfigSource::File(path.to_path_buf())),
            Err(error) => (
                Config::default(),
                ConfigSource::Invalid {
                    path: path.to_path_buf(),
                    error,
                },
            ),
        }
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        Self::parse(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn render_settings(&self) -> RenderSettings {
        RenderSettings {
            threaded: self.renderer.threaded,
            scale_factor: self.renderer.scale_factor,
            better_polygons: self.renderer.better_polygons,
        }
        .sanitized()
    }

    pub fn context_config(&self) -> ContextConfig {
        let preferred = self.device.preferred.trim();
        ContextConfig {
            app_name: self.renderer.app_name.clone(),
            validation: self.debug.validation_layers,
            preferred_device: (!preferred.is_empty()).then(|| preferred.to_string()),
        }
    }

    /// Configured log level, None if `log_level` isn't a level name
    pub fn log_level(&self) -> Option<LevelFilter> {
        match self.debug.log_level.to_lowercase().as_str() {
            "off" => Some(LevelFilter::Off),
            "error" => Some(LevelFilter::Error),
            "warn" => Some(LevelFilter::Warn),
            "info" => Some(LevelFilter::Info),
            "debug" => Some(LevelFilter::Debug),
            "trace" => Some(LevelFilter::Trace),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.renderer.app_name, "melonDS");
        assert_eq!(config.render_settings(), RenderSettings::default());
        assert!(config.context_config().preferred_device.is_none());
        assert_eq!(config.log_level(), Some(LevelFilter::Info));
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = Config::parse(
            r#"
            [renderer]
            scale_factor = 3

            [device]
            preferred = "  Radeon "

            [debug]
            log_level = "Debug"
            "#,
        )
        .unwrap();

        assert_eq!(config.renderer.scale_factor, 3);
        assert!(config.renderer.threaded);
        assert_eq!(config.context_config().preferred_device.as_deref(), Some("Radeon"));
        assert!(config.debug.validation_layers);
        assert_eq!(config.log_level(), Some(LevelFilter::Debug));
    }

    #[test]
    fn zero_scale_factor_is_clamped() {
        let config = Config::parse("[renderer]\nscale_factor = 0\n").unwrap();
        assert_eq!(config.render_settings().scale_factor, 1);
    }

    #[test]
    fn unknown_log_level_is_reported() {
        let config = Config::parse("[debug]\nlog_level = \"loud\"\n").unwrap();
        assert_eq!(config.log_level(), None);
    }

    #[test]
    fn invalid_toml_is_an_error() {
        assert!(Config::parse("[renderer\nscale_factor = ").is_err());
        assert!(Config::parse("[renderer]\nscale_factor = \"big\"").is_err());
    }

    #[test]
    fn missing_file_gives_defaults() {
        let config = Config::load_from_path("definitely/not/here/config.toml").unwrap();
        assert_eq!(config.debug.log_file, "vulkan_debug.log");

        let (config, source) = Config::load_with_source("definitely/not/here/config.toml");
        assert!(matches!(source, ConfigSource::Missing(_)));
        assert_eq!(config.renderer.app_name, "melonDS");
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[renderer\nscale_factor = ").unwrap();

        assert!(Config::load_from_path(&path).is_err());

        let (config, source) = Config::load_with_source(&path);
        assert_eq!(config.renderer.scale_factor, 1);
        assert_eq!(config.log_level(), Some(LevelFilter::Info));
        match source {
            ConfigSource::Invalid { path: bad, error } => {
                assert_eq!(bad, path);
                assert!(format!("{:#}", error).contains("Failed to parse config file"));
            }
            other => panic!("expected an invalid source, got {:?}", other),
        }
    }

    #[test]
    fn valid_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[device]\npreferred = \"RTX\"\n").unwrap();

        let (config, source) = Config::load_with_source(&path);
        assert!(matches!(source, ConfigSource::File(_)));
        assert_eq!(config.device.preferred, "RTX");
    }
}
