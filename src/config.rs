//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/sankey-tree/sankey-tree.toml`
//! 3. Explicit config file passed with `--config`
//! 4. Environment variables: `SANKEY_TREE_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::services::visibility::DEFAULT_FAN_OUT_LIMIT;
use crate::application::ApplicationError;

/// Geometry settings for the column layout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LayoutSettings {
    pub width: f64,
    pub height: f64,
    pub node_width: f64,
    pub node_padding: f64,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            width: 960.0,
            height: 576.0,
            node_width: 15.0,
            node_padding: 55.0,
        }
    }
}

/// Raw layout settings for intermediate parsing (Option to detect "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawLayoutSettings {
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub node_width: Option<f64>,
    pub node_padding: Option<f64>,
}

impl LayoutSettings {
    /// Overlay values win where specified.
    pub fn merge(&self, overlay: &RawLayoutSettings) -> Self {
        Self {
            width: overlay.width.unwrap_or(self.width),
            height: overlay.height.unwrap_or(self.height),
            node_width: overlay.node_width.unwrap_or(self.node_width),
            node_padding: overlay.node_padding.unwrap_or(self.node_padding),
        }
    }
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub fan_out_limit: Option<usize>,
    pub initial_root: Option<String>,
    pub data_file: Option<PathBuf>,
    pub layout: RawLayoutSettings,
}

/// Unified configuration for sankey-tree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Children shown individually before the rest fold into "Other"
    pub fan_out_limit: usize,
    /// Root expanded on the initial render (default: every root)
    pub initial_root: Option<String>,
    /// Data file used when none is given on the command line
    pub data_file: Option<PathBuf>,
    pub layout: LayoutSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fan_out_limit: DEFAULT_FAN_OUT_LIMIT,
            initial_root: None,
            data_file: None,
            layout: LayoutSettings::default(),
        }
    }
}

/// Get the XDG config directory for sankey-tree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "sankey-tree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("sankey-tree.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

/// Expand `~`, `$VAR` and `${VAR}` in a path string.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

impl Settings {
    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        if let Some(data_file) = &self.data_file {
            let expanded = expand_env_vars(data_file.to_string_lossy().as_ref());
            self.data_file = Some(PathBuf::from(expanded));
        }
    }

    /// Merge overlay config onto self (base); overlay wins where specified.
    pub fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            fan_out_limit: overlay.fan_out_limit.unwrap_or(self.fan_out_limit),
            initial_root: overlay
                .initial_root
                .clone()
                .or_else(|| self.initial_root.clone()),
            data_file: overlay
                .data_file
                .clone()
                .or_else(|| self.data_file.clone()),
            layout: self.layout.merge(&overlay.layout),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `config_file` - Optional explicit config file; it must exist when given
    pub fn load(config_file: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        if let Some(path) = config_file {
            if !path.exists() {
                return Err(ApplicationError::Config {
                    message: format!("config file not found: {}", path.display()),
                });
            }
            let raw = load_raw_settings(path)?;
            current = current.merge_with(&raw);
        }

        current = Self::apply_env_overrides(current)?;
        current.expand_paths();
        current.validate()?;

        Ok(current)
    }

    /// Apply SANKEY_TREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("SANKEY_TREE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_int("fan_out_limit") {
            settings.fan_out_limit = usize::try_from(val).map_err(|_| ApplicationError::Config {
                message: format!("fan_out_limit must not be negative: {val}"),
            })?;
        }
        if let Ok(val) = config.get_string("initial_root") {
            settings.initial_root = Some(val);
        }
        if let Ok(val) = config.get_string("data_file") {
            settings.data_file = Some(PathBuf::from(val));
        }
        if let Ok(val) = config.get_float("layout.width") {
            settings.layout.width = val;
        }
        if let Ok(val) = config.get_float("layout.height") {
            settings.layout.height = val;
        }
        if let Ok(val) = config.get_float("layout.node_width") {
            settings.layout.node_width = val;
        }
        if let Ok(val) = config.get_float("layout.node_padding") {
            settings.layout.node_padding = val;
        }

        Ok(settings)
    }

    /// Reject values the engine cannot work with.
    pub fn validate(&self) -> Result<(), ApplicationError> {
        if self.fan_out_limit == 0 {
            return Err(ApplicationError::Config {
                message: "fan_out_limit must be at least 1".to_string(),
            });
        }
        let layout = &self.layout;
        for (name, value) in [
            ("layout.width", layout.width),
            ("layout.height", layout.height),
            ("layout.node_width", layout.node_width),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ApplicationError::Config {
                    message: format!("{name} must be positive, got {value}"),
                });
            }
        }
        if !layout.node_padding.is_finite() || layout.node_padding < 0.0 {
            return Err(ApplicationError::Config {
                message: format!(
                    "layout.node_padding must not be negative, got {}",
                    layout.node_padding
                ),
            });
        }
        Ok(())
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# sankey-tree configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/sankey-tree/sankey-tree.toml
#   File:   --config <path>
#   Env:    SANKEY_TREE_* environment variables (SANKEY_TREE_LAYOUT__WIDTH for nested keys)

# Children shown individually before the rest fold into "Other"
# fan_out_limit = 3

# Root expanded on the initial render (default: every root)
# initial_root = "Traces"

# Data file used when none is given on the command line
# data_file = "~/data/traces.json"

[layout]
# width = 960.0
# height = 576.0
# node_width = 15.0
# node_padding = 55.0
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
