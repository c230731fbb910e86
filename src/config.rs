//! Configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults are
//! serialised to a TOML value, the user's file is merged over it key by key,
//! and the result is deserialised and validated. Command-line flags override
//! whatever the file says.
//!
//! ## Config File Location
//!
//! `config.toml` is read from the directory given by `--config` (default: the
//! current directory). A missing file means stock defaults.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [frame]
//! color = "#FFFFFF"          # Hex, palette name, or "none" for no frame
//! thickness_percent = 1.0    # Of the short edge; never thinner than 5 px
//!
//! [output]
//! jpeg_quality = 92          # 1-100
//! circular = true            # Produce the 1x1_circle PNG
//!
//! [export]
//! mode = "archive"           # "archive" or "sequential"
//! stagger_ms = 500           # Delay between sequential saves
//! archive_name = "cropped-images.zip"
//!
//! [preview]
//! debounce_ms = 100          # Settle time before a preview renders
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse. Override just the values you want:
//!
//! ```toml
//! [frame]
//! color = "purple"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::export::DeliveryMode;
use crate::imaging::{FrameColor, Quality};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `config.toml`.
///
/// All fields have defaults. User config files need only specify the values
/// they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Frame stroke for the square variants.
    pub frame: FrameConfig,
    /// Encoding and variant selection.
    pub output: OutputConfig,
    /// Delivery settings.
    pub export: ExportConfig,
    /// Interactive preview settings.
    pub preview: PreviewConfig,
}

impl Config {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.frame.frame_color()?;
        let pct = self.frame.thickness_percent;
        if !pct.is_finite() || pct < 0.0 {
            return Err(ConfigError::Validation(
                "frame.thickness_percent must be a non-negative number".into(),
            ));
        }
        if !(1..=100).contains(&self.output.jpeg_quality) {
            return Err(ConfigError::Validation(
                "output.jpeg_quality must be 1-100".into(),
            ));
        }
        if self.export.archive_name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "export.archive_name must not be empty".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FrameConfig {
    /// Colour string; see [`FrameColor`] for accepted forms. `"none"` disables.
    pub color: String,
    pub thickness_percent: f32,
}

impl FrameConfig {
    pub fn frame_color(&self) -> Result<Option<FrameColor>, ConfigError> {
        FrameColor::parse_optional(&self.color)
            .map_err(|e| ConfigError::Validation(format!("frame.color: {e}")))
    }
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            color: FrameColor::WHITE.to_hex(),
            thickness_percent: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub jpeg_quality: u32,
    pub circular: bool,
}

impl OutputConfig {
    pub fn quality(&self) -> Quality {
        Quality::new(self.jpeg_quality)
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: 92,
            circular: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    pub mode: DeliveryMode,
    pub stagger_ms: u64,
    pub archive_name: String,
}

impl ExportConfig {
    pub fn stagger(&self) -> Duration {
        Duration::from_millis(self.stagger_ms)
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            mode: DeliveryMode::Archive,
            stagger_ms: 500,
            archive_name: "cropped-images.zip".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PreviewConfig {
    pub debounce_ms: u64,
}

impl PreviewConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self { debounce_ms: 100 }
    }
}

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged onto.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(Config::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the directory has no `config.toml`.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<Config, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: Config = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given directory.
pub fn load_config(dir: &Path) -> Result<Config, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(dir)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `config.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# multicrop configuration
# =======================
# All settings are optional. Remove any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.
# Command-line flags override these values.

# ---------------------------------------------------------------------------
# Frame stroke drawn on the 1x1_framed and 1x1_circle variants.
# ---------------------------------------------------------------------------
[frame]
# Hex (#RGB, #RRGGBB, #RRGGBBAA), a palette name
# (red, blue, green, yellow, purple, white, black), or "none".
color = "#FFFFFF"
# Percentage of the short edge. The stroke is never thinner than 5 px.
thickness_percent = 1.0

# ---------------------------------------------------------------------------
# Encoding
# ---------------------------------------------------------------------------
[output]
# JPEG quality (1-100). PNG output is lossless.
jpeg_quality = 92
# Also produce the circular PNG of the square crop.
circular = true

# ---------------------------------------------------------------------------
# Delivery
# ---------------------------------------------------------------------------
[export]
# "archive": one ZIP holding every file.
# "sequential": one file per variant, saved stagger_ms apart.
mode = "archive"
stagger_ms = 500
archive_name = "cropped-images.zip"

# ---------------------------------------------------------------------------
# Interactive preview
# ---------------------------------------------------------------------------
[preview]
# How long the crop must stay still before a preview renders.
debounce_ms = 100
"##
}
