//! Design options and engine configuration.
//!
//! Two layers live here:
//!
//! - [`DesignOptions`]: the per-call styling input. It keeps colors, pattern
//!   style and error correction as raw strings so that a bad value surfaces
//!   as a [`ValidationError`] naming the field, not as a parse failure.
//!   [`DesignOptions::validate`] turns it into the typed [`Design`] that the
//!   renderer and compositor consume.
//! - [`EngineConfig`]: the `vcard-qr.toml` file used by the CLI. It carries a
//!   `[design]` table plus engine knobs that are not part of a single design.
//!
//! ## Config File
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [design]
//! module_color = "#0f50b5"
//! eye_color = "#ff4d26"
//! background_color = "#ffffff"
//! pattern_style = "dots"      # square, rounded, dots, gapped, vertical, horizontal
//! error_correction = "Q"      # L, M, Q, H
//! box_size = 10               # pixels per module, 1-100
//! border = 4                  # quiet zone, in modules, 0-100
//! # logo_url = "assets/logo.png"
//! logo_size = 0.23
//! logo_background = true
//! logo_round = true
//!
//! [logo]
//! fetch_timeout_secs = 3
//!
//! [processing]
//! max_processes = 4           # batch workers (omit for auto = CPU cores)
//! ```
//!
//! Files are sparse: stock defaults are serialized to a TOML table and the
//! user file is merged over it key by key. Unknown keys are rejected.

use crate::error::ValidationError;
use crate::imaging::{Color, LogoParams, PatternStyle};
use crate::matrix::EcLevel;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Largest accepted `box_size`, in pixels.
pub const MAX_BOX_SIZE: u32 = 100;

/// Largest accepted `border`, in modules.
pub const MAX_BORDER: u32 = 100;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("design: {0}")]
    Design(#[from] ValidationError),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Styling options for one synthesis call.
///
/// Construct with [`DesignOptions::default`] and override fields; there is no
/// process-wide default state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DesignOptions {
    pub module_color: String,
    pub eye_color: String,
    pub background_color: String,
    pub pattern_style: String,
    pub error_correction: String,
    pub box_size: u32,
    pub border: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    pub logo_size: f32,
    pub logo_background: bool,
    pub logo_round: bool,
}

impl Default for DesignOptions {
    fn default() -> Self {
        Self {
            module_color: "#0f50b5".into(),
            eye_color: "#ff4d26".into(),
            background_color: "#FFFFFF".into(),
            pattern_style: "dots".into(),
            error_correction: "Q".into(),
            box_size: 10,
            border: 4,
            logo_url: None,
            logo_size: 0.23,
            logo_background: true,
            logo_round: true,
        }
    }
}

/// Validated, typed design.
#[derive(Debug, Clone, PartialEq)]
pub struct Design {
    pub module_color: Color,
    pub eye_color: Color,
    pub background_color: Color,
    pub pattern_style: PatternStyle,
    pub error_correction: EcLevel,
    pub box_size: u32,
    pub border: u32,
    /// `None` when no logo location is set.
    pub logo: Option<LogoParams>,
}

impl DesignOptions {
    /// Check every option and build the typed [`Design`].
    ///
    /// Fields are checked in declaration order; the first bad one is reported.
    pub fn validate(&self) -> Result<Design, ValidationError> {
        let module_color = parse_color("module_color", &self.module_color)?;
        let eye_color = parse_color("eye_color", &self.eye_color)?;
        let background_color = parse_color("background_color", &self.background_color)?;

        let pattern_style = self
            .pattern_style
            .parse::<PatternStyle>()
            .map_err(|()| ValidationError::UnknownPatternStyle(self.pattern_style.clone()))?;
        let error_correction = self
            .error_correction
            .parse::<EcLevel>()
            .map_err(ValidationError::UnknownErrorCorrection)?;

        if self.box_size == 0 || self.box_size > MAX_BOX_SIZE {
            return Err(ValidationError::BoxSize {
                value: self.box_size,
                max: MAX_BOX_SIZE,
            });
        }
        if self.border > MAX_BORDER {
            return Err(ValidationError::Border {
                value: self.border,
                max: MAX_BORDER,
            });
        }
        if !(self.logo_size > 0.0 && self.logo_size < 1.0) {
            return Err(ValidationError::LogoSize(self.logo_size));
        }

        let logo = self
            .logo_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(|location| LogoParams {
                location: location.to_string(),
                size: self.logo_size,
                background: self.logo_background,
                round: self.logo_round,
            });

        Ok(Design {
            module_color,
            eye_color,
            background_color,
            pattern_style,
            error_correction,
            box_size: self.box_size,
            border: self.border,
            logo,
        })
    }
}

fn parse_color(field: &'static str, value: &str) -> Result<Color, ValidationError> {
    value.parse::<Color>().map_err(|()| ValidationError::InvalidColor {
        field,
        value: value.to_string(),
    })
}

/// Contents of `vcard-qr.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Design used by `generate` and `batch`.
    pub design: DesignOptions,
    /// Logo fetch settings.
    pub logo: LogoConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl EngineConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.design.validate()?;
        if self.logo.fetch_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "logo.fetch_timeout_secs must be greater than 0".into(),
            ));
        }
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Logo fetch settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogoConfig {
    /// Upper bound on a remote logo download, in seconds.
    pub fetch_timeout_secs: u64,
}

impl Default for LogoConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_secs: 3,
        }
    }
}

impl LogoConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel batch workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged onto.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(EngineConfig::default())?)
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

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<EngineConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: EngineConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the engine config.
///
/// With no path, returns the validated stock defaults. With a path, the file
/// must exist; its values are merged over the defaults.
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            Some(toml::from_str::<toml::Value>(&content)?)
        }
        None => None,
    };
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `vcard-qr.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# vcard-qr Configuration
# ======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Design
# ---------------------------------------------------------------------------
[design]
# Colors as six hex digits, with or without a leading '#'.
module_color = "#0f50b5"
eye_color = "#ff4d26"
background_color = "#FFFFFF"

# Shape of data modules: square, rounded, dots (alias circle), gapped,
# vertical, horizontal.
pattern_style = "dots"

# Requested error correction: L, M, Q or H. Long records may be encoded at a
# weaker level than requested; the level actually used is reported.
error_correction = "Q"

# Pixels per module (1-100) and quiet-zone width in modules (0-100).
box_size = 10
border = 4

# Optional logo placed at the center: a local path or an http(s) URL.
# logo_url = "assets/logo.png"

# Logo side as a fraction of the QR width, strictly between 0 and 1.
logo_size = 0.23

# Put the logo on an opaque white square.
logo_background = true

# Crop the logo to a circle.
logo_round = true

# ---------------------------------------------------------------------------
# Logo fetching
# ---------------------------------------------------------------------------
[logo]
# Upper bound on downloading a remote logo. On timeout the code is produced
# without a logo.
fetch_timeout_secs = 3

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel workers for `batch`.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
