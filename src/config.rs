//! Report configuration.
//!
//! Handles loading, validating, and merging `report.toml`. The file is
//! optional and sparse: stock defaults are the base layer and the user file
//! overrides only the keys it names.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [report]
//! title = "REPORTE FOTOGRÁFICO"          # Header title (blank = default)
//! filename = "Registro_Fotografico"      # Base name when --name is not given
//! page_label = "Página {page} de {total}" # Footer template
//!
//! [logos]
//! left = "logo_izquierdo.png"            # Relative to the config directory
//! right = "logo_derecho.png"             # "" disables the slot
//!
//! [ordering]
//! criterion = "manual"                   # manual | name | date
//! selection = "move"                     # move | swap
//!
//! [export]
//! asset_timeout_ms = 10000               # Per-asset load bound
//! clear_on_success = true                # Empty the collection after export
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::render::{DEFAULT_PAGE_LABEL, DEFAULT_TITLE};
use crate::types::{OrderingCriterion, SelectionResolution};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Name of the config file looked up in the config directory.
pub const CONFIG_FILE: &str = "report.toml";

/// Longest accepted per-asset timeout.
const MAX_ASSET_TIMEOUT_MS: u64 = 10 * 60 * 1000;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Report configuration loaded from `report.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportConfig {
    /// Title, default filename and footer text.
    pub report: ReportSection,
    /// Header logo files.
    pub logos: LogosConfig,
    /// Initial ordering and click behaviour.
    pub ordering: OrderingConfig,
    /// Export pipeline settings.
    pub export: ExportConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportSection {
    pub title: String,
    pub filename: String,
    pub page_label: String,
}

impl Default for ReportSection {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            filename: crate::naming::DEFAULT_BASE_NAME.to_string(),
            page_label: DEFAULT_PAGE_LABEL.to_string(),
        }
    }
}

/// Logo paths. An empty string means no logo on that side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogosConfig {
    pub left: String,
    pub right: String,
}

impl Default for LogosConfig {
    fn default() -> Self {
        Self {
            left: "logo_izquierdo.png".to_string(),
            right: "logo_derecho.png".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OrderingConfig {
    pub criterion: OrderingCriterion,
    pub selection: SelectionResolution,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    pub asset_timeout_ms: u64,
    pub clear_on_success: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            asset_timeout_ms: 10_000,
            clear_on_success: true,
        }
    }
}

fn resolve_logo(value: &str, base_dir: &Path) -> Option<PathBuf> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    let path = Path::new(value);
    Some(if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    })
}

impl ReportConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.export.asset_timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "export.asset_timeout_ms must be greater than 0".into(),
            ));
        }
        if self.export.asset_timeout_ms > MAX_ASSET_TIMEOUT_MS {
            return Err(ConfigError::Validation(format!(
                "export.asset_timeout_ms must be at most {MAX_ASSET_TIMEOUT_MS}"
            )));
        }
        if self.report.page_label.trim().is_empty() {
            return Err(ConfigError::Validation(
                "report.page_label must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Left and right logo paths, resolved against `base_dir`.
    pub fn logo_paths(&self, base_dir: &Path) -> (Option<PathBuf>, Option<PathBuf>) {
        (
            resolve_logo(&self.logos.left, base_dir),
            resolve_logo(&self.logos.right, base_dir),
        )
    }

    pub fn asset_timeout(&self) -> Duration {
        Duration::from_millis(self.export.asset_timeout_ms)
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(ReportConfig::default())?)
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

/// Load `report.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the directory has no `report.toml`.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join(CONFIG_FILE);
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
) -> Result<ReportConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: ReportConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `report.toml` in the given directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(dir: &Path) -> Result<ReportConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(dir)?;
    resolve_config(base, overlay)
}

/// A fully documented stock `report.toml`.
pub fn stock_config_toml() -> &'static str {
    r##"# Photo Report Configuration
# ==========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Place this file as report.toml in the directory passed with --config
# (the current directory by default). Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Document text
# ---------------------------------------------------------------------------
[report]
# Title centred in the header of every page. Blank falls back to the default.
title = "REPORTE FOTOGRÁFICO"

# Base name of the produced document when `export --name` is not given.
# The .pdf extension is always added.
filename = "Registro_Fotografico"

# Footer text. {page} and {total} are replaced with page numbers.
page_label = "Página {page} de {total}"

# ---------------------------------------------------------------------------
# Header logos
# ---------------------------------------------------------------------------
[logos]
# Paths relative to this file's directory. A missing file is skipped with a
# warning; an empty string disables the slot.
left = "logo_izquierdo.png"
right = "logo_derecho.png"

# ---------------------------------------------------------------------------
# Ordering
# ---------------------------------------------------------------------------
[ordering]
# Order applied after the images are loaded: manual, name, or date
# (date = newest first).
criterion = "manual"

# What clicking a second image does with the selected one:
#   move = take the selected image out and insert it at the clicked position
#   swap = exchange the two images
selection = "move"

# ---------------------------------------------------------------------------
# Export
# ---------------------------------------------------------------------------
[export]
# Give up on a logo or photo that takes longer than this to load (ms).
asset_timeout_ms = 10000

# Empty the collection after a successful export.
clear_on_success = true
"##
}
