//! Tool configuration module.
//!
//! Handles loading, validating, and merging `geophoto.toml`. Stock defaults
//! are serialized to a TOML table and the user file is merged on top of it,
//! so a config file only needs the keys it wants to change.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [upload]
//! max_bytes = 16777216      # Largest accepted image (16 MiB)
//! allowed_extensions = ["jpg", "jpeg", "png", "gif", "bmp", "tiff", "tif", "webp", "heic", "heif"]
//!
//! [carrier]
//! jpeg_quality = 90         # Quality of transcoded JPEG carriers (1-100)
//! # temp_dir = "/var/tmp"   # Where converted carriers live (default: system temp)
//!
//! [processing]
//! max_processes = 4         # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::Quality;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "geophoto.toml";

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

/// Tool configuration loaded from `geophoto.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeophotoConfig {
    /// Limits applied to incoming images before they reach the writer.
    pub upload: UploadConfig,
    /// Settings for transcoded JPEG carriers.
    pub carrier: CarrierConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl GeophotoConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.upload.max_bytes == 0 {
            return Err(ConfigError::Validation(
                "upload.max_bytes must be non-zero".into(),
            ));
        }
        if self.upload.allowed_extensions.is_empty() {
            return Err(ConfigError::Validation(
                "upload.allowed_extensions must not be empty".into(),
            ));
        }
        if !(1..=100).contains(&self.carrier.jpeg_quality) {
            return Err(ConfigError::Validation(
                "carrier.jpeg_quality must be 1-100".into(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Upload limits
// =============================================================================

/// 16 MiB.
pub const DEFAULT_MAX_BYTES: u64 = 16 * 1024 * 1024;

pub const DEFAULT_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "bmp", "tiff", "tif", "webp", "heic", "heif",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UploadConfig {
    pub max_bytes: u64,
    /// Lowercase extensions without the dot.
    pub allowed_extensions: Vec<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_BYTES,
            allowed_extensions: DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl UploadConfig {
    /// Whether `filename` carries an allowed extension (case-insensitive).
    ///
    /// Names without an extension are rejected.
    pub fn allows(&self, filename: &str) -> bool {
        let Some((_, ext)) = filename.rsplit_once('.') else {
            return false;
        };
        self.allowed_extensions
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(ext))
    }

    /// Reject payloads over `max_bytes`; exactly `max_bytes` is fine.
    pub fn check_size(&self, len: u64) -> Result<(), TooLarge> {
        if len > self.max_bytes {
            return Err(TooLarge {
                len,
                limit: self.max_bytes,
            });
        }
        Ok(())
    }
}

/// An upload over the configured size limit.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("File is {len} bytes, limit is {limit}")]
pub struct TooLarge {
    pub len: u64,
    pub limit: u64,
}

// =============================================================================
// Carrier settings
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CarrierConfig {
    pub jpeg_quality: u8,
    /// Directory for converted carrier files. System temp dir when absent.
    pub temp_dir: Option<PathBuf>,
}

impl Default for CarrierConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: Quality::default().value(),
            temp_dir: None,
        }
    }
}

impl CarrierConfig {
    pub fn quality(&self) -> Quality {
        Quality::new(self.jpeg_quality)
    }

    pub fn temp_dir(&self) -> PathBuf {
        self.temp_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

// =============================================================================
// Processing
// =============================================================================

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel extraction workers.
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
    config.max_processes.map(|n| n.clamp(1, cores)).unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Stock defaults as a `toml::Value::Table`, the base layer for merging.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(GeophotoConfig::default())?)
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

/// Read a config file as a raw TOML value.
///
/// `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<GeophotoConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: GeophotoConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `path`, falling back to stock defaults when it is absent.
pub fn load_config(path: &Path) -> Result<GeophotoConfig, ConfigError> {
    resolve_config(stock_defaults_value()?, load_raw_config(path)?)
}

/// A fully-commented stock `geophoto.toml`. Used by `gen-config`.
pub fn stock_config_toml() -> &'static str {
    r##"# geophoto configuration
# =====================
# All settings are optional. Values shown below are the defaults.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Upload limits
# ---------------------------------------------------------------------------
[upload]
# Largest accepted image, in bytes (16 MiB).
max_bytes = 16777216

# File extensions accepted for reading and geotagging (case-insensitive).
allowed_extensions = ["jpg", "jpeg", "png", "gif", "bmp", "tiff", "tif", "webp", "heic", "heif"]

# ---------------------------------------------------------------------------
# Converted carriers
# ---------------------------------------------------------------------------
# Images that are not JPEG are converted to JPEG before GPS data is written.
[carrier]
# JPEG quality of the converted image (1-100).
jpeg_quality = 90

# Directory for the short-lived converted file. Defaults to the system temp dir.
# temp_dir = "/var/tmp/geophoto"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel workers for multi-file extraction.
# Omit to use all CPU cores. Larger values are clamped to the core count.
# max_processes = 4
"##
}
