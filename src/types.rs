//! Types exchanged at the library boundary.
//!
//! These are serialized to JSON by the CLI (`extract --json`, `apply`) and
//! are the shapes an HTTP front end would send and receive.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Value in the `image` section: dimensions and sizes are integers, the rest text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImageValue {
    Int(u64),
    Text(String),
}

impl From<u64> for ImageValue {
    fn from(n: u64) -> Self {
        ImageValue::Int(n)
    }
}

impl From<u32> for ImageValue {
    fn from(n: u32) -> Self {
        ImageValue::Int(u64::from(n))
    }
}

impl From<String> for ImageValue {
    fn from(s: String) -> Self {
        ImageValue::Text(s)
    }
}

impl From<&str> for ImageValue {
    fn from(s: &str) -> Self {
        ImageValue::Text(s.to_string())
    }
}

impl std::fmt::Display for ImageValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImageValue::Int(n) => write!(f, "{n}"),
            ImageValue::Text(s) => f.write_str(s),
        }
    }
}

/// Everything read from one image.
///
/// `latitude`/`longitude` are at full precision; rounding is a display concern.
/// Sections are always present, possibly empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub has_gps: bool,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub camera: BTreeMap<String, String>,
    pub image: BTreeMap<String, ImageValue>,
    pub datetime: BTreeMap<String, String>,
    pub other: BTreeMap<String, String>,
    pub gps_auxiliary: BTreeMap<String, String>,
}

/// Request to geotag an image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateRequest {
    /// Base64-encoded image bytes.
    pub image: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default = "default_filename")]
    pub filename: String,
}

fn default_filename() -> String {
    crate::naming::FALLBACK_FILENAME.to_string()
}

/// Structured failure returned instead of image bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateFailure {
    pub error: String,
}
