//! Full metadata extraction.
//!
//! Reads an image's EXIF container and sorts every primary-image tag into
//! the sections of an [`ExtractionResult`]:
//!
//! | Section | Contents |
//! |---|---|
//! | `image` | `width`, `height`, `format`, `mode` (from the image header), `file_size`, `Orientation` |
//! | `camera` | `Make`, `Model`, `LensMake`, `LensModel`, `ISO`, `Aperture`, `ShutterSpeed`, `FocalLength`, `Flash`, `WhiteBalance`, `ExposureMode` |
//! | `datetime` | `DateTime`, `DateTimeOriginal`, `DateTimeDigitized` |
//! | `other` | `Software` and everything else, as text |
//! | `gps_auxiliary` | GPS tags other than the four core fields |
//!
//! ## Failure policy
//!
//! Extraction never fails on metadata problems. A corrupt EXIF block yields
//! the header-derived `image` section only; an undecodable GPS block yields
//! `has_gps = false` with the raw block kept under `gps_auxiliary.debug_raw_data`.
//! Only reading the file itself can fail ([`extract_file`]).
//!
//! This is the one place on the read path that logs: the GPS codec and
//! locator return typed outcomes and the reasons are reported here.

use crate::gps::{self, GpsBlock, GpsOutcome, NoGpsReason, RawValue};
use crate::imaging::container::{self, is_generated_tag};
use crate::imaging::{ImageBackend, RustBackend};
use crate::types::{ExtractionResult, ImageValue};
use exif::{Context, Exif, Field, In, Tag, Value};
use log::{debug, info, warn};
use std::path::Path;

/// Byte and undefined values longer than this are binary payloads (maker
/// notes, embedded previews) and are left out of `other`.
const MAX_BLOB_LEN: usize = 256;

/// Key under which the raw GPS block is kept when it could not be decoded.
pub const DEBUG_RAW_KEY: &str = "debug_raw_data";

/// Extract metadata from a file on disk.
pub fn extract_file(path: &Path) -> Result<ExtractionResult, std::io::Error> {
    let bytes = std::fs::read(path)?;
    debug!("Extracting {} ({} bytes)", path.display(), bytes.len());
    Ok(extract(&bytes))
}

/// Extract metadata from in-memory image bytes using the default backend.
pub fn extract(bytes: &[u8]) -> ExtractionResult {
    extract_bytes(bytes, &RustBackend::new())
}

/// Extract metadata using a custom backend (for testing).
pub fn extract_bytes(bytes: &[u8], backend: &impl ImageBackend) -> ExtractionResult {
    let mut result = ExtractionResult::default();
    result
        .image
        .insert("file_size".to_string(), ImageValue::from(bytes.len() as u64));

    match backend.identify(bytes) {
        Ok(info) => {
            result.image.insert("width".to_string(), info.width.into());
            result.image.insert("height".to_string(), info.height.into());
            result.image.insert("format".to_string(), info.format.into());
            result.image.insert("mode".to_string(), info.mode.into());
        }
        Err(e) => debug!("Image header not decodable: {e}"),
    }

    let exif = match container::read_exif(bytes) {
        Ok(Some(exif)) => exif,
        Ok(None) => return result,
        Err(e) => {
            warn!("EXIF unreadable, returning image info only: {e}");
            return result;
        }
    };

    categorize(&exif, &mut result);

    let block = container::gps_block(&exif);
    if !block.is_empty() {
        apply_gps(&block, &mut result);
    }
    result
}

/// Fill the GPS fields of `result` from a GPS block.
///
/// Exposed separately so blocks that come from elsewhere (JSON dumps using
/// named or namespaced keys) go through the same reporting.
pub fn apply_gps(block: &GpsBlock, result: &mut ExtractionResult) {
    result.gps_auxiliary.extend(gps::auxiliary(block));

    match gps::locate(block) {
        GpsOutcome::Located(fix) => {
            if fix.near_zero {
                warn!(
                    "GPS coordinates suspiciously close to zero: ({}, {})",
                    fix.latitude, fix.longitude
                );
            }
            info!(
                "GPS located via {:?} keys: ({}, {})",
                fix.scheme, fix.latitude, fix.longitude
            );
            result.has_gps = true;
            result.latitude = Some(fix.latitude);
            result.longitude = Some(fix.longitude);
        }
        GpsOutcome::NoGpsData(NoGpsReason::NullIsland) => {
            info!("GPS block holds the (0, 0) placeholder, treating as absent");
        }
        GpsOutcome::NoGpsData(reason) => {
            warn!("Failed to extract GPS coordinates: {reason}");
            let raw = serde_json::to_string(block).unwrap_or_default();
            debug!("Raw GPS block: {raw}");
            result.gps_auxiliary.insert(DEBUG_RAW_KEY.to_string(), raw);
        }
    }
}

/// Sort primary-image, non-GPS fields into their sections.
fn categorize(exif: &Exif, result: &mut ExtractionResult) {
    for field in exif.fields() {
        if field.ifd_num != In::PRIMARY
            || field.tag.context() == Context::Gps
            || is_generated_tag(field.tag)
            || matches!(field.value, Value::Unknown(..))
        {
            continue;
        }
        categorize_field(field, result);
    }
}

fn categorize_field(field: &Field, result: &mut ExtractionResult) {
    let text = || render(&field.value);
    match field.tag {
        Tag::Make | Tag::Model | Tag::LensMake | Tag::LensModel => {
            result.camera.insert(field.tag.to_string(), text());
        }
        Tag::PhotographicSensitivity => {
            result.camera.insert("ISO".to_string(), text());
        }
        Tag::FNumber => {
            let aperture = match first_ratio(&field.value) {
                Some(f) => format!("f/{f:.1}"),
                None => format!("f/{}", text()),
            };
            result.camera.insert("Aperture".to_string(), aperture);
        }
        Tag::ExposureTime => {
            let shutter = match &field.value {
                Value::Rational(r) if !r.is_empty() && r[0].num == 1 => {
                    format!("1/{}s", r[0].denom)
                }
                Value::Rational(r) if !r.is_empty() => format!("{}/{}s", r[0].num, r[0].denom),
                _ => text(),
            };
            result.camera.insert("ShutterSpeed".to_string(), shutter);
        }
        Tag::FocalLength => {
            let focal = match first_ratio(&field.value) {
                Some(mm) => format!("{mm:.1}mm"),
                None => format!("{}mm", text()),
            };
            result.camera.insert("FocalLength".to_string(), focal);
        }
        Tag::Flash => {
            let flash = match field.value.get_uint(0) {
                Some(0) => "No Flash".to_string(),
                Some(1) => "Fired".to_string(),
                Some(5) => "Fired, No Return".to_string(),
                Some(7) => "Fired, Return".to_string(),
                _ => format!("Mode {}", text()),
            };
            result.camera.insert("Flash".to_string(), flash);
        }
        Tag::WhiteBalance => {
            let wb = match field.value.get_uint(0) {
                Some(0) => "Auto".to_string(),
                Some(1) => "Manual".to_string(),
                _ => text(),
            };
            result.camera.insert("WhiteBalance".to_string(), wb);
        }
        Tag::ExposureMode => {
            let mode = match field.value.get_uint(0) {
                Some(0) => "Auto".to_string(),
                Some(1) => "Manual".to_string(),
                Some(2) => "Auto Bracket".to_string(),
                _ => text(),
            };
            result.camera.insert("ExposureMode".to_string(), mode);
        }
        Tag::DateTime | Tag::DateTimeOriginal | Tag::DateTimeDigitized => {
            result.datetime.insert(field.tag.to_string(), text());
        }
        Tag::Orientation => {
            let orientation = field
                .value
                .get_uint(0)
                .and_then(orientation_name)
                .map(str::to_string)
                .unwrap_or_else(text);
            result
                .image
                .insert("Orientation".to_string(), ImageValue::Text(orientation));
        }
        _ => {
            if is_large_blob(&field.value) {
                return;
            }
            result.other.insert(field.tag.to_string(), text());
        }
    }
}

fn orientation_name(value: u32) -> Option<&'static str> {
    Some(match value {
        1 => "Normal",
        2 => "Mirrored",
        3 => "Rotated 180°",
        4 => "Mirrored & Rotated 180°",
        5 => "Mirrored & Rotated 270°",
        6 => "Rotated 90°",
        7 => "Mirrored & Rotated 90°",
        8 => "Rotated 270°",
        _ => return None,
    })
}

fn first_ratio(value: &Value) -> Option<f64> {
    match value {
        Value::Rational(r) => r.first().filter(|x| x.denom != 0).map(|x| x.to_f64()),
        Value::SRational(r) => r.first().filter(|x| x.denom != 0).map(|x| x.to_f64()),
        _ => None,
    }
}

fn is_large_blob(value: &Value) -> bool {
    match value {
        Value::Undefined(bytes, _) => bytes.len() > MAX_BLOB_LEN,
        Value::Byte(bytes) => bytes.len() > MAX_BLOB_LEN,
        _ => false,
    }
}

/// Plain text form of a value: strings unquoted and NUL-trimmed, numbers as written.
fn render(value: &Value) -> String {
    RawValue::from(value).to_string().trim().to_string()
}
