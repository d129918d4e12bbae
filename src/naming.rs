//! Filename handling for user-supplied names.
//!
//! Names arrive from requests and command lines and end up in paths on
//! disk, so they are reduced to a safe alphabet first:
//!
//! - `"../../etc/passwd"` → `"passwd"` (directory parts dropped)
//! - `"My Photo (1).JPG"` → `"My_Photo_1_.JPG"`
//! - `".hidden.png"` → `"hidden.png"`
//! - `"???"` → `"image.jpg"` (nothing usable left)
//!
//! Derived names:
//! - download name: `gps_updated_<name>`
//! - carrier stem: the sanitised stem, used to seed `<stem>_<random>_converted.jpg`

use std::path::{Path, PathBuf};

pub const FALLBACK_FILENAME: &str = "image.jpg";

pub const DOWNLOAD_PREFIX: &str = "gps_updated_";

/// Reduce `name` to ASCII alphanumerics, `-`, `_` and `.`.
///
/// Runs of any other character collapse into a single `_`. Leading dots and
/// underscores are stripped so the result is never hidden or relative.
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);

    let mut out = String::with_capacity(base.len());
    let mut prev_replaced = false;
    for c in base.chars() {
        if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
            out.push(c);
            prev_replaced = false;
        } else {
            if !prev_replaced {
                out.push('_');
            }
            prev_replaced = true;
        }
    }

    let trimmed = out.trim_start_matches(['.', '_']).trim_end_matches('_');
    if trimmed.chars().any(|c| c.is_ascii_alphanumeric()) {
        trimmed.to_string()
    } else {
        FALLBACK_FILENAME.to_string()
    }
}

/// Name offered for the geotagged download.
pub fn download_name(filename: &str) -> String {
    format!("{DOWNLOAD_PREFIX}{}", sanitize_filename(filename))
}

/// Sanitised stem used to name transient carrier files.
pub fn carrier_stem(filename: &str) -> String {
    let safe = sanitize_filename(filename);
    match Path::new(&safe).file_stem().and_then(|s| s.to_str()) {
        Some(stem) if !stem.is_empty() => stem.to_string(),
        _ => "image".to_string(),
    }
}

/// Default output path for `set-gps`: `gps_updated_<stem>.jpg` beside the input.
///
/// The writer always produces JPEG, so the extension is forced to `.jpg`.
pub fn default_output_path(input: &Path) -> PathBuf {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let file = format!("{DOWNLOAD_PREFIX}{}.jpg", carrier_stem(&name));
    match input.parent() {
        Some(dir) => dir.join(file),
        None => PathBuf::from(file),
    }
}
