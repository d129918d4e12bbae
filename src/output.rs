//! CLI output formatting.
//!
//! # Extract
//!
//! Each image leads with its positional index and file name; coordinates
//! come first (rounded to 6 decimals with a map link), then each non-empty
//! metadata section as indented `key: value` lines.
//!
//! ```text
//! 001 beach.jpg
//!     GPS: 40.446111, -79.982222
//!     Map: https://www.google.com/maps?q=40.446111,-79.982222
//!     Image
//!         file_size: 48213
//!         format: JPEG
//!     Camera
//!         Make: Acme
//! 002 scan.png
//!     GPS: none
//! ```
//!
//! # Set GPS
//!
//! ```text
//! beach.png → gps_updated_beach.jpg (converted to JPEG)
//!     GPS: 48.858400, 2.294500
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::types::ExtractionResult;
use std::collections::BTreeMap;
use std::fmt::Display;
use std::path::Path;

/// Decimal places shown for coordinates (about 0.1 m).
pub const DISPLAY_DECIMALS: i32 = 6;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Round a coordinate for display.
pub fn round_coordinate(value: f64) -> f64 {
    let scale = 10f64.powi(DISPLAY_DECIMALS);
    (value * scale).round() / scale
}

pub fn maps_link(latitude: f64, longitude: f64) -> String {
    format!(
        "https://www.google.com/maps?q={:.6},{:.6}",
        round_coordinate(latitude),
        round_coordinate(longitude)
    )
}

fn section<V: Display>(title: &str, entries: &BTreeMap<String, V>, lines: &mut Vec<String>) {
    if entries.is_empty() {
        return;
    }
    lines.push(format!("{}{}", indent(1), title));
    for (key, value) in entries {
        lines.push(format!("{}{}: {}", indent(2), key, value));
    }
}

// ============================================================================
// Extract
// ============================================================================

/// Format one extraction result as display lines.
pub fn format_extraction(index: usize, source: &Path, result: &ExtractionResult) -> Vec<String> {
    let name = source
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| source.display().to_string());
    let mut lines = vec![format!("{} {}", format_index(index), name)];

    match (result.has_gps, result.latitude, result.longitude) {
        (true, Some(lat), Some(lon)) => {
            lines.push(format!(
                "{}GPS: {:.6}, {:.6}",
                indent(1),
                round_coordinate(lat),
                round_coordinate(lon)
            ));
            lines.push(format!("{}Map: {}", indent(1), maps_link(lat, lon)));
        }
        _ => lines.push(format!("{}GPS: none", indent(1))),
    }

    section("Image", &result.image, &mut lines);
    section("Camera", &result.camera, &mut lines);
    section("Date/Time", &result.datetime, &mut lines);
    section("GPS (other)", &result.gps_auxiliary, &mut lines);
    section("Other", &result.other, &mut lines);
    lines
}

/// Print one extraction result to stdout.
pub fn print_extraction(index: usize, source: &Path, result: &ExtractionResult) {
    for line in format_extraction(index, source, result) {
        println!("{}", line);
    }
}

/// JSON view of an extraction: coordinates rounded, plus a map link.
pub fn extraction_json(source: &Path, result: &ExtractionResult) -> serde_json::Value {
    let mut value = serde_json::json!({
        "file": source.display().to_string(),
        "has_gps": result.has_gps,
        "latitude": result.latitude.map(round_coordinate),
        "longitude": result.longitude.map(round_coordinate),
        "camera": result.camera,
        "image": result.image,
        "datetime": result.datetime,
        "other": result.other,
        "gps_auxiliary": result.gps_auxiliary,
    });
    if let (Some(lat), Some(lon)) = (result.latitude, result.longitude) {
        value["maps_url"] = serde_json::Value::String(maps_link(lat, lon));
    }
    value
}

/// Line for a file that could not be read.
pub fn format_read_failure(index: usize, source: &Path, error: &dyn Display) -> Vec<String> {
    vec![
        format!("{} {}", format_index(index), source.display()),
        format!("{}Error: {}", indent(1), error),
    ]
}

// ============================================================================
// Set GPS
// ============================================================================

/// Format the result of writing a geotag.
pub fn format_written(
    input: &Path,
    output: &Path,
    latitude: f64,
    longitude: f64,
    converted: bool,
) -> Vec<String> {
    let mut header = format!("{} \u{2192} {}", input.display(), output.display());
    if converted {
        header.push_str(" (converted to JPEG)");
    }
    vec![
        header,
        format!(
            "{}GPS: {:.6}, {:.6}",
            indent(1),
            round_coordinate(latitude),
            round_coordinate(longitude)
        ),
    ]
}

pub fn print_written(input: &Path, output: &Path, latitude: f64, longitude: f64, converted: bool) {
    for line in format_written(input, output, latitude, longitude, converted) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ImageValue;

    fn located() -> ExtractionResult {
        let mut result = ExtractionResult {
            has_gps: true,
            latitude: Some(40.446_111_123),
            longitude: Some(-79.982_222_987),
            ..ExtractionResult::default()
        };
        result
            .image
            .insert("format".to_string(), ImageValue::from("JPEG"));
        result
            .camera
            .insert("Make".to_string(), "Acme".to_string());
        result
    }

    #[test]
    fn format_index_pads() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(123), "123");
    }

    #[test]
    fn rounding_to_six_places() {
        assert_eq!(round_coordinate(40.446_111_123), 40.446_111);
        assert_eq!(round_coordinate(-79.982_222_987), -79.982_223);
        assert_eq!(round_coordinate(0.0), 0.0);
    }

    #[test]
    fn extraction_with_gps() {
        let lines = format_extraction(1, Path::new("/photos/beach.jpg"), &located());
        assert_eq!(
            lines,
            vec![
                "001 beach.jpg",
                "    GPS: 40.446111, -79.982223",
                "    Map: https://www.google.com/maps?q=40.446111,-79.982223",
                "    Image",
                "        format: JPEG",
                "    Camera",
                "        Make: Acme",
            ]
        );
    }

    #[test]
    fn extraction_without_gps_skips_empty_sections() {
        let lines = format_extraction(2, Path::new("scan.png"), &ExtractionResult::default());
        assert_eq!(lines, vec!["002 scan.png", "    GPS: none"]);
    }

    #[test]
    fn json_view_rounds_and_links() {
        let json = extraction_json(Path::new("beach.jpg"), &located());
        assert_eq!(json["latitude"], 40.446111);
        assert_eq!(json["image"]["format"], "JPEG");
        assert!(json["maps_url"].as_str().unwrap().contains("q=40.446111"));

        let empty = extraction_json(Path::new("x.png"), &ExtractionResult::default());
        assert!(empty["latitude"].is_null());
        assert!(empty.get("maps_url").is_none());
    }

    #[test]
    fn written_line_mentions_conversion() {
        let lines = format_written(
            Path::new("beach.png"),
            Path::new("gps_updated_beach.jpg"),
            48.8584,
            2.2945,
            true,
        );
        assert_eq!(
            lines[0],
            "beach.png \u{2192} gps_updated_beach.jpg (converted to JPEG)"
        );
        assert_eq!(lines[1], "    GPS: 48.858400, 2.294500");
    }

    #[test]
    fn read_failure_lines() {
        let lines = format_read_failure(3, Path::new("gone.jpg"), &"No such file");
        assert_eq!(lines[1], "    Error: No such file");
    }
}
