//! GPS metadata writer.
//!
//! Builds a fresh GPS block for a decimal coordinate pair and embeds it in
//! the image's EXIF container, replacing any GPS block already there.
//!
//! ```text
//! (lat, lon) ──validate+encode──▶ DmsTriple × 2          (fails: InvalidCoordinate)
//!
//! JPEG source ─────────────────────────────▶ carrier bytes
//! other source ──transcode──▶ CarrierFile ──▶ carrier bytes   (fails: EncodingFailure)
//!
//! carrier EXIF (or source EXIF) ──retain non-GPS──┐
//!                         fresh GPS fields ───────┴─▶ serialize ──▶ APP1 splice ──▶ bytes
//! ```
//!
//! JPEG is the only native carrier: its scan data is kept byte for byte and
//! only the APP1 segment changes. The rebuilt segment holds the primary IFD
//! alone, so an embedded IFD1 thumbnail is dropped. Anything else is decoded
//! and re-encoded as RGB JPEG, so source-format fidelity is not preserved for
//! those inputs, and TIFF layout tags of the source are not kept.
//!
//! Coordinates are validated before any other work. On failure nothing is
//! returned and the transient carrier (if one was created) is already gone.

use crate::config::CarrierConfig;
use crate::gps::{Axis, DmsTriple, InvalidCoordinate, encode};
use crate::imaging::container::{self, embed_in_jpeg, gps_fields, is_jpeg, serialize};
use crate::imaging::{BackendError, CarrierFile, ImageBackend, Quality, RustBackend};
use crate::naming::carrier_stem;
use exif::Field;
use log::{debug, warn};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WriteError {
    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(#[from] InvalidCoordinate),
    #[error("Encoding failed while {stage}: {source}")]
    EncodingFailure {
        stage: &'static str,
        #[source]
        source: BackendError,
    },
}

impl WriteError {
    fn encoding(stage: &'static str, source: impl Into<BackendError>) -> Self {
        WriteError::EncodingFailure {
            stage,
            source: source.into(),
        }
    }
}

/// Knobs for the non-native path.
#[derive(Debug, Clone)]
pub struct WriteOptions {
    pub quality: Quality,
    /// Directory where converted carrier files are staged.
    pub temp_dir: PathBuf,
}

impl WriteOptions {
    pub fn from_config(config: &CarrierConfig) -> Self {
        Self {
            quality: config.quality(),
            temp_dir: config.temp_dir(),
        }
    }
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self::from_config(&CarrierConfig::default())
    }
}

/// Output of a successful write.
#[derive(Debug, Clone)]
pub struct Geotagged {
    /// Complete JPEG file.
    pub bytes: Vec<u8>,
    /// The source was transcoded to obtain a JPEG carrier.
    pub converted: bool,
}

/// Geotag an image using the default backend.
pub fn write_gps(
    source: &[u8],
    filename: &str,
    latitude: f64,
    longitude: f64,
    options: &WriteOptions,
) -> Result<Geotagged, WriteError> {
    write_gps_with_backend(&RustBackend::new(), source, filename, latitude, longitude, options)
}

/// Geotag an image using a custom backend (for testing).
pub fn write_gps_with_backend(
    backend: &impl ImageBackend,
    source: &[u8],
    filename: &str,
    latitude: f64,
    longitude: f64,
    options: &WriteOptions,
) -> Result<Geotagged, WriteError> {
    let lat = encode(latitude, Axis::Latitude)?;
    let lon = encode(longitude, Axis::Longitude)?;

    if is_jpeg(source) {
        let retained = existing_fields(source, false).unwrap_or_default();
        let bytes = assemble(source, retained, &lat, &lon)?;
        debug!("Geotagged {filename} in place ({latitude}, {longitude})");
        return Ok(Geotagged {
            bytes,
            converted: false,
        });
    }

    let jpeg = backend
        .transcode_to_jpeg(source, options.quality)
        .map_err(|e| WriteError::encoding("transcoding to JPEG", e))?;
    let carrier = CarrierFile::create(&options.temp_dir, &carrier_stem(filename), &jpeg)
        .map_err(|e| WriteError::encoding("staging carrier", e))?;
    let carrier_bytes = carrier
        .read()
        .map_err(|e| WriteError::encoding("reading carrier", e))?;

    // A freshly transcoded carrier holds no EXIF; fall back to the source's.
    let retained = existing_fields(&carrier_bytes, true)
        .or_else(|| existing_fields(source, true))
        .unwrap_or_default();
    let bytes = assemble(&carrier_bytes, retained, &lat, &lon)?;
    debug!(
        "Geotagged {filename} via converted carrier ({latitude}, {longitude})"
    );
    Ok(Geotagged {
        bytes,
        converted: true,
    })
}

/// Geotag a file on disk and write the result to `output`.
///
/// The output is written only after the new bytes are fully assembled.
pub fn write_gps_file(
    input: &Path,
    output: &Path,
    latitude: f64,
    longitude: f64,
    options: &WriteOptions,
) -> Result<Geotagged, WriteError> {
    let source = std::fs::read(input).map_err(|e| WriteError::encoding("reading input", e))?;
    let filename = input
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let tagged = write_gps(&source, &filename, latitude, longitude, options)?;
    std::fs::write(output, &tagged.bytes).map_err(|e| WriteError::encoding("writing output", e))?;
    Ok(tagged)
}

/// Non-GPS fields of an image's EXIF container, if it has a readable one.
///
/// A corrupt container is not fatal here: the image gets a fresh one.
fn existing_fields(bytes: &[u8], transcoded: bool) -> Option<Vec<Field>> {
    match container::read_exif(bytes) {
        Ok(Some(exif)) => Some(container::retained_fields(&exif, transcoded)),
        Ok(None) => None,
        Err(e) => {
            warn!("Existing EXIF unreadable, starting from an empty container: {e}");
            None
        }
    }
}

fn assemble(
    carrier: &[u8],
    mut fields: Vec<Field>,
    lat: &DmsTriple,
    lon: &DmsTriple,
) -> Result<Vec<u8>, WriteError> {
    fields.extend(gps_fields(lat, lon));
    let tiff = serialize(&fields).map_err(|e| WriteError::encoding("serializing EXIF", e))?;
    embed_in_jpeg(carrier, tiff).map_err(|e| WriteError::encoding("embedding EXIF", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gps::{GpsOutcome, locate};
    use crate::imaging::backend::tests::{MockBackend, RecordedOp};
    use crate::imaging::container::{gps_block, read_exif};
    use crate::test_helpers::*;
    use exif::{In, Tag, Value};
    use tempfile::TempDir;

    fn options_in(dir: &Path) -> WriteOptions {
        WriteOptions {
            quality: Quality::new(80),
            temp_dir: dir.to_path_buf(),
        }
    }

    fn located(bytes: &[u8]) -> (f64, f64) {
        let exif = read_exif(bytes).unwrap().unwrap();
        match locate(&gps_block(&exif)) {
            GpsOutcome::Located(fix) => (fix.latitude, fix.longitude),
            other => panic!("expected a fix, got {other:?}"),
        }
    }

    fn non_gps_tags(exif: &exif::Exif) -> Vec<Tag> {
        exif.fields()
            .filter(|f| f.tag.context() != exif::Context::Gps && !container::is_generated_tag(f.tag))
            .map(|f| f.tag)
            .collect()
    }

    // =========================================================================
    // Validation
    // =========================================================================

    #[test]
    fn out_of_range_latitude_fails_before_any_work() {
        let tmp = TempDir::new().unwrap();
        let backend = MockBackend::transcoding_to(rgb_jpeg_bytes(4, 4));
        let err = write_gps_with_backend(
            &backend,
            &png_bytes(4, 4, false),
            "a.png",
            91.0,
            0.0,
            &options_in(tmp.path()),
        )
        .unwrap_err();

        assert!(matches!(
            err,
            WriteError::InvalidCoordinate(InvalidCoordinate {
                axis: Axis::Latitude,
                ..
            })
        ));
        assert!(backend.get_operations().is_empty());
        assert!(dir_entries(tmp.path()).is_empty());
    }

    #[test]
    fn out_of_range_longitude_and_nan_are_rejected() {
        let tmp = TempDir::new().unwrap();
        let jpeg = rgb_jpeg_bytes(4, 4);
        for (lat, lon) in [(0.0, 180.5), (f64::NAN, 0.0)] {
            let result = write_gps(&jpeg, "a.jpg", lat, lon, &options_in(tmp.path()));
            assert!(matches!(result, Err(WriteError::InvalidCoordinate(_))));
        }
    }

    // =========================================================================
    // Native JPEG carrier
    // =========================================================================

    #[test]
    fn jpeg_is_tagged_without_transcoding() {
        let tmp = TempDir::new().unwrap();
        let backend = MockBackend::new();
        let source = rgb_jpeg_bytes(16, 8);
        let out = write_gps_with_backend(
            &backend,
            &source,
            "a.jpg",
            40.446_111,
            -79.982_222,
            &options_in(tmp.path()),
        )
        .unwrap();

        assert!(!out.converted);
        assert!(backend.get_operations().is_empty());
        let (lat, lon) = located(&out.bytes);
        assert!((lat - 40.446_111).abs() < 1e-7);
        assert!((lon + 79.982_222).abs() < 1e-7);
    }

    #[test]
    fn existing_gps_is_replaced_and_other_tags_kept() {
        let tmp = TempDir::new().unwrap();
        let source = jpeg_with_exif(
            &rgb_jpeg_bytes(8, 8),
            &[make("Acme"), ascii_field(Tag::Model, "Z-1")],
            Some((10.0, 20.0)),
        );
        let out = write_gps(&source, "a.jpg", -33.8688, 151.2093, &options_in(tmp.path())).unwrap();

        let exif = read_exif(&out.bytes).unwrap().unwrap();
        let make = exif.get_field(Tag::Make, In::PRIMARY).unwrap();
        assert!(matches!(&make.value, Value::Ascii(v) if v == &vec![b"Acme".to_vec()]));
        assert!(exif.get_field(Tag::Model, In::PRIMARY).is_some());

        let (lat, lon) = located(&out.bytes);
        assert!((lat + 33.8688).abs() < 1e-7);
        assert!((lon - 151.2093).abs() < 1e-7);

        let lat_fields = exif
            .fields()
            .filter(|f| f.tag == Tag::GPSLatitude)
            .count();
        assert_eq!(lat_fields, 1);
    }

    #[test]
    fn version_id_is_written() {
        let tmp = TempDir::new().unwrap();
        let out = write_gps(&rgb_jpeg_bytes(4, 4), "a.jpg", 1.0, 2.0, &options_in(tmp.path())).unwrap();
        let exif = read_exif(&out.bytes).unwrap().unwrap();
        let version = exif.get_field(Tag::GPSVersionID, In::PRIMARY).unwrap();
        assert!(matches!(&version.value, Value::Byte(v) if v == &vec![2, 3, 0, 0]));
    }

    // =========================================================================
    // Converted carrier
    // =========================================================================

    #[test]
    fn png_is_converted_and_carrier_removed() {
        let tmp = TempDir::new().unwrap();
        let out = write_gps(
            &png_bytes(10, 6, true),
            "shot.png",
            48.8584,
            2.2945,
            &options_in(tmp.path()),
        )
        .unwrap();

        assert!(out.converted);
        assert!(is_jpeg(&out.bytes));
        let (lat, lon) = located(&out.bytes);
        assert!((lat - 48.8584).abs() < 1e-7);
        assert!((lon - 2.2945).abs() < 1e-7);
        assert!(dir_entries(tmp.path()).is_empty());
    }

    #[test]
    fn converted_tiff_does_not_claim_tiff_layout() {
        let tmp = TempDir::new().unwrap();
        let tiff = encoded_bytes(9, 7, image::ImageFormat::Tiff);
        let out = write_gps(&tiff, "scan.tif", -22.9519, -43.2105, &options_in(tmp.path())).unwrap();

        assert!(out.converted);
        let exif = read_exif(&out.bytes).unwrap().unwrap();
        for tag in [Tag::Compression, Tag::RowsPerStrip, Tag::BitsPerSample, Tag::ImageWidth] {
            assert!(exif.get_field(tag, In::PRIMARY).is_none(), "{tag} kept");
        }
        let (lat, _) = located(&out.bytes);
        assert!((lat + 22.9519).abs() < 1e-7);
    }

    #[test]
    fn gif_is_converted_without_existing_exif() {
        let tmp = TempDir::new().unwrap();
        let gif = encoded_bytes(6, 6, image::ImageFormat::Gif);
        let out = write_gps(&gif, "loop.gif", 1.25, 2.5, &options_in(tmp.path())).unwrap();

        assert!(out.converted);
        let exif = read_exif(&out.bytes).unwrap().unwrap();
        assert!(non_gps_tags(&exif).is_empty());
        assert_eq!(located(&out.bytes), (1.25, 2.5));
    }

    #[test]
    fn mock_transcode_uses_configured_quality() {
        let tmp = TempDir::new().unwrap();
        let backend = MockBackend::transcoding_to(rgb_jpeg_bytes(4, 4));
        let source = png_bytes(4, 4, false);
        write_gps_with_backend(&backend, &source, "x.png", 5.0, 5.0, &options_in(tmp.path()))
            .unwrap();
        assert_eq!(
            backend.get_operations(),
            vec![RecordedOp::Transcode {
                len: source.len(),
                quality: 80
            }]
        );
    }

    #[test]
    fn transcode_failure_is_encoding_failure() {
        let tmp = TempDir::new().unwrap();
        let backend = MockBackend::new();
        let err = write_gps_with_backend(
            &backend,
            b"not an image",
            "x.gif",
            5.0,
            5.0,
            &options_in(tmp.path()),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            WriteError::EncodingFailure {
                stage: "transcoding to JPEG",
                ..
            }
        ));
        assert!(dir_entries(tmp.path()).is_empty());
    }

    #[test]
    fn garbage_carrier_fails_and_is_cleaned_up() {
        let tmp = TempDir::new().unwrap();
        let backend = MockBackend::transcoding_to(b"definitely not a jpeg".to_vec());
        let err = write_gps_with_backend(
            &backend,
            &png_bytes(4, 4, false),
            "x.png",
            5.0,
            5.0,
            &options_in(tmp.path()),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            WriteError::EncodingFailure {
                stage: "embedding EXIF",
                ..
            }
        ));
        assert!(std::error::Error::source(&err).is_some());
        assert!(dir_entries(tmp.path()).is_empty());
    }

    #[test]
    fn missing_temp_dir_is_encoding_failure() {
        let tmp = TempDir::new().unwrap();
        let backend = MockBackend::transcoding_to(rgb_jpeg_bytes(4, 4));
        let err = write_gps_with_backend(
            &backend,
            &png_bytes(4, 4, false),
            "x.png",
            5.0,
            5.0,
            &options_in(&tmp.path().join("missing")),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            WriteError::EncodingFailure {
                stage: "staging carrier",
                source: BackendError::Io(_)
            }
        ));
    }

    // =========================================================================
    // File wrapper
    // =========================================================================

    #[test]
    fn write_gps_file_writes_output_only_on_success() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("in.jpg");
        std::fs::write(&input, rgb_jpeg_bytes(4, 4)).unwrap();
        let scratch = TempDir::new().unwrap();

        let bad = tmp.path().join("bad.jpg");
        assert!(write_gps_file(&input, &bad, 0.0, 999.0, &options_in(scratch.path())).is_err());
        assert!(!bad.exists());

        let good = tmp.path().join("good.jpg");
        write_gps_file(&input, &good, 12.5, -7.25, &options_in(scratch.path())).unwrap();
        let (lat, lon) = located(&std::fs::read(&good).unwrap());
        assert!((lat - 12.5).abs() < 1e-7);
        assert!((lon + 7.25).abs() < 1e-7);
    }
}
