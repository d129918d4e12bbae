//! Shared test utilities for the geophoto test suite.
//!
//! Fixtures are synthesised in memory rather than checked in: small images
//! are generated with the `image` crate and EXIF blocks are written with the
//! same serializer the production writer uses.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::test_helpers::*;
//!
//! let jpeg = jpeg_with_exif(&rgb_jpeg_bytes(16, 16), &[make("Acme")], Some((40.4461, -79.9822)));
//! let result = extract_bytes(&jpeg, &RustBackend::new());
//! assert!(result.has_gps);
//! ```

use crate::gps::{Axis, encode};
use crate::imaging::container::{embed_in_jpeg, gps_fields, serialize};
use exif::{Field, In, Tag, Value};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use std::io::Cursor;

// =========================================================================
// Image fixtures
// =========================================================================

/// A small gradient, so encoders have something non-trivial to compress.
fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 17 % 256) as u8, (y * 29 % 256) as u8, 128])
    })
}

/// Baseline RGB JPEG with no metadata segments.
pub fn rgb_jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut out = Vec::new();
    DynamicImage::ImageRgb8(gradient(width, height))
        .write_with_encoder(JpegEncoder::new_with_quality(&mut out, 90))
        .unwrap();
    out
}

/// PNG, optionally with an alpha channel.
pub fn png_bytes(width: u32, height: u32, alpha: bool) -> Vec<u8> {
    let image = if alpha {
        DynamicImage::ImageRgba8(RgbaImage::from_fn(width, height, |x, _| {
            Rgba([200, (x % 256) as u8, 10, 128])
        }))
    } else {
        DynamicImage::ImageRgb8(gradient(width, height))
    };
    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

/// The gradient encoded with the `image` crate's own encoder for `format`.
pub fn encoded_bytes(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(gradient(width, height))
        .write_to(&mut out, format)
        .unwrap();
    out.into_inner()
}

// =========================================================================
// EXIF fixtures
// =========================================================================

pub fn ascii_field(tag: Tag, text: &str) -> Field {
    Field {
        tag,
        ifd_num: In::PRIMARY,
        value: Value::Ascii(vec![text.as_bytes().to_vec()]),
    }
}

pub fn make(text: &str) -> Field {
    ascii_field(Tag::Make, text)
}

/// Embed `fields` (plus an encoded GPS block when `gps` is given) into a JPEG.
pub fn jpeg_with_exif(jpeg: &[u8], fields: &[Field], gps: Option<(f64, f64)>) -> Vec<u8> {
    let mut all: Vec<Field> = fields
        .iter()
        .map(|f| Field {
            tag: f.tag,
            ifd_num: f.ifd_num,
            value: f.value.clone(),
        })
        .collect();
    if let Some((lat, lon)) = gps {
        all.extend(gps_fields(
            &encode(lat, Axis::Latitude).unwrap(),
            &encode(lon, Axis::Longitude).unwrap(),
        ));
    }
    embed_in_jpeg(jpeg, serialize(&all).unwrap()).unwrap()
}

/// Embed raw GPS fields verbatim, for fixtures the encoder would never produce.
pub fn jpeg_with_raw_gps(jpeg: &[u8], gps: Vec<Field>) -> Vec<u8> {
    embed_in_jpeg(jpeg, serialize(&gps).unwrap()).unwrap()
}

/// Files left in a scratch directory.
pub fn dir_entries(dir: &std::path::Path) -> Vec<String> {
    std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect()
}
