//! Pure Rust image backend on the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Identify | `image::ImageReader::with_guessed_format` + `into_decoder` (header only) |
//! | Decode (JPEG, PNG, GIF, BMP, TIFF, WebP) | `image::load_from_memory` |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` |
//!
//! HEIC/HEIF has no pure-Rust decoder compiled in: identify and transcode
//! report it as unsupported, while EXIF reading (which doesn't need pixels)
//! still works for it.

use super::backend::{BackendError, ImageBackend, ImageInfo};
use super::params::Quality;
use image::codecs::jpeg::JpegEncoder;
use image::{ColorType, DynamicImage, ImageDecoder, ImageFormat, ImageReader};
use std::io::Cursor;

/// Pure Rust backend using the `image` crate.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn format_name(format: ImageFormat) -> String {
    match format {
        ImageFormat::Jpeg => "JPEG".to_string(),
        ImageFormat::WebP => "WEBP".to_string(),
        other => format!("{other:?}").to_uppercase(),
    }
}

fn mode_name(color: ColorType) -> String {
    match color {
        ColorType::L8 => "L".to_string(),
        ColorType::La8 => "LA".to_string(),
        ColorType::Rgb8 => "RGB".to_string(),
        ColorType::Rgba8 => "RGBA".to_string(),
        ColorType::L16 => "I;16".to_string(),
        ColorType::La16 => "LA;16".to_string(),
        ColorType::Rgb16 => "RGB;16".to_string(),
        ColorType::Rgba16 => "RGBA;16".to_string(),
        other => format!("{other:?}"),
    }
}

impl ImageBackend for RustBackend {
    fn identify(&self, bytes: &[u8]) -> Result<ImageInfo, BackendError> {
        let reader = ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;
        let format = reader.format().ok_or_else(|| {
            BackendError::ProcessingFailed("Unrecognized image format".to_string())
        })?;
        let decoder = reader.into_decoder()?;
        let (width, height) = decoder.dimensions();
        Ok(ImageInfo {
            format: format_name(format),
            width,
            height,
            mode: mode_name(decoder.color_type()),
        })
    }

    fn transcode_to_jpeg(&self, bytes: &[u8], quality: Quality) -> Result<Vec<u8>, BackendError> {
        let decoded = image::load_from_memory(bytes)?;
        // JPEG has no alpha; drop it the same way a plain RGB conversion does.
        let rgb = DynamicImage::ImageRgb8(decoded.to_rgb8());
        let mut out = Vec::new();
        rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut out, quality.value()))?;
        Ok(out)
    }
}
