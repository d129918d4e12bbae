//! Image backend trait and shared types.
//!
//! The [`ImageBackend`] trait covers the two pixel-level operations the
//! geotagging pipeline needs: identify (header sniffing for the extraction
//! report) and transcode-to-JPEG (building a carrier for formats that can't
//! hold an EXIF APP1 block the way we write it).
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate. EXIF parsing and serialization don't go through the backend; see
//! [`container`](super::container).

use super::params::Quality;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image codec error: {0}")]
    Image(#[from] image::ImageError),
    #[error("EXIF error: {0}")]
    Exif(#[from] exif::Error),
    #[error("JPEG container error: {0}")]
    Container(#[from] img_parts::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Result of an identify operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInfo {
    /// Upper-case container name, e.g. `JPEG`, `PNG`.
    pub format: String,
    pub width: u32,
    pub height: u32,
    /// Pixel layout in the usual short notation, e.g. `RGB`, `RGBA`, `L`.
    pub mode: String,
}

/// Trait for image backends.
pub trait ImageBackend: Sync {
    /// Sniff format, dimensions and pixel layout without decoding pixels.
    fn identify(&self, bytes: &[u8]) -> Result<ImageInfo, BackendError>;

    /// Decode any supported format and re-encode it as an RGB baseline JPEG.
    fn transcode_to_jpeg(&self, bytes: &[u8], quality: Quality) -> Result<Vec<u8>, BackendError>;
}
