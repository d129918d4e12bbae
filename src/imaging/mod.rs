//! Image and container handling in pure Rust, no system libraries.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::ImageReader` (header only) |
//! | **Transcode → JPEG** | `image` decoders + `JpegEncoder` |
//! | **EXIF read** | `kamadak-exif` |
//! | **EXIF write** | `exif::experimental::Writer` + `img-parts` APP1 splice |
//! | **Transient carrier** | `tempfile::NamedTempFile` behind [`CarrierFile`] |
//!
//! The module is split into:
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`] (pixel work, mockable)
//! - **Container**: EXIF parse/serialize/embed (byte-level, no pixels)
//! - **Carrier**: the RAII guard for converted files
//! - **Parameters**: [`Quality`]

pub mod backend;
pub mod carrier;
pub mod container;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, ImageBackend, ImageInfo};
pub use carrier::CarrierFile;
pub use params::Quality;
pub use rust_backend::RustBackend;
