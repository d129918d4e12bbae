//! # geophoto
//!
//! Read and rewrite the GPS geotag embedded in photo files.
//!
//! EXIF keeps coordinates as degree/minute/second RATIONAL triples plus a
//! hemisphere letter, under key conventions that differ between producers.
//! This crate decodes them into signed decimal degrees, and encodes decimal
//! degrees back into a fresh GPS block written into the image.
//!
//! # Data Flow
//!
//! ```text
//! read:   image bytes ─▶ EXIF container ─▶ GpsBlock ─▶ locate ─▶ (lat, lon) | NoGpsData
//!                                      └─▶ camera / image / datetime / other sections
//!
//! write:  (lat, lon) ─▶ validate ─▶ encode ─▶ GPS fields ─┐
//!         image bytes ─▶ JPEG carrier (transcode if needed) ─┴▶ serialize + splice ─▶ JPEG
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`gps`] | Pure codec: rational normalizer, DMS ↔ decimal, key-scheme locator, range checks |
//! | [`imaging`] | Image backend (identify, transcode), EXIF container I/O, scoped carrier files |
//! | [`writer`] | Build and embed a new GPS block; `InvalidCoordinate` / `EncodingFailure` |
//! | [`metadata`] | Full extraction into an [`types::ExtractionResult`] |
//! | [`update`] | Base64 request → geotagged download, with status hints |
//! | [`scan`] | Input discovery (`walkdir`) and parallel batch extraction (`rayon`) |
//! | [`config`] | `geophoto.toml` loading, merging, and validation |
//! | [`naming`] | Filename sanitisation and derived output names |
//! | [`types`] | Boundary types serialized as JSON |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Absence Is Not an Error
//!
//! Reading never fails because of bad metadata. Every decode problem is a
//! typed [`gps::NoGpsReason`], and the rest of the image's metadata is still
//! returned. Writing is the opposite: the caller asked for a file, so any
//! failure is reported and no partial output is produced.
//!
//! ## Null Island vs. Near Zero
//!
//! An exact `(0.0, 0.0)` pair is treated as a firmware placeholder and
//! reported as no GPS data. A single axis merely close to zero is kept and
//! flagged ([`gps::GpsFix::near_zero`]); the extraction boundary logs it.
//!
//! ## JPEG as the Only Carrier
//!
//! JPEG input keeps its compressed image data untouched: only the EXIF APP1
//! segment is replaced. Every other format is decoded and re-encoded as JPEG
//! first, so the output is always a JPEG.

pub mod config;
pub mod gps;
pub mod imaging;
pub mod metadata;
pub mod naming;
pub mod output;
pub mod scan;
pub mod types;
pub mod update;
pub mod writer;

#[cfg(test)]
pub(crate) mod test_helpers;
