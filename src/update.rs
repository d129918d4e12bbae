//! The geotag-update operation as a request handler would call it.
//!
//! ```text
//! UpdateRequest { image: base64, latitude, longitude, filename }
//!   ── base64 decode ── size limit ── extension allow-list ── sanitise name
//!   ── writer::write_gps ──▶ UpdateResponse { bytes, download_name }
//!                       └──▶ UpdateError ──▶ UpdateFailure { error } + status hint
//! ```
//!
//! Status hints follow HTTP conventions: bad input and invalid coordinates
//! are the caller's fault (400), encoding failures are ours (500).

use crate::config::{GeophotoConfig, TooLarge};
use crate::imaging::{ImageBackend, RustBackend};
use crate::naming::{download_name, sanitize_filename};
use crate::types::{UpdateFailure, UpdateRequest};
use crate::writer::{WriteError, WriteOptions, write_gps_with_backend};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use log::{info, warn};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum UpdateError {
    #[error("Invalid base64 image data: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error(transparent)]
    TooLarge(#[from] TooLarge),
    #[error("File type not allowed: {0}")]
    DisallowedType(String),
    #[error(transparent)]
    Write(#[from] WriteError),
}

impl UpdateError {
    /// HTTP status a front end should answer with.
    pub fn status(&self) -> u16 {
        match self {
            UpdateError::Write(WriteError::EncodingFailure { .. }) => 500,
            _ => 400,
        }
    }

    pub fn to_failure(&self) -> UpdateFailure {
        UpdateFailure {
            error: self.to_string(),
        }
    }
}

/// A geotagged image ready for download.
#[derive(Debug, Clone)]
pub struct UpdateResponse {
    pub bytes: Vec<u8>,
    pub download_name: String,
    pub content_type: &'static str,
    pub converted: bool,
}

/// Run an update request with the default backend.
pub fn apply(request: &UpdateRequest, config: &GeophotoConfig) -> Result<UpdateResponse, UpdateError> {
    apply_with_backend(&RustBackend::new(), request, config)
}

/// Run an update request using a custom backend (for testing).
pub fn apply_with_backend(
    backend: &impl ImageBackend,
    request: &UpdateRequest,
    config: &GeophotoConfig,
) -> Result<UpdateResponse, UpdateError> {
    let result = run(backend, request, config);
    match &result {
        Ok(response) => info!(
            "Updated GPS for {} ({} bytes)",
            response.download_name,
            response.bytes.len()
        ),
        Err(e) => warn!("GPS update failed ({}): {e}", e.status()),
    }
    result
}

fn run(
    backend: &impl ImageBackend,
    request: &UpdateRequest,
    config: &GeophotoConfig,
) -> Result<UpdateResponse, UpdateError> {
    let bytes = STANDARD.decode(request.image.trim())?;

    config.upload.check_size(bytes.len() as u64)?;

    let filename = sanitize_filename(&request.filename);
    if !config.upload.allows(&filename) {
        return Err(UpdateError::DisallowedType(filename));
    }

    let options = WriteOptions::from_config(&config.carrier);
    let tagged = write_gps_with_backend(
        backend,
        &bytes,
        &filename,
        request.latitude,
        request.longitude,
        &options,
    )?;

    Ok(UpdateResponse {
        bytes: tagged.bytes,
        download_name: download_name(&filename),
        content_type: "image/jpeg",
        converted: tagged.converted,
    })
}
