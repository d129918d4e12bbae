//! Scoped transient carrier file.
//!
//! When a source image has to be transcoded before it can hold the EXIF
//! block, the JPEG carrier is materialised on disk next to other in-flight
//! work. [`CarrierFile`] owns that file: the name is unique per call
//! (`<stem>_<random>_converted.jpg`) and the file is deleted when the guard
//! is dropped, on success, early return, or error alike.

use log::debug;
use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;

pub struct CarrierFile {
    file: NamedTempFile,
}

impl CarrierFile {
    /// Write `jpeg` to a fresh uniquely-named file in `dir`.
    ///
    /// `stem` only seeds the name for easier debugging; it must already be
    /// sanitised.
    pub fn create(dir: &Path, stem: &str, jpeg: &[u8]) -> io::Result<Self> {
        let mut file = tempfile::Builder::new()
            .prefix(&format!("{stem}_"))
            .suffix("_converted.jpg")
            .tempfile_in(dir)?;
        file.write_all(jpeg)?;
        file.flush()?;
        debug!("Created carrier {}", file.path().display());
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn read(&self) -> io::Result<Vec<u8>> {
        std::fs::read(self.file.path())
    }
}

impl Drop for CarrierFile {
    fn drop(&mut self) {
        debug!("Removing carrier {}", self.file.path().display());
    }
}
