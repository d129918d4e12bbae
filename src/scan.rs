//! Input discovery and batch extraction for the `extract` command.
//!
//! ```text
//! geophoto extract beach.jpg trips/
//!
//! beach.jpg                 → taken as given
//! trips/                    → walked recursively
//! ├── .thumbs/a.jpg         → skipped (hidden)
//! ├── 2023/rome.JPG         → kept (allow-listed extension, any case)
//! ├── 2023/notes.txt        → skipped
//! └── lisbon.heic           → kept
//! ```
//!
//! Files named explicitly are always kept; the extension allow-list only
//! filters what directory walking finds. Results are sorted and deduplicated
//! so output order is stable.
//!
//! Extraction over the collected files runs in parallel on the rayon pool;
//! every file is independent and results come back in input order.

use crate::config::UploadConfig;
use crate::metadata;
use crate::types::ExtractionResult;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("No such file or directory: {0}")]
    NotFound(PathBuf),
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .map(|n| n.to_string_lossy().starts_with('.'))
        .unwrap_or(false)
}

/// Expand files and directories into the list of images to read.
pub fn collect_images(inputs: &[PathBuf], upload: &UploadConfig) -> Result<Vec<PathBuf>, ScanError> {
    let mut images = Vec::new();
    for input in inputs {
        if input.is_file() {
            images.push(input.clone());
        } else if input.is_dir() {
            let walker = WalkDir::new(input)
                .follow_links(false)
                .into_iter()
                .filter_entry(|e| e.depth() == 0 || !is_hidden(e.path()));
            for entry in walker {
                let entry = entry?;
                if entry.file_type().is_file()
                    && upload.allows(&entry.file_name().to_string_lossy())
                {
                    images.push(entry.into_path());
                }
            }
        } else {
            return Err(ScanError::NotFound(input.clone()));
        }
    }
    images.sort();
    images.dedup();
    Ok(images)
}

/// Extract every image in parallel, preserving input order.
pub fn extract_all(paths: &[PathBuf]) -> Vec<(PathBuf, Result<ExtractionResult, std::io::Error>)> {
    paths
        .par_iter()
        .map(|path| (path.clone(), metadata::extract_file(path)))
        .collect()
}
