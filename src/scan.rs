//! Input discovery: turns command-line paths into image candidates.
//!
//! This is the file-picker side of the report. Every input is either an image
//! file or a directory that is walked recursively:
//!
//! ```text
//! photo-report list obra/ extra/portada.jpg
//!
//! obra/                       → candidates, in this order:
//! ├── 01-fachada.jpg              01-fachada.jpg
//! ├── .DS_Store     (skipped)     02-patio.png
//! ├── 02-patio.png                03-sala.JPG
//! ├── notas.txt     (skipped)     portada.jpg
//! └── interior/
//!     └── 03-sala.JPG
//! ```
//!
//! Directory entries are visited in file-name order so the initial "manual"
//! order is reproducible. Each candidate carries the file name, its size in
//! bytes, and its modification time; deduplication is left to the collection.

use crate::types::{ImageCandidate, ImageIdentity, ImageSource};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Extensions (lowercase) accepted as images.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif", "bmp", "tif", "tiff"];

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Input not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Whether `path` has an image extension. Case-insensitive.
pub fn is_image(path: &Path) -> bool {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    IMAGE_EXTENSIONS.contains(&ext.as_str())
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .map(|n| n.to_string_lossy().starts_with('.'))
        .unwrap_or(false)
}

/// Build a candidate for one image file from its filesystem metadata.
///
/// A modification time the platform cannot report is taken as the Unix epoch,
/// which sorts the image last under newest-first ordering.
pub fn candidate_from_path(path: &Path) -> Result<ImageCandidate, ScanError> {
    let metadata = std::fs::metadata(path).map_err(|source| ScanError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let last_modified = metadata
        .modified()
        .map(DateTime::<Utc>::from)
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    Ok(ImageCandidate::new(
        ImageIdentity::new(name, metadata.len(), last_modified),
        ImageSource::Path(path.to_path_buf()),
    ))
}

fn scan_directory(dir: &Path, out: &mut Vec<ImageCandidate>) -> Result<(), ScanError> {
    let walker = WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e.path()));
    for entry in walker {
        let entry = entry?;
        if entry.file_type().is_file() && is_image(entry.path()) {
            out.push(candidate_from_path(entry.path())?);
        }
    }
    Ok(())
}

/// Collect candidates from `inputs`, in the order given.
pub fn scan_inputs(inputs: &[PathBuf]) -> Result<Vec<ImageCandidate>, ScanError> {
    let mut candidates = Vec::new();
    for input in inputs {
        if input.is_dir() {
            scan_directory(input, &mut candidates)?;
        } else if input.is_file() {
            if is_image(input) {
                candidates.push(candidate_from_path(input)?);
            } else {
                warn!(path = %input.display(), "not an image, skipped");
            }
        } else {
            return Err(ScanError::NotFound(input.clone()));
        }
    }
    debug!(count = candidates.len(), "inputs scanned");
    Ok(candidates)
}
