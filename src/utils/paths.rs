use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

// Maximum transcript log size: 50MB
const MAX_FILE_SIZE_BYTES: u64 = 50 * 1024 * 1024;

const RENDERED_EXTENSION: &str = "html";

/// Open a file and validate its size on the same handle.
///
/// Checking the open handle rather than the path avoids a TOCTOU race where the file is
/// swapped between the size check and the read.
///
/// # Errors
///
/// Returns an error if:
/// - The file cannot be opened
/// - The file metadata cannot be read
/// - The file is larger than 50MB
pub fn open_bounded_file(path: &Path) -> Result<File> {
    let file =
        File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;

    let metadata = file
        .metadata()
        .with_context(|| format!("Failed to read file metadata: {}", path.display()))?;

    let file_size = metadata.len();
    if file_size > MAX_FILE_SIZE_BYTES {
        bail!(
            "File too large: {} ({} bytes, max {} bytes)",
            path.display(),
            file_size,
            MAX_FILE_SIZE_BYTES
        );
    }

    Ok(file)
}

/// Sibling `.html` rendering of a transcript log, if one exists
pub fn rendered_document_path(log_path: &Path) -> Option<PathBuf> {
    let candidate = log_path.with_extension(RENDERED_EXTENSION);
    candidate.is_file().then_some(candidate)
}
